//! Corpus source: documents from delimited text files.

use std::io::Read;
use std::path::Path;

use crate::corpus::RawDocument;
use crate::error::{Result, TopicModelError};

/// Which CSV columns hold the document text and identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvColumns {
    pub text: String,
    /// When `None`, the 0-based data row index is the identifier.
    pub id: Option<String>,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            text: "text".to_string(),
            id: None,
        }
    }
}

/// Read documents from a CSV file with a header row.
///
/// Columns other than the text and id columns are kept as document
/// metadata, in header order.
pub fn read_csv_corpus<P: AsRef<Path>>(path: P, columns: &CsvColumns) -> Result<Vec<RawDocument>> {
    let path = path.as_ref();
    let reader = csv::Reader::from_path(path)?;
    let documents = read_documents(reader, columns)?;
    log::info!("Read {} documents from {}", documents.len(), path.display());
    Ok(documents)
}

/// Read documents from any CSV stream with a header row.
pub fn read_csv_corpus_from<R: Read>(input: R, columns: &CsvColumns) -> Result<Vec<RawDocument>> {
    read_documents(csv::Reader::from_reader(input), columns)
}

fn read_documents<R: Read>(mut reader: csv::Reader<R>, columns: &CsvColumns) -> Result<Vec<RawDocument>> {
    let headers = reader.headers()?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TopicModelError::MissingColumn {
                column: name.to_string(),
            })
    };
    let text_col = position(columns.text.as_str())?;
    let id_col = columns.id.as_deref().map(position).transpose()?;

    let mut documents = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let text = record.get(text_col).unwrap_or_default();
        let id = match id_col {
            Some(col) => record.get(col).unwrap_or_default().to_string(),
            None => row.to_string(),
        };
        let mut doc = RawDocument::new(id, text);
        for (col, name) in headers.iter().enumerate() {
            if col != text_col && Some(col) != id_col {
                doc = doc.with_metadata(name, record.get(col).unwrap_or_default());
            }
        }
        documents.push(doc);
    }
    Ok(documents)
}
