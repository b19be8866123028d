//! Result sink: persist a [`TopicModelResult`] to disk.
//!
//! Layout of an output directory:
//!
//! ```text
//! 1.txt .. K.txt   ranked word list per topic (topics numbered from 1)
//! articles.csv     id, text, metadata columns, Topic (1-based, or "unassigned")
//! result.json      the full result as JSON
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::corpus::RawDocument;
use crate::error::Result;
use crate::result::{DominantTopic, TopicModelResult};

/// Write `<topic+1>.txt` for every topic into `dir`, creating it if needed.
pub fn write_topic_files<P: AsRef<Path>>(dir: P, result: &TopicModelResult) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut paths = Vec::with_capacity(result.topics.len());
    for topic in &result.topics {
        let path = dir.join(format!("{}.txt", topic.topic_index + 1));
        let mut out = BufWriter::new(File::create(&path)?);
        writeln!(
            out,
            "For topic {} the top {} words are:",
            topic.topic_index + 1,
            topic.top_words.len()
        )?;
        for word in &topic.top_words {
            writeln!(out, "{}) {}", word.rank, word.word)?;
        }
        out.flush()?;
        paths.push(path);
    }
    log::info!("Wrote {} topic files to {}", paths.len(), dir.display());
    Ok(paths)
}

/// Write the input documents with their assigned topic as CSV.
///
/// Rows of `documents` and `result.document_assignments` are paired by
/// position. Metadata columns follow `id` and `text` in order of first
/// appearance; a document lacking a column gets an empty cell.
pub fn write_assignments_csv<P: AsRef<Path>>(
    path: P,
    result: &TopicModelResult,
    documents: &[RawDocument],
) -> Result<()> {
    if documents.len() != result.document_assignments.len() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!(
                "{} documents but {} assignments",
                documents.len(),
                result.document_assignments.len()
            ),
        )
        .into());
    }

    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;
    let mut metadata_columns: Vec<&str> = Vec::new();
    for doc in documents {
        for (name, _) in &doc.metadata {
            if !metadata_columns.contains(&name.as_str()) {
                metadata_columns.push(name);
            }
        }
    }

    let mut header = vec!["id", "text"];
    header.extend(&metadata_columns);
    header.push("Topic");
    writer.write_record(&header)?;

    for (doc, assignment) in documents.iter().zip(&result.document_assignments) {
        let topic = match assignment.dominant_topic {
            DominantTopic::Topic(t) => (t + 1).to_string(),
            DominantTopic::Unassigned => assignment.dominant_topic.to_string(),
        };
        let mut row = vec![doc.id.as_str(), doc.text.as_str()];
        row.extend(
            metadata_columns
                .iter()
                .map(|name| doc.metadata(name).unwrap_or_default()),
        );
        row.push(topic.as_str());
        writer.write_record(&row)?;
    }
    writer.flush()?;
    log::info!("Wrote {} document assignments to {}", documents.len(), path.display());
    Ok(())
}

/// Write the result as pretty-printed JSON.
pub fn write_json<P: AsRef<Path>>(path: P, result: &TopicModelResult) -> Result<()> {
    let out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(out, result)?;
    Ok(())
}

/// Write topic files, `articles.csv` and `result.json` into `dir`.
pub fn write_all<P: AsRef<Path>>(
    dir: P,
    result: &TopicModelResult,
    documents: &[RawDocument],
) -> Result<()> {
    let dir = dir.as_ref();
    write_topic_files(dir, result)?;
    write_assignments_csv(dir.join("articles.csv"), result, documents)?;
    write_json(dir.join("result.json"), result)?;
    Ok(())
}
