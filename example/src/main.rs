use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::*;
use topicsift::source::{read_csv_corpus, CsvColumns};
use topicsift::{sink, ModelConfig, RawDocument, SamplingMode, TopicModel};

//
// Used when no --input is given: a handful of health and election tweets.
//
const SAMPLE_TWEETS: &[&str] = &[
    "Flu vaccine clinic opens Monday at the county health center",
    "Get your booster: free vaccine clinic this weekend, bring your health card",
    "Hospital staff urge everyone to book a vaccine appointment at the clinic",
    "New health guidance on vaccine doses for children and seniors",
    "Clinic wait times drop as vaccine supply improves across the health network",
    "Polls open at 7am, bring ID to vote in the election",
    "Debate tonight: candidates clash on tax policy ahead of the election",
    "Early vote turnout breaks records in the county election",
    "Policy experts weigh in on the candidates' election promises",
    "Register to vote before Friday to take part in the election",
];

/// Fit an LDA topic model over a CSV of tweets or transcripts.
#[derive(Parser, Debug)]
#[command(name = "topic-report", version)]
struct Args {
    /// CSV file with a header row
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Column holding the document text
    #[arg(long, default_value = "text")]
    text_column: String,

    /// Column holding the document id (row index when omitted)
    #[arg(long)]
    id_column: Option<String>,

    /// JSON model configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of topics
    #[arg(short = 'k', long)]
    topics: Option<usize>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Sweep documents in N parallel blocks (approximate)
    #[arg(long)]
    partitions: Option<usize>,

    /// Directory for topic files, articles.csv and result.json
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ModelConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ModelConfig::default(),
    };
    if let Some(k) = args.topics {
        config.topic_count = k;
    }
    if let Some(seed) = args.seed {
        config.random_seed = seed;
    }
    if let Some(partitions) = args.partitions {
        config.mode = SamplingMode::ApproximateParallel { partitions };
    }

    let documents = match &args.input {
        Some(path) => {
            let columns = CsvColumns {
                text: args.text_column.clone(),
                id: args.id_column.clone(),
            };
            read_csv_corpus(path, &columns)
                .with_context(|| format!("reading corpus {}", path.display()))?
        }
        None => {
            if args.topics.is_none() && args.config.is_none() {
                config.topic_count = 2;
            }
            SAMPLE_TWEETS
                .iter()
                .enumerate()
                .map(|(i, text)| RawDocument::new(i.to_string(), *text))
                .collect()
        }
    };

    println!(
        "Training LDA (K={}, sweeps={}+{}) on {} documents...",
        config.topic_count,
        config.burn_in_sweeps,
        config.sampling_sweeps,
        documents.len()
    );
    let model = TopicModel::fit(&documents, &config)?;
    let result = model.result();

    let mut topics_table = Table::new();
    topics_table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Topic").fg(Color::Red),
            Cell::new("Documents").fg(Color::Red),
            Cell::new("Top words").fg(Color::White),
        ]);
    for topic in &result.topics {
        let words = topic
            .top_words
            .iter()
            .map(|w| format!("{}[{:.3}]", w.word, w.weight))
            .collect::<Vec<_>>()
            .join(" ");
        topics_table.add_row(vec![
            Cell::new(topic.topic_index + 1),
            Cell::new(result.documents_in_topic(topic.topic_index).len()),
            Cell::new(words),
        ]);
    }
    println!("{topics_table}");

    if let Some(perplexity) = model.perplexity() {
        println!("Perplexity: {perplexity:.3}");
    }
    if !result.warnings.is_empty() {
        println!("{} documents had no usable words and were left unassigned", result.warnings.len());
    }

    if let Some(dir) = &args.output {
        sink::write_all(dir, &result, &documents)
            .with_context(|| format!("writing results to {}", dir.display()))?;
        println!("Results written to {}", dir.display());
    }
    Ok(())
}
