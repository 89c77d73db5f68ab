//! shici-pack: build the bundled poetry dataset from a JSON list.
//!
//! Input is a JSON array of objects with `title`, `dynasty`, `author`,
//! `content1` and `content2`. Missing fields get the usual placeholders.

use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;
use tracing::info;

use shici_core::{Record, DATASET_FILE};
use shici_dataset::write_dataset;

/// Pack a JSON poem list into the Parquet dataset file.
#[derive(Parser, Debug)]
#[command(name = "shici-pack", version, about)]
struct Cli {
    /// JSON file holding an array of poems.
    input: PathBuf,

    /// Directory to write the dataset file into.
    #[arg(long, env = "SHICI_INSTALL_DIR", default_value = ".")]
    install_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct PoemInput {
    title: Option<String>,
    dynasty: Option<String>,
    author: Option<String>,
    content1: Option<String>,
    content2: Option<String>,
}

impl From<PoemInput> for Record {
    fn from(p: PoemInput) -> Self {
        Record::from_cells(
            p.title.as_deref(),
            p.dynasty.as_deref(),
            p.author.as_deref(),
            p.content1.as_deref(),
            p.content2.as_deref(),
        )
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let contents = std::fs::read_to_string(&cli.input)?;
    let poems: Vec<PoemInput> = serde_json::from_str(&contents)?;
    let records: Vec<Record> = poems.into_iter().map(Record::from).collect();

    let output = cli.install_dir.join(DATASET_FILE);
    let rows = write_dataset(&records, &output)?;

    info!(input = %cli.input.display(), output = %output.display(), rows, "packed poetry dataset");
    Ok(())
}
