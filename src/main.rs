//! Parse captured library-catalog result pages into book records.
//!
//! Captures come from the session engine (or any browser snapshot); this
//! binary only does the offline extraction half and prints a one-object
//! JSON summary to stdout.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use bookscout::extract;

#[derive(Parser, Debug)]
#[command(name = "bookscout", about = "Extract book records from captured catalog result pages")]
struct Cli {
    /// Capture files in result-page order (page 1 first).
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Place key recorded in each record's provenance.
    #[arg(long, default_value = "unknown")]
    place: String,

    /// Write the full outcome payload to this JSON file.
    #[arg(long)]
    out_json: Option<PathBuf>,

    /// Write one record per line to this JSONL file.
    #[arg(long)]
    out_jsonl: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut outcome = extract::parse_files(&cli.paths, &cli.place)?;
    extract::persist(
        &mut outcome,
        cli.out_json.as_deref(),
        cli.out_jsonl.as_deref(),
    );

    let mut saved = Vec::new();
    if let Some(p) = &cli.out_json {
        saved.push(p.display().to_string());
    }
    if let Some(p) = &cli.out_jsonl {
        saved.push(p.display().to_string());
    }

    let summary = serde_json::json!({
        "ok": outcome.ok,
        "error": outcome.error,
        "count": outcome.count,
        "saved": saved,
        "samples": outcome.items.iter().take(3).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
