// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 toxicity-eval contributors

//! Comparison CLI: wordlist matcher vs remote LLM classifier
//!
//! Usage:
//!   toxicity-eval --corpus data/gametox_sample_50.csv \
//!       --terms data/profanity_words.txt \
//!       --predictions results/level2_llm_predictions.csv

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use toxicity_eval::compare::{compare, CompareConfig, DEFAULT_TIE_TOLERANCE};
use toxicity_eval::corpus::{self, label_distribution, Label};
use toxicity_eval::matcher::WordMatcher;
use toxicity_eval::report::{render_summary, write_comparison_csv, EvaluationResults};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "toxicity-eval")]
#[command(about = "Compare wordlist and LLM toxicity filtering on a labeled sample")]
#[command(version)]
struct Args {
    /// Labeled message sample (CSV with `message` and `label` columns)
    #[arg(short, long, default_value = "data/gametox_sample_50.csv")]
    corpus: PathBuf,

    /// Banned-term list (newline-delimited text)
    #[arg(short, long, default_value = "data/profanity_words.txt")]
    terms: PathBuf,

    /// Externally produced prediction stream (CSV, one row per sampled message)
    #[arg(short, long, default_value = "results/level2_llm_predictions.csv")]
    predictions: PathBuf,

    /// Output directory for the comparison table and JSON results
    #[arg(short, long, default_value = "results")]
    output: PathBuf,

    /// Absolute tolerance below which a per-metric comparison is a tie
    #[arg(long, default_value_t = DEFAULT_TIE_TOLERANCE)]
    tie_tolerance: f64,

    /// Output format (text, csv, json, all)
    #[arg(short, long, default_value = "all")]
    format: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let messages = corpus::load_corpus(&args.corpus)?;
    let terms = corpus::load_terms(&args.terms)?;
    let llm_predictions = corpus::load_predictions(&args.predictions)?;

    tracing::info!("Loaded {} messages from {}", messages.len(), args.corpus.display());
    tracing::info!("Loaded {} banned terms from {}", terms.len(), args.terms.display());
    tracing::info!(
        "Loaded {} LLM predictions from {}",
        llm_predictions.len(),
        args.predictions.display()
    );

    let dist = label_distribution(&messages);
    tracing::info!(
        "Sample distribution: {} toxic, {} clean",
        dist.get(&Label::Toxic).unwrap_or(&0),
        dist.get(&Label::Clean).unwrap_or(&0)
    );

    let matcher = WordMatcher::new(&terms)?;
    let wordlist_predictions = matcher.predict(&messages);

    let config = CompareConfig {
        tie_tolerance: args.tie_tolerance,
        ..CompareConfig::default()
    };
    let report = compare(&messages, &wordlist_predictions, &llm_predictions, config)?;

    println!("{}", render_summary(&report));

    if args.format == "csv" || args.format == "all" {
        let csv_path = args.output.join("comparison_table.csv");
        write_comparison_csv(&messages, &wordlist_predictions, &llm_predictions, &csv_path)?;
        println!("Comparison table saved to: {}", csv_path.display());
    }

    if args.format == "json" || args.format == "all" {
        let json_path = args.output.join("comparison_results.json");
        EvaluationResults::new(report).save(&json_path)?;
        println!("JSON results saved to: {}", json_path.display());
    }

    Ok(())
}
