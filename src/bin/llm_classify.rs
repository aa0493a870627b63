// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 toxicity-eval contributors

//! Remote classifier runner
//!
//! Runs the LLM classifier over the labeled sample and writes the
//! prediction stream CSV consumed by the comparison CLI. Prints quick
//! standalone metrics for the LLM on the way out.
//!
//! Usage:
//!   OPENROUTER_API_KEY=... llm-classify --corpus data/gametox_sample_50.csv

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use toxicity_eval::classifier::{ClassifierConfig, RemoteClassifier, DEFAULT_MODEL};
use toxicity_eval::corpus::{self, Label};
use toxicity_eval::metrics::score;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "llm-classify")]
#[command(about = "Classify the message sample with a remote LLM")]
#[command(version)]
struct Args {
    /// Labeled message sample (CSV with `message` and `label` columns)
    #[arg(short, long, default_value = "data/gametox_sample_50.csv")]
    corpus: PathBuf,

    /// Prompt template file with a {message} placeholder
    #[arg(short, long, default_value = "data/prompt_template.txt")]
    prompt: PathBuf,

    /// Output CSV for the prediction stream
    #[arg(short, long, default_value = "results/level2_llm_predictions.csv")]
    output: PathBuf,

    /// Model identifier on the OpenRouter endpoint
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Label substituted when a call fails (toxic or clean)
    #[arg(long, default_value = "toxic")]
    fallback: String,

    /// Pause between consecutive requests, in milliseconds
    #[arg(long, default_value_t = 3000)]
    delay_ms: u64,

    /// API key for the OpenRouter endpoint
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let fallback_label = match args.fallback.to_lowercase().as_str() {
        "toxic" => Label::Toxic,
        "clean" => Label::Clean,
        other => anyhow::bail!("Unknown fallback label: {other} (expected toxic or clean)"),
    };

    let messages = corpus::load_corpus(&args.corpus)?;
    let prompt_template = std::fs::read_to_string(&args.prompt)
        .with_context(|| format!("Failed to read prompt template: {}", args.prompt.display()))?;

    tracing::info!("Classifying {} messages with {}", messages.len(), args.model);
    tracing::info!("Fallback on failure: {}", fallback_label.as_str());

    let config = ClassifierConfig {
        model: args.model,
        fallback_label,
        request_delay: Duration::from_millis(args.delay_ms),
        ..ClassifierConfig::new(args.api_key, prompt_template)
    };
    let classifier = RemoteClassifier::new(config)?;

    let predictions = classifier.classify_batch(&messages);

    // One row per message, aligned with the sample
    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    writer.write_record(["message", "label", "llm_prediction"])?;
    for (message, prediction) in messages.iter().zip(predictions.iter()) {
        let label = message.label.to_binary().to_string();
        let pred = prediction.to_binary().to_string();
        writer.write_record([message.text_or_empty(), label.as_str(), pred.as_str()])?;
    }
    writer.flush()?;
    println!("Predictions saved to: {}", args.output.display());

    // Quick standalone metrics against ground truth
    let labels: Vec<Label> = messages.iter().map(|m| m.label).collect();
    let (cm, metrics) = score(&labels, &predictions)?;

    println!("\n{}", "=".repeat(60));
    println!("LLM CLASSIFIER RESULTS");
    println!("{}", "=".repeat(60));
    println!("Total messages: {}", cm.total());
    println!("Correct predictions: {}", cm.tp + cm.tn);
    println!("\n{}", cm.format());
    println!("Accuracy:  {:.3} ({:.1}%)", metrics.accuracy, metrics.accuracy * 100.0);
    println!("Precision: {:.3} ({:.1}%)", metrics.precision, metrics.precision * 100.0);
    println!("Recall:    {:.3} ({:.1}%)", metrics.recall, metrics.recall * 100.0);
    println!("F1:        {:.3}", metrics.f1);

    Ok(())
}
