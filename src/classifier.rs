// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 toxicity-eval contributors

//! Remote LLM classifier (the second filtering approach)
//!
//! Calls an OpenRouter-compatible chat-completions endpoint with a
//! prompt template and parses the reply for a TOXIC/CLEAN verdict. The
//! evaluation core never calls this module; it only consumes the 0/1
//! prediction stream this produces.
//!
//! When the call fails or the reply carries no recognizable verdict,
//! the batch runner substitutes the configured fallback label. The
//! default fallback is `Toxic`: over-flagging is the safer failure mode
//! for moderation. That bias lives entirely here, as collaborator
//! configuration, never in the comparator.

use crate::corpus::{Label, Message};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.3-70b-instruct:free";

/// Delay between consecutive requests, to stay under free-tier rate limits
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(3);

/// Remote classifier configuration
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    /// Prompt template with a `{message}` placeholder
    pub prompt_template: String,
    /// Label substituted when a call fails or the reply is unparseable
    pub fallback_label: Label,
    /// Pause between consecutive requests
    pub request_delay: Duration,
}

impl ClassifierConfig {
    pub fn new(api_key: impl Into<String>, prompt_template: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            prompt_template: prompt_template.into(),
            fallback_label: Label::Toxic,
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Fill the `{message}` placeholder in a prompt template
pub fn fill_prompt(template: &str, message: &str) -> String {
    template.replace("{message}", message)
}

/// Parse a model reply into a verdict. TOXIC is checked first so a reply
/// mentioning both words resolves conservatively.
pub fn parse_verdict(reply: &str) -> Option<Label> {
    let upper = reply.trim().to_uppercase();
    if upper.contains("TOXIC") {
        Some(Label::Toxic)
    } else if upper.contains("CLEAN") {
        Some(Label::Clean)
    } else {
        None
    }
}

/// Blocking HTTP client for the remote classifier
pub struct RemoteClassifier {
    config: ClassifierConfig,
    client: reqwest::blocking::Client,
}

impl RemoteClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a single message text.
    ///
    /// Errors on transport failure and on replies with no recognizable
    /// verdict; fallback substitution is the batch runner's job.
    pub fn classify(&self, text: &str) -> Result<Label> {
        let prompt = fill_prompt(&self.config.prompt_template, text);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            max_tokens: 10,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .context("Classification request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Classification request failed with status {}", response.status());
        }

        let body: ChatResponse = response.json().context("Malformed classifier response")?;
        let reply = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("");

        parse_verdict(reply)
            .with_context(|| format!("No TOXIC/CLEAN verdict in reply: {reply:?}"))
    }

    /// Classify a batch of messages, producing exactly one prediction
    /// per message in corpus order.
    ///
    /// Failed calls resolve to the configured fallback label with a
    /// warning; missing text is sent as the empty string.
    pub fn classify_batch(&self, messages: &[Message]) -> Vec<Label> {
        let pb = ProgressBar::new(messages.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut predictions = Vec::with_capacity(messages.len());

        for (idx, message) in messages.iter().enumerate() {
            let prediction = match self.classify(message.text_or_empty()) {
                Ok(label) => label,
                Err(e) => {
                    tracing::warn!(
                        "Message {}: {} - falling back to {}",
                        idx,
                        e,
                        self.config.fallback_label.as_str()
                    );
                    self.config.fallback_label
                }
            };
            predictions.push(prediction);
            pb.inc(1);

            if idx + 1 < messages.len() {
                std::thread::sleep(self.config.request_delay);
            }
        }

        pb.finish_with_message("Classification complete");
        predictions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verdict() {
        assert_eq!(parse_verdict("TOXIC"), Some(Label::Toxic));
        assert_eq!(parse_verdict("clean"), Some(Label::Clean));
        assert_eq!(parse_verdict("  Toxic\n"), Some(Label::Toxic));
        assert_eq!(parse_verdict("The message is CLEAN."), Some(Label::Clean));
        assert_eq!(parse_verdict("I cannot classify this"), None);
        assert_eq!(parse_verdict(""), None);
    }

    #[test]
    fn test_parse_verdict_prefers_toxic_when_ambiguous() {
        assert_eq!(parse_verdict("not clean, TOXIC"), Some(Label::Toxic));
        assert_eq!(parse_verdict("TOXIC rather than CLEAN"), Some(Label::Toxic));
    }

    #[test]
    fn test_fill_prompt() {
        let template = "Classify this chat message: {message}\nAnswer TOXIC or CLEAN.";
        let prompt = fill_prompt(template, "gg wp");

        assert!(prompt.contains("gg wp"));
        assert!(!prompt.contains("{message}"));
    }

    #[test]
    fn test_default_fallback_is_toxic() {
        let config = ClassifierConfig::new("key", "classify: {message}");

        assert_eq!(config.fallback_label, Label::Toxic);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.request_delay, DEFAULT_REQUEST_DELAY);
    }
}
