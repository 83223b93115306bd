//! Named-entity extraction.
//!
//! Defines the [`EntityExtractor`] trait implemented by every entity
//! recognition backend, and [`HeuristicExtractor`], a dependency-free
//! extractor used by default and in tests. The HTTP-backed extractor lives
//! in the `knowmap` app crate.
//!
//! Every extractor returns mentions in left-to-right order of appearance
//! and keeps duplicates: the sequence feeds the co-occurrence graph, where
//! adjacency matters.

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use std::collections::HashSet;

/// Trait for entity extraction backends.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    /// Short backend identifier used in logs.
    fn name(&self) -> &str;

    /// Extract entity mentions from raw text.
    ///
    /// Empty or unparseable input yields an empty vector, not an error.
    async fn extract(&self, text: &str) -> AnyResult<Vec<String>>;
}

/// Capitalization-based entity extractor (no model, no network).
///
/// - Runs of capitalized words form one mention ("New York City").
/// - Punctuation attached to a word ends the current run.
/// - Tokens containing digits ("2019", "3D") are mentions on their own.
/// - Capitalized function words ("The", "In", "However") are not entities.
/// - A trailing possessive `'s` is dropped.
#[derive(Debug, Clone)]
pub struct HeuristicExtractor {
    stopwords: HashSet<&'static str>,
}

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "but", "by", "for", "from", "he", "her", "here", "his",
    "however", "i", "if", "in", "is", "it", "its", "my", "of", "on", "or", "our", "she", "so",
    "that", "the", "their", "then", "there", "these", "they", "this", "those", "to", "was", "we",
    "were", "what", "when", "where", "which", "while", "who", "why", "with", "you", "your",
];

impl Default for HeuristicExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self {
            stopwords: STOPWORDS.iter().copied().collect(),
        }
    }

    /// Synchronous extraction used by the async trait method.
    pub fn extract_sync(&self, text: &str) -> Vec<String> {
        let mut mentions = Vec::new();
        let mut span: Vec<&str> = Vec::new();

        for raw in text.split_whitespace() {
            let leading_punct = raw.starts_with(|c: char| !c.is_alphanumeric());
            let trailing_punct = raw.ends_with(|c: char| !c.is_alphanumeric());
            let token = strip_possessive(raw.trim_matches(|c: char| !c.is_alphanumeric()));

            if leading_punct || token.is_empty() {
                flush(&mut span, &mut mentions);
            }
            if token.is_empty() {
                continue;
            }

            if self.is_name_token(token) {
                span.push(token);
            } else {
                flush(&mut span, &mut mentions);
                if token.chars().any(|c| c.is_ascii_digit()) {
                    mentions.push(token.to_string());
                }
            }

            if trailing_punct {
                flush(&mut span, &mut mentions);
            }
        }
        flush(&mut span, &mut mentions);

        mentions
    }

    fn is_name_token(&self, token: &str) -> bool {
        let starts_upper = token.chars().next().map(char::is_uppercase).unwrap_or(false);
        starts_upper
            && !token.chars().any(|c| c.is_ascii_digit())
            && !self.stopwords.contains(token.to_lowercase().as_str())
    }
}

fn strip_possessive(token: &str) -> &str {
    token
        .strip_suffix("'s")
        .or_else(|| token.strip_suffix("\u{2019}s"))
        .unwrap_or(token)
}

fn flush(span: &mut Vec<&str>, mentions: &mut Vec<String>) {
    if !span.is_empty() {
        mentions.push(span.join(" "));
        span.clear();
    }
}

#[async_trait]
impl EntityExtractor for HeuristicExtractor {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn extract(&self, text: &str) -> AnyResult<Vec<String>> {
        Ok(self.extract_sync(text))
    }
}
