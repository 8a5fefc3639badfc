//! Gazetteer-based mock provider for testing.
//!
//! [`MockProvider`] imitates an uncased WordPiece model without loading one:
//! it lowercases the text, splits punctuation into tokens of its own, cuts
//! long words into `##` pieces and wraps the result in `[CLS]`/`[SEP]`.
//! Entities come from a gazetteer of `TYPE=phrase` entries; a phrase is
//! labeled wherever it occurs and a candidate with a matching type name was
//! supplied.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! slotfill-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use slotfill_core::{MockConfig, MockProvider, SlotFillingService};
//!
//! let service = SlotFillingService::mock();
//!
//! let config = MockConfig {
//!     gazetteer: vec!["LOC=boston".into(), "DATE=next friday".into()],
//!     ..Default::default()
//! };
//! let service = SlotFillingService::from_provider(MockProvider::new(config));
//! ```

use std::sync::Arc;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use super::{Result, SlotFillingProvider, SlotFillingService, TRACING_TARGET};
use crate::label::{
    IobTag, LabelEntry, LabelSet, ModelOutput, SUBWORD_PREFIX, TYPE_DESCRIPTION_DELIMITER,
    TypeDescription,
};
use crate::types::ServiceHealth;

const CLS_TOKEN: &str = "[CLS]";
const SEP_TOKEN: &str = "[SEP]";

/// Separator between the type and the phrase of a gazetteer entry.
const GAZETTEER_SEPARATOR: char = '=';

/// Configuration for the mock provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct MockConfig {
    /// Gazetteer entries in `TYPE=phrase` form. Empty means the built-in list.
    #[cfg_attr(
        feature = "config",
        arg(long = "mock-gazetteer", env = "MOCK_GAZETTEER", value_delimiter = ',')
    )]
    #[serde(default)]
    pub gazetteer: Vec<String>,

    /// Words longer than this many characters are cut into `##` pieces.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "mock-max-piece-len",
            env = "MOCK_MAX_PIECE_LEN",
            default_value = "8"
        )
    )]
    #[serde(default = "default_max_piece_len")]
    pub max_piece_len: usize,
}

fn default_max_piece_len() -> usize {
    8
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            gazetteer: Vec::new(),
            max_piece_len: default_max_piece_len(),
        }
    }
}

impl MockConfig {
    /// Convert this configuration into a slot-filling service.
    pub fn into_service(self) -> SlotFillingService {
        MockProvider::new(self).into_service()
    }
}

/// One parsed gazetteer entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GazetteerEntry {
    slot_type: String,
    words: Vec<String>,
}

/// Mock provider for testing.
///
/// Implements [`SlotFillingProvider`] with deterministic, dictionary-driven
/// labels.
#[derive(Clone, Debug)]
pub struct MockProvider {
    config: Arc<MockConfig>,
    gazetteer: Arc<[GazetteerEntry]>,
    defaults: Arc<LabelSet>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

impl MockProvider {
    /// Creates a new mock provider with the given configuration.
    pub fn new(config: MockConfig) -> Self {
        let entries: Vec<&str> = if config.gazetteer.is_empty() {
            BUILTIN_GAZETTEER.to_vec()
        } else {
            config.gazetteer.iter().map(String::as_str).collect()
        };

        let gazetteer = entries.into_iter().filter_map(parse_entry).collect();

        Self {
            config: Arc::new(config),
            gazetteer,
            defaults: Arc::new(builtin_label_set()),
        }
    }

    /// Creates a new mock provider recognizing the given entries.
    pub fn with_gazetteer<I>(entries: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(MockConfig {
            gazetteer: entries.into_iter().map(Into::into).collect(),
            ..Default::default()
        })
    }

    /// Replaces the default label set.
    pub fn with_label_set(mut self, labels: LabelSet) -> Self {
        self.defaults = Arc::new(labels);
        self
    }

    /// Convert this provider into a slot-filling service.
    pub fn into_service(self) -> SlotFillingService {
        SlotFillingService::from_provider(self)
    }

    /// Splits text the way an uncased BERT basic tokenizer would.
    fn words(text: &str) -> Vec<String> {
        let mut words = Vec::new();

        for chunk in text.split_whitespace() {
            let mut current = String::new();
            for c in chunk.chars() {
                if c.is_alphanumeric() {
                    current.extend(c.to_lowercase());
                    continue;
                }

                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                words.push(c.to_string());
            }

            if !current.is_empty() {
                words.push(current);
            }
        }

        words
    }

    /// Cuts a word into pieces of at most `max_piece_len` characters.
    fn pieces(&self, word: &str) -> Vec<String> {
        let max = self.config.max_piece_len.max(1);
        let chars: Vec<char> = word.chars().collect();

        chars
            .chunks(max)
            .enumerate()
            .map(|(index, chunk)| {
                let piece: String = chunk.iter().collect();
                match index {
                    0 => piece,
                    _ => format!("{SUBWORD_PREFIX}{piece}"),
                }
            })
            .collect()
    }

    /// Labels whole words against the candidates, first match wins.
    fn label_words(&self, words: &[String], candidates: &[&str]) -> Vec<(usize, IobTag)> {
        let mut labels = vec![(0, IobTag::Outside); words.len()];

        for (class, slot_type) in candidates.iter().enumerate() {
            let phrases = self
                .gazetteer
                .iter()
                .filter(|entry| entry.slot_type.eq_ignore_ascii_case(slot_type));

            for entry in phrases {
                let len = entry.words.len();
                let mut start = 0;
                while start + len <= words.len() {
                    let window = start..start + len;
                    let free = labels[window.clone()].iter().all(|(_, t)| !t.is_entity());
                    if free && words[window] == entry.words[..] {
                        labels[start] = (class, IobTag::Begin);
                        for label in &mut labels[start + 1..start + len] {
                            *label = (class, IobTag::Inside);
                        }
                        start += len;
                    } else {
                        start += 1;
                    }
                }
            }
        }

        labels
    }
}

#[async_trait::async_trait]
impl SlotFillingProvider for MockProvider {
    async fn label(
        &self,
        text: &str,
        type_descriptions: &[TypeDescription],
    ) -> Result<ModelOutput> {
        let candidates: Vec<&str> = type_descriptions
            .iter()
            .map(|td| {
                let td = td.as_str();
                td.split_once(TYPE_DESCRIPTION_DELIMITER).map_or(td, |(t, _)| t)
            })
            .collect();

        let words = Self::words(text);
        let word_labels = self.label_words(&words, &candidates);

        let mut output = ModelOutput::default();
        output.tokens.push(CLS_TOKEN.to_owned());
        output.slot_classes.push(0);
        output.iob_tags.push(IobTag::Outside);

        for (word, (class, tag)) in words.iter().zip(word_labels) {
            for (index, piece) in self.pieces(word).into_iter().enumerate() {
                let tag = match (index, tag) {
                    (0, tag) => tag,
                    (_, IobTag::Outside) => IobTag::Outside,
                    _ => IobTag::Inside,
                };
                output.tokens.push(piece);
                output.slot_classes.push(class);
                output.iob_tags.push(tag);
            }
        }

        output.tokens.push(SEP_TOKEN.to_owned());
        output.slot_classes.push(0);
        output.iob_tags.push(IobTag::Outside);

        tracing::trace!(
            target: TRACING_TARGET,
            tokens = output.tokens.len(),
            candidates = candidates.len(),
            "Mock labeling"
        );

        Ok(output)
    }

    fn default_label_set(&self) -> &LabelSet {
        &self.defaults
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        Ok(ServiceHealth::healthy())
    }
}

/// Entries used when the configuration names none.
const BUILTIN_GAZETTEER: &[&str] = &[
    "LOC=boston",
    "LOC=new york",
    "LOC=san francisco",
    "LOC=denver",
    "DATE=tomorrow",
    "DATE=next friday",
    "TIME=noon",
    "TIME=tonight",
    "ORG=united airlines",
    "PER=alice",
];

fn builtin_label_set() -> LabelSet {
    [
        ("LOC", "a city or place name"),
        ("DATE", "a calendar date or day of the week"),
        ("TIME", "a time of day"),
        ("ORG", "a company or organization"),
        ("PER", "the name of a person"),
    ]
    .into_iter()
    .map(|(slot_type, description)| LabelEntry::new(slot_type, description))
    .collect()
}

fn parse_entry(entry: &str) -> Option<GazetteerEntry> {
    let parsed = entry
        .split_once(GAZETTEER_SEPARATOR)
        .map(|(slot_type, phrase)| GazetteerEntry {
            slot_type: slot_type.trim().to_owned(),
            words: MockProvider::words(phrase),
        })
        .filter(|e| !e.slot_type.is_empty() && !e.words.is_empty());

    if parsed.is_none() {
        tracing::warn!(
            target: TRACING_TARGET,
            entry = entry,
            "Ignoring malformed gazetteer entry, expected TYPE=phrase"
        );
    }

    parsed
}
