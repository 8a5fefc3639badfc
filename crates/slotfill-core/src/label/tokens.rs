//! Token-level labels produced by a model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Prefix marking a WordPiece continuation token.
pub const SUBWORD_PREFIX: &str = "##";

/// Per-token IOB tag.
///
/// Encoded on the wire as an integer: `0 = O`, `1 = B`, `2 = I`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IobTag {
    /// Outside any entity.
    #[default]
    Outside,
    /// First token of an entity.
    Begin,
    /// Continuation of an entity.
    Inside,
}

impl IobTag {
    /// Returns true for `B` and `I`.
    #[inline]
    pub fn is_entity(self) -> bool {
        !matches!(self, Self::Outside)
    }
}

/// An integer that is not a valid [`IobTag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid IOB tag {0}, expected 0 (O), 1 (B) or 2 (I)")]
pub struct InvalidIobTag(pub u8);

impl TryFrom<u8> for IobTag {
    type Error = InvalidIobTag;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Outside),
            1 => Ok(Self::Begin),
            2 => Ok(Self::Inside),
            other => Err(InvalidIobTag(other)),
        }
    }
}

impl From<IobTag> for u8 {
    fn from(tag: IobTag) -> Self {
        match tag {
            IobTag::Outside => 0,
            IobTag::Begin => 1,
            IobTag::Inside => 2,
        }
    }
}

impl fmt::Display for IobTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Outside => "O",
            Self::Begin => "B",
            Self::Inside => "I",
        })
    }
}

/// Raw labeling output for one utterance, sentinel tokens included.
///
/// `tokens`, `slot_classes` and `iob_tags` are parallel. The first and last
/// positions hold the model's boundary tokens (`[CLS]`/`[SEP]` for BERT).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelOutput {
    /// Sub-word tokens.
    pub tokens: Vec<String>,
    /// Primary label: index of the candidate type, per token.
    pub slot_classes: Vec<usize>,
    /// IOB label, per token.
    pub iob_tags: Vec<IobTag>,
}

impl ModelOutput {
    /// Creates a new model output.
    pub fn new(tokens: Vec<String>, slot_classes: Vec<usize>, iob_tags: Vec<IobTag>) -> Self {
        Self {
            tokens,
            slot_classes,
            iob_tags,
        }
    }

    /// Drops the leading and trailing sentinel from all three sequences.
    ///
    /// # Errors
    ///
    /// Returns an inference error if the sequences have different lengths or
    /// fewer than two positions.
    pub fn strip_sentinels(self) -> Result<TokenLabels> {
        let Self {
            mut tokens,
            mut slot_classes,
            mut iob_tags,
        } = self;

        check_parallel(tokens.len(), slot_classes.len(), iob_tags.len())?;
        if tokens.len() < 2 {
            return Err(Error::inference().with_message(format!(
                "model returned {} tokens, expected at least the two boundary tokens",
                tokens.len()
            )));
        }

        let inner = 1..tokens.len() - 1;
        Ok(TokenLabels {
            tokens: tokens.drain(inner.clone()).collect(),
            slot_classes: slot_classes.drain(inner.clone()).collect(),
            iob_tags: iob_tags.drain(inner).collect(),
        })
    }
}

/// Parallel token, class and tag sequences without sentinels.
///
/// Holds either sub-word tokens (straight from the model) or whole words
/// (after [`TokenLabels::merge_wordpiece`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenLabels {
    tokens: Vec<String>,
    slot_classes: Vec<usize>,
    iob_tags: Vec<IobTag>,
}

impl TokenLabels {
    /// Creates labels from parallel sequences.
    ///
    /// # Errors
    ///
    /// Returns an inference error if the sequences have different lengths.
    pub fn new(tokens: Vec<String>, slot_classes: Vec<usize>, iob_tags: Vec<IobTag>) -> Result<Self> {
        check_parallel(tokens.len(), slot_classes.len(), iob_tags.len())?;
        Ok(Self {
            tokens,
            slot_classes,
            iob_tags,
        })
    }

    /// Appends one labeled token.
    pub fn push(&mut self, token: impl Into<String>, slot_class: usize, iob_tag: IobTag) {
        self.tokens.push(token.into());
        self.slot_classes.push(slot_class);
        self.iob_tags.push(iob_tag);
    }

    /// Returns the tokens.
    #[inline]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Returns the primary labels.
    #[inline]
    pub fn slot_classes(&self) -> &[usize] {
        &self.slot_classes
    }

    /// Returns the IOB labels.
    #[inline]
    pub fn iob_tags(&self) -> &[IobTag] {
        &self.iob_tags
    }

    /// Iterates over `(token, class, tag)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize, IobTag)> {
        self.tokens
            .iter()
            .zip(&self.slot_classes)
            .zip(&self.iob_tags)
            .map(|((token, class), tag)| (token.as_str(), *class, *tag))
    }

    /// Returns the number of tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if there are no tokens.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Consumes the labels and returns the tokens.
    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }

    /// Glues `##` continuation pieces onto the preceding word.
    ///
    /// A merged word keeps the class and tag of its first piece. A
    /// continuation piece with nothing before it becomes a word of its own
    /// with the marker removed.
    pub fn merge_wordpiece(&self) -> Self {
        let mut merged = Self::default();

        for (token, class, tag) in self.iter() {
            match token.strip_prefix(SUBWORD_PREFIX) {
                Some(rest) if !merged.is_empty() => {
                    if let Some(word) = merged.tokens.last_mut() {
                        word.push_str(rest);
                    }
                }
                Some(rest) => merged.push(rest, class, tag),
                None => merged.push(token, class, tag),
            }
        }

        merged
    }

    /// Replaces each word with its original spelling in `text`.
    ///
    /// Words are matched case-insensitively, left to right, each search
    /// starting after the previous match. A word that cannot be found (an
    /// unknown-token marker, say) keeps the model's spelling.
    pub fn restore_surface(mut self, text: &str) -> Self {
        let mut cursor = 0;

        for word in &mut self.tokens {
            if word.is_empty() {
                continue;
            }

            let found = text[cursor..].char_indices().find_map(|(offset, _)| {
                let start = cursor + offset;
                match_len(&text[start..], word).map(|len| (start, start + len))
            });

            if let Some((start, end)) = found {
                *word = text[start..end].to_owned();
                cursor = end;
            }
        }

        self
    }
}

/// Byte length of the prefix of `text` equal to `word`, ignoring case.
fn match_len(text: &str, word: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    let mut len = 0;

    for expected in word.chars() {
        let (offset, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
        len = offset + actual.len_utf8();
    }

    Some(len)
}

fn check_parallel(tokens: usize, classes: usize, tags: usize) -> Result<()> {
    if tokens == classes && classes == tags {
        return Ok(());
    }

    Err(Error::inference().with_message(format!(
        "model returned misaligned sequences: {tokens} tokens, {classes} slot classes, {tags} IOB tags"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    use super::IobTag::{Begin as B, Inside as I, Outside as O};

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn iob_tag_wire_encoding() {
        let tags: Vec<IobTag> = serde_json::from_str("[0, 1, 2]").unwrap();
        assert_eq!(tags, vec![O, B, I]);
        assert_eq!(serde_json::to_string(&tags).unwrap(), "[0,1,2]");
        assert!(serde_json::from_str::<IobTag>("3").is_err());
    }

    #[test]
    fn iob_tag_display() {
        let rendered: Vec<String> = [O, B, I].iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["O", "B", "I"]);
    }

    #[test]
    fn strip_sentinels_removes_both_ends() {
        let output = ModelOutput::new(
            strings(&["[CLS]", "to", "boston", "[SEP]"]),
            vec![0, 0, 1, 0],
            vec![O, O, B, O],
        );

        let labels = output.strip_sentinels().unwrap();
        assert_eq!(labels.tokens(), ["to", "boston"]);
        assert_eq!(labels.slot_classes(), [0, 1]);
        assert_eq!(labels.iob_tags(), [O, B]);
    }

    #[test]
    fn strip_sentinels_of_empty_utterance() {
        let output = ModelOutput::new(strings(&["[CLS]", "[SEP]"]), vec![0, 0], vec![O, O]);
        assert!(output.strip_sentinels().unwrap().is_empty());
    }

    #[test]
    fn strip_sentinels_rejects_short_output() {
        let output = ModelOutput::new(strings(&["[CLS]"]), vec![0], vec![O]);
        let error = output.strip_sentinels().unwrap_err();
        assert_eq!(error.kind, ErrorKind::Inference);
    }

    #[test]
    fn strip_sentinels_rejects_misaligned_output() {
        let output = ModelOutput::new(strings(&["[CLS]", "a", "[SEP]"]), vec![0, 0], vec![O, O, O]);
        let error = output.strip_sentinels().unwrap_err();
        assert_eq!(error.kind, ErrorKind::Inference);
        assert!(error.message().contains("misaligned"));
    }

    #[test]
    fn merge_wordpiece_realigns_labels() {
        let labels = TokenLabels::new(
            strings(&["fly", "to", "san", "fran", "##cis", "##co"]),
            vec![0, 0, 2, 2, 1, 1],
            vec![O, O, B, I, O, O],
        )
        .unwrap();

        let merged = labels.merge_wordpiece();
        assert_eq!(merged.tokens(), ["fly", "to", "san", "francisco"]);
        assert_eq!(merged.slot_classes(), [0, 0, 2, 2]);
        assert_eq!(merged.iob_tags(), [O, O, B, I]);
    }

    #[test]
    fn merge_wordpiece_keeps_leading_orphan_piece() {
        let labels = TokenLabels::new(strings(&["##ing", "on"]), vec![0, 0], vec![O, O]).unwrap();
        let merged = labels.merge_wordpiece();
        assert_eq!(merged.tokens(), ["ing", "on"]);
    }

    #[test]
    fn restore_surface_recovers_original_casing() {
        let labels = TokenLabels::new(
            strings(&["fly", "to", "san", "francisco", "!"]),
            vec![0; 5],
            vec![O; 5],
        )
        .unwrap();

        let restored = labels.restore_surface("Fly to  San FRANCISCO!");
        assert_eq!(restored.tokens(), ["Fly", "to", "San", "FRANCISCO", "!"]);
    }

    #[test]
    fn restore_surface_keeps_unmatched_words() {
        let labels = TokenLabels::new(
            strings(&["[UNK]", "to", "boston"]),
            vec![0; 3],
            vec![O; 3],
        )
        .unwrap();

        let restored = labels.restore_surface("Zürich to Boston");
        assert_eq!(restored.tokens(), ["[UNK]", "to", "Boston"]);
    }

    #[test]
    fn restore_surface_matches_repeated_words_in_order() {
        let labels =
            TokenLabels::new(strings(&["new", "york", "new"]), vec![0; 3], vec![O; 3]).unwrap();

        let restored = labels.restore_surface("New York, new");
        assert_eq!(restored.tokens(), ["New", "York", "new"]);
    }
}
