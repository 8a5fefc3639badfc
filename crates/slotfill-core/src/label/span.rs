//! Span decoding from word-level IOB labels.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::tokens::{IobTag, TokenLabels};
use crate::{Error, Result};

/// A contiguous run of words sharing one entity class.
///
/// `start` is inclusive and `end` is exclusive, both in word positions.
/// Serialized as a two-element array `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
}

impl EntitySpan {
    /// Creates a span covering `start..end`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of words in the span.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span covers no words.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Returns the covered words, or nothing if the span is out of range.
    pub fn words<'a>(&self, tokens: &'a [String]) -> &'a [String] {
        tokens.get(self.start..self.end).unwrap_or_default()
    }
}

impl From<(usize, usize)> for EntitySpan {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(start, end)
    }
}

impl From<EntitySpan> for (usize, usize) {
    fn from(span: EntitySpan) -> Self {
        (span.start, span.end)
    }
}

/// Spans keyed by the index of their entity type in the candidate list.
pub type EntitiesDict = BTreeMap<usize, Vec<EntitySpan>>;

/// Groups word-level labels into entity spans.
///
/// A word belongs to an entity when its tag is `B` or `I`. A span opens on
/// `B`, on an `I` with no open span, and on an `I` whose class differs from
/// the open span. It closes on `O`, when a new span opens, or at the end.
///
/// # Errors
///
/// Returns an inference error when an entity word carries a class index
/// that is not below `num_types`.
pub fn decode_spans(words: &TokenLabels, num_types: usize) -> Result<EntitiesDict> {
    let mut entities = EntitiesDict::new();
    let mut open: Option<(usize, usize)> = None;

    let mut close = |open: &mut Option<(usize, usize)>, end: usize| {
        if let Some((class, start)) = open.take() {
            entities
                .entry(class)
                .or_default()
                .push(EntitySpan::new(start, end));
        }
    };

    for (position, (_, class, tag)) in words.iter().enumerate() {
        if tag.is_entity() && class >= num_types {
            return Err(Error::inference().with_message(format!(
                "model assigned class {class} to word {position}, but only {num_types} entity types were given"
            )));
        }

        match (tag, open) {
            (IobTag::Outside, _) => close(&mut open, position),
            (IobTag::Inside, Some((open_class, _))) if open_class == class => {}
            (IobTag::Begin | IobTag::Inside, _) => {
                close(&mut open, position);
                open = Some((class, position));
            }
        }
    }

    close(&mut open, words.len());
    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::IobTag::{Begin as B, Inside as I, Outside as O};
    use super::*;
    use crate::ErrorKind;

    fn words(classes: &[usize], tags: &[IobTag]) -> TokenLabels {
        let tokens = (0..classes.len()).map(|i| format!("w{i}")).collect();
        TokenLabels::new(tokens, classes.to_vec(), tags.to_vec()).unwrap()
    }

    #[test]
    fn malformed_spans_are_empty() {
        let tokens = ["fly", "to", "boston"].map(String::from);

        let reversed: EntitySpan = serde_json::from_str("[2, 1]").unwrap();
        assert_eq!(reversed.len(), 0);
        assert!(reversed.is_empty());
        assert!(reversed.words(&tokens).is_empty());

        let past_end = EntitySpan::new(2, 7);
        assert_eq!(past_end.len(), 5);
        assert!(past_end.words(&tokens).is_empty());

        assert_eq!(EntitySpan::new(2, 3).words(&tokens), ["boston"]);
    }

    #[test]
    fn single_word_entity() {
        let spans = decode_spans(&words(&[0, 0, 0, 0, 0], &[O, O, O, O, B]), 1).unwrap();
        assert_eq!(spans[&0], vec![EntitySpan::new(4, 5)]);
    }

    #[test]
    fn multi_word_entity_and_two_types() {
        let labels = words(&[0, 1, 1, 0, 0, 0], &[O, B, I, O, B, I]);
        let spans = decode_spans(&labels, 2).unwrap();

        assert_eq!(spans[&1], vec![EntitySpan::new(1, 3)]);
        assert_eq!(spans[&0], vec![EntitySpan::new(4, 6)]);
    }

    #[test]
    fn adjacent_begin_tags_split_spans() {
        let spans = decode_spans(&words(&[0, 0], &[B, B]), 1).unwrap();
        assert_eq!(spans[&0], vec![EntitySpan::new(0, 1), EntitySpan::new(1, 2)]);
    }

    #[test]
    fn inside_without_begin_opens_span() {
        let spans = decode_spans(&words(&[0, 0, 0], &[O, I, I]), 1).unwrap();
        assert_eq!(spans[&0], vec![EntitySpan::new(1, 3)]);
    }

    #[test]
    fn inside_with_new_class_opens_span() {
        let spans = decode_spans(&words(&[0, 1], &[B, I]), 2).unwrap();
        assert_eq!(spans[&0], vec![EntitySpan::new(0, 1)]);
        assert_eq!(spans[&1], vec![EntitySpan::new(1, 2)]);
    }

    #[test]
    fn no_entities() {
        let spans = decode_spans(&words(&[3, 3], &[O, O]), 1).unwrap();
        assert!(spans.is_empty());
        assert!(decode_spans(&TokenLabels::default(), 0).unwrap().is_empty());
    }

    #[test]
    fn outside_words_ignore_class_range() {
        assert!(decode_spans(&words(&[7], &[O]), 1).is_ok());
    }

    #[test]
    fn rejects_class_out_of_range() {
        let error = decode_spans(&words(&[0, 2], &[B, B]), 2).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Inference);
    }

    #[test]
    fn spans_stay_in_bounds() {
        let tags = [B, I, O, I, B, B, I, O, B];
        let classes = [0, 0, 1, 1, 0, 1, 1, 0, 1];
        let labels = words(&classes, &tags);
        let spans = decode_spans(&labels, 2).unwrap();

        for list in spans.values() {
            assert!(list.len() <= labels.len());
            for span in list {
                assert!(span.start < span.end && span.end <= labels.len());
            }
        }
    }

    #[test]
    fn serializes_as_pair() {
        let mut dict = EntitiesDict::new();
        dict.insert(0, vec![EntitySpan::new(4, 5)]);
        let json = serde_json::to_string(&dict).unwrap();
        assert_eq!(json, r#"{"0":[[4,5]]}"#);
    }
}
