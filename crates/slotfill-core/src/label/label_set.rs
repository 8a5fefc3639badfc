//! Candidate entity types and their natural-language descriptions.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Separator between a type and its description, both in the model input
/// and in the description table a model ships with.
pub const TYPE_DESCRIPTION_DELIMITER: char = '\t';

/// A `type<TAB>description` string, one per candidate, fed to the model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeDescription(String);

impl TypeDescription {
    /// Joins a type and its description with [`TYPE_DESCRIPTION_DELIMITER`].
    pub fn new(slot_type: &str, description: &str) -> Self {
        Self(format!(
            "{slot_type}{TYPE_DESCRIPTION_DELIMITER}{description}"
        ))
    }

    /// Returns the joined string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TypeDescription {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One candidate entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelEntry {
    /// Short type name, e.g. `LOC`.
    pub slot_type: String,
    /// Natural-language description, e.g. `a city or place name`.
    pub description: String,
}

impl LabelEntry {
    /// Creates a new entry.
    pub fn new(slot_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            slot_type: slot_type.into(),
            description: description.into(),
        }
    }

    /// Returns the model input for this entry.
    pub fn type_description(&self) -> TypeDescription {
        TypeDescription::new(&self.slot_type, &self.description)
    }
}

/// An ordered list of candidate entity types.
///
/// Used both for the candidates of a single request and for the default
/// table a model is restored with. Order matters: the model reports entity
/// classes as indices into this list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    entries: Vec<LabelEntry>,
}

impl LabelSet {
    /// Creates a label set from entries.
    pub fn new(entries: Vec<LabelEntry>) -> Self {
        Self { entries }
    }

    /// Pairs types with descriptions positionally.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error when the lengths differ.
    pub fn from_pairs(types: &[String], descriptions: &[String]) -> Result<Self> {
        if types.len() != descriptions.len() {
            return Err(Error::invalid_input().with_message(format!(
                "entity_types has {} items but entity_descriptions has {}; \
                 they are paired by position and must have equal length",
                types.len(),
                descriptions.len()
            )));
        }

        let entries = types
            .iter()
            .zip(descriptions)
            .map(|(slot_type, description)| LabelEntry::new(slot_type, description))
            .collect();

        Ok(Self::new(entries))
    }

    /// Parses a tab-delimited table with one `type<TAB>description` row per line.
    ///
    /// Blank lines are skipped and a trailing `\r` is ignored. Anything after
    /// the first tab belongs to the description.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the offending line when a row has
    /// no tab or an empty type.
    pub fn parse_tsv(input: &str) -> Result<Self> {
        let mut entries = Vec::new();

        for (index, line) in input.lines().enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.trim().is_empty() {
                continue;
            }

            let Some((slot_type, description)) = line.split_once(TYPE_DESCRIPTION_DELIMITER)
            else {
                return Err(Error::configuration().with_message(format!(
                    "label table line {}: expected `type<TAB>description`",
                    index + 1
                )));
            };

            let slot_type = slot_type.trim();
            if slot_type.is_empty() {
                return Err(Error::configuration().with_message(format!(
                    "label table line {}: empty entity type",
                    index + 1
                )));
            }

            entries.push(LabelEntry::new(slot_type, description.trim()));
        }

        Ok(Self::new(entries))
    }

    /// Reads and parses a tab-delimited table from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|err| {
            Error::configuration()
                .with_message(format!("failed to read label table {}", path.display()))
                .with_source(err)
        })?;

        Self::parse_tsv(&contents)
    }

    /// Returns the entries in order.
    #[inline]
    pub fn entries(&self) -> &[LabelEntry] {
        &self.entries
    }

    /// Returns the type column.
    pub fn types(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.slot_type.clone()).collect()
    }

    /// Returns the description column.
    pub fn descriptions(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.description.clone()).collect()
    }

    /// Returns one model input string per entry, in order.
    pub fn type_descriptions(&self) -> Vec<TypeDescription> {
        self.entries.iter().map(LabelEntry::type_description).collect()
    }

    /// Returns the position of a type, compared case-insensitively.
    pub fn position(&self, slot_type: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.slot_type.eq_ignore_ascii_case(slot_type))
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for LabelSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_tsv(s)
    }
}

impl FromIterator<LabelEntry> for LabelSet {
    fn from_iter<I: IntoIterator<Item = LabelEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn type_description_joins_with_tab() {
        let td = TypeDescription::new("LOC", "a city or place name");
        assert_eq!(td.as_str(), "LOC\ta city or place name");
    }

    #[test]
    fn from_pairs_preserves_order() {
        let types = vec!["LOC".to_string(), "DATE".to_string()];
        let descriptions = vec!["a place".to_string(), "a calendar date".to_string()];

        let set = LabelSet::from_pairs(&types, &descriptions).unwrap();
        assert_eq!(set.types(), types);
        assert_eq!(set.descriptions(), descriptions);
        assert_eq!(set.type_descriptions()[1].as_str(), "DATE\ta calendar date");
    }

    #[test]
    fn from_pairs_rejects_length_mismatch() {
        let types = vec!["LOC".to_string()];
        let error = LabelSet::from_pairs(&types, &[]).unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidInput);
        assert!(error.message().contains("equal length"));
    }

    #[test]
    fn parse_tsv_skips_blank_lines_and_crlf() {
        let set = LabelSet::parse_tsv("LOC\ta place\r\n\nTIME\ta time of day\n").unwrap();
        assert_eq!(set.types(), vec!["LOC", "TIME"]);
        assert_eq!(set.descriptions(), vec!["a place", "a time of day"]);
    }

    #[test]
    fn parse_tsv_keeps_extra_tabs_in_description() {
        let set = LabelSet::parse_tsv("NOTE\tfree\ttext").unwrap();
        assert_eq!(set.entries()[0].description, "free\ttext");
    }

    #[test]
    fn parse_tsv_rejects_rows_without_tab() {
        let error = LabelSet::parse_tsv("LOC\ta place\nbroken row").unwrap_err();
        assert_eq!(error.kind, ErrorKind::Configuration);
        assert!(error.message().contains("line 2"));
    }

    #[test]
    fn parse_tsv_rejects_empty_type() {
        let error = LabelSet::parse_tsv("\tno type").unwrap_err();
        assert_eq!(error.kind, ErrorKind::Configuration);
    }

    #[test]
    fn position_is_case_insensitive() {
        let set: LabelSet = "LOC\ta place\nDATE\ta date".parse().unwrap();
        assert_eq!(set.position("date"), Some(1));
        assert_eq!(set.position("PER"), None);
    }

    #[tokio::test]
    async fn from_path_reads_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "LOC\ta city or place name").unwrap();
        writeln!(file, "ORG\tan organization").unwrap();

        let set = LabelSet::from_path(file.path()).await.unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.types(), vec!["LOC", "ORG"]);
    }

    #[tokio::test]
    async fn from_path_missing_file_is_configuration_error() {
        let error = LabelSet::from_path("/nonexistent/slot_descriptions.tsv")
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Configuration);
    }
}
