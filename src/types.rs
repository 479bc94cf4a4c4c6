use std::collections::HashMap;

use crate::normalize;
use crate::segmenter::UNKNOWN_KEY;

/// One entry in a `.bib` file
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// lowercased entry type, e.g. “article”
    pub kind: String,
    /// citation key, e.g. “DBLP:books/lib/Knuth97”, or “unknown”
    pub key: String,
    /// map of lowercased field names to cleaned values, e.g. “author” mapped to “Donald Ervin Knuth”
    pub fields: HashMap<String, String>,
}

impl Entry {
    /// Generate an entry without fields.
    pub fn new<K: Into<String>, I: Into<String>>(kind: K, key: I) -> Entry {
        Entry {
            kind: kind.into(),
            key: key.into(),
            fields: HashMap::new(),
        }
    }

    /// Names listed in the `author` field, in order of appearance.
    pub fn authors(&self) -> Vec<String> {
        match self.fields.get("author") {
            Some(field) => normalize::split_authors(field),
            None => Vec::new(),
        }
    }

    /// Journal name, see `normalize::journal_name`.
    pub fn journal(&self) -> Option<String> {
        normalize::journal_name(&self.fields)
    }

    /// Conference name, see `normalize::conference_name`.
    pub fn conference(&self) -> Option<String> {
        normalize::conference_name(&self.fields)
    }

    /// Four-digit publication year, if the `year` field carries one.
    pub fn year(&self) -> Option<String> {
        normalize::year(&self.fields)
    }
}

impl Default for Entry {
    fn default() -> Self {
        Self::new("misc", UNKNOWN_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_views_over_fields() {
        let mut entry = Entry::new("inproceedings", "k2");
        entry.fields.insert("author".into(), "C and {D}".into());
        entry.fields.insert("booktitle".into(), "Proceedings of Bar Conf".into());
        entry.fields.insert("year".into(), "2001".into());

        assert_eq!(entry.authors(), vec!["C", "D"]);
        assert_eq!(entry.journal(), None);
        assert_eq!(entry.conference().as_deref(), Some("Bar Conf"));
        assert_eq!(entry.year().as_deref(), Some("2001"));
    }

    #[test]
    fn test_entry_without_fields() {
        let entry = Entry::default();
        assert!(entry.authors().is_empty());
        assert_eq!(entry.year(), None);
        assert_eq!(entry.key, "unknown");
    }
}
