use indexmap::IndexMap;

use crate::types::Entry;

/// Occurrence counts per label. Labels keep the order in which they were
/// first counted, which breaks ties in the rankings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FrequencyTable {
    counts: IndexMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> FrequencyTable {
        Self::default()
    }

    pub fn increment(&mut self, label: &str) {
        self.add(label, 1);
    }

    pub fn add(&mut self, label: &str, count: usize) {
        match self.counts.get_mut(label) {
            Some(n) => *n += count,
            None => {
                self.counts.insert(label.to_string(), count);
            }
        }
    }

    pub fn get(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Labels with their counts, in first-counted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(label, n)| (label.as_str(), *n))
    }

    /// All labels by descending count; equal counts stay in first-counted order.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<_> = self.iter().collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// The `n` most frequent labels, ordered like `ranked`.
    pub fn top(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }

    /// Add all counts of `other`. Labels new to `self` are appended in `other`'s order.
    pub fn merge(&mut self, other: &FrequencyTable) {
        for (label, n) in other.iter() {
            self.add(label, n);
        }
    }
}

impl<'a> FromIterator<&'a str> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for label in iter {
            table.increment(label);
        }
        table
    }
}

/// Aggregated counts over all entries of a run.
///
/// `total_entries` always equals `entry_types.total()`; the other tables
/// may count less since not every entry carries every field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Statistics {
    pub total_entries: usize,
    pub entry_types: FrequencyTable,
    pub authors: FrequencyTable,
    pub journals: FrequencyTable,
    pub conferences: FrequencyTable,
    pub years: FrequencyTable,
}

impl Statistics {
    pub fn new() -> Statistics {
        Self::default()
    }

    /// Count one entry in every table it contributes to.
    pub fn record(&mut self, entry: &Entry) {
        self.total_entries += 1;
        self.entry_types.increment(&entry.kind);
        for author in entry.authors() {
            self.authors.increment(&author);
        }
        if let Some(journal) = entry.journal() {
            self.journals.increment(&journal);
        }
        if let Some(conference) = entry.conference() {
            self.conferences.increment(&conference);
        }
        if let Some(year) = entry.year() {
            self.years.increment(&year);
        }
    }

    /// Fold a sequence of entries into the counts, returning how many were added.
    pub fn extend_from<I: IntoIterator<Item = Entry>>(&mut self, entries: I) -> usize {
        let before = self.total_entries;
        for entry in entries {
            self.record(&entry);
        }
        self.total_entries - before
    }

    /// Per-table count addition. The resulting counts do not depend on the
    /// order in which partial statistics are merged.
    pub fn merge(&mut self, other: &Statistics) {
        self.total_entries += other.total_entries;
        self.entry_types.merge(&other.entry_types);
        self.authors.merge(&other.authors);
        self.journals.merge(&other.journals);
        self.conferences.merge(&other.conferences);
        self.years.merge(&other.years);
    }
}

impl FromIterator<Entry> for Statistics {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut stats = Statistics::new();
        stats.extend_from(iter);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    const TWO_ENTRIES: &str = "\
@article{k1, author = {A and B}, journal = {The Foo Journal}, year = {1999}}
@inproceedings{k2, author = {C}, booktitle = {Proceedings of Bar Conf}, year = {2001}}
";

    fn counts(table: &FrequencyTable) -> Vec<(&str, usize)> {
        table.iter().collect()
    }

    #[test]
    fn test_two_entry_document() {
        let stats: Statistics = Parser::from_string(TWO_ENTRIES.to_string()).iter().collect();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(
            counts(&stats.entry_types),
            vec![("article", 1), ("inproceedings", 1)]
        );
        assert_eq!(counts(&stats.authors), vec![("A", 1), ("B", 1), ("C", 1)]);
        assert_eq!(counts(&stats.journals), vec![("Foo Journal", 1)]);
        assert_eq!(counts(&stats.conferences), vec![("Bar Conf", 1)]);
        assert_eq!(counts(&stats.years), vec![("1999", 1), ("2001", 1)]);
    }

    #[test]
    fn test_total_matches_entry_types() {
        let src = "@misc{a}\n@misc{b, year = {n.d.}}\n@book{c, author = {}}";
        let stats: Statistics = Parser::from_string(src.to_string()).iter().collect();
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.entry_types.total(), stats.total_entries);
        assert!(stats.authors.is_empty());
        assert!(stats.years.is_empty());
    }

    #[test]
    fn test_ranking_ties_keep_first_seen_order() {
        let table: FrequencyTable = ["b", "a", "c", "a", "c", "d"].into_iter().collect();
        assert_eq!(table.ranked(), vec![("a", 2), ("c", 2), ("b", 1), ("d", 1)]);
        assert_eq!(table.top(3), vec![("a", 2), ("c", 2), ("b", 1)]);
        assert_eq!(table.top(10).len(), 4);
        assert_eq!(table.get("zzz"), 0);
    }

    #[test]
    fn test_merge_equals_concatenation() {
        let first = "@article{x, author = {A and B}, year = 2000}\n";
        let second = "@book{y, author = {B}, year = 2000, journal = {J}}\n";

        let mut merged: Statistics = Parser::from_string(first.to_string()).iter().collect();
        let other: Statistics = Parser::from_string(second.to_string()).iter().collect();
        merged.merge(&other);

        let concatenated: Statistics = Parser::from_string(format!("{first}{second}"))
            .iter()
            .collect();
        assert_eq!(merged, concatenated);

        let mut reversed = other.clone();
        reversed.merge(&Parser::from_string(first.to_string()).iter().collect());
        assert_eq!(reversed.total_entries, concatenated.total_entries);
        assert_eq!(reversed.authors.get("B"), 2);
        assert_eq!(reversed.years.get("2000"), 2);
    }

    #[test]
    fn test_duplicate_authors_double_count() {
        let mut stats = Statistics::new();
        let added = stats.extend_from(Parser::from_string("@misc{z, author = {Ann and Ann}}".to_string()).iter());
        assert_eq!(added, 1);
        assert_eq!(stats.authors.get("Ann"), 2);
    }
}
