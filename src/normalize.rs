//! Stateless clean-up of field values: delimiter stripping, author lists,
//! venue names and years.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Separator between names in an author list, e.g. “Smith, J. and Doe, A.”
static AUTHOR_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\sand\s").unwrap());

static PROCEEDINGS_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^proceedings of\s*").unwrap());

static ARTICLE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^the\s+").unwrap());

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{4}").unwrap());

/// Clean one raw field value: trim, remove exactly one layer of matching
/// `{…}` or `"…"` wrapping, drop trailing commas and trim again.
///
/// Values without wrapping and trailing commas come back unchanged.
pub fn normalize_value(raw: &str) -> String {
    let mut value = raw.trim();
    if value.len() >= 2
        && ((value.starts_with('{') && value.ends_with('}'))
            || (value.starts_with('"') && value.ends_with('"')))
    {
        value = &value[1..value.len() - 1];
    }
    value.trim_end_matches(',').trim().to_string()
}

/// Remove all curly braces, e.g. “{IEEE} {T}ransactions” becomes “IEEE Transactions”.
pub fn strip_braces(src: &str) -> String {
    src.chars().filter(|&c| c != '{' && c != '}').collect()
}

/// Replace every run of whitespace by a single space.
pub fn collapse_whitespace(src: &str) -> String {
    let mut result = String::new();
    let mut was_whitespace = false;
    for chr in src.chars() {
        if chr.is_whitespace() {
            if !was_whitespace {
                result.push(' ');
            }
            was_whitespace = true;
        } else {
            result.push(chr);
            was_whitespace = false;
        }
    }
    result
}

/// Split an author field into single names. The order and any duplicates
/// are kept; fragments that are empty after cleaning are dropped.
pub fn split_authors(field: &str) -> Vec<String> {
    AUTHOR_SEPARATOR
        .split(field)
        .map(|author| strip_braces(&collapse_whitespace(author.trim())))
        .filter(|author| !author.is_empty())
        .collect()
}

fn first_non_empty<'f>(fields: &'f HashMap<String, String>, names: &[&str]) -> Option<&'f str> {
    names
        .iter()
        .filter_map(|name| fields.get(*name))
        .map(String::as_str)
        .find(|value| !value.is_empty())
}

/// Journal name from `journal`, falling back to `journaltitle`.
/// A leading “proceedings of” and a leading “the” are removed.
pub fn journal_name(fields: &HashMap<String, String>) -> Option<String> {
    let raw = first_non_empty(fields, &["journal", "journaltitle"])?;
    let name = strip_braces(raw);
    let name = PROCEEDINGS_PREFIX.replace(&name, "");
    let name = ARTICLE_PREFIX.replace(&name, "");
    non_empty(name.trim())
}

/// Conference name from `booktitle`, falling back to `conference`.
/// A leading “proceedings of”, together with a “the” directly following it,
/// is removed. A conference name that itself starts with “the” keeps it.
pub fn conference_name(fields: &HashMap<String, String>) -> Option<String> {
    let raw = first_non_empty(fields, &["booktitle", "conference"])?;
    let name = strip_braces(raw);
    let name = match PROCEEDINGS_PREFIX.find(&name).map(|prefix| prefix.end()) {
        Some(end) => ARTICLE_PREFIX.replace(&name[end..], "").into_owned(),
        None => name,
    };
    non_empty(name.trim())
}

/// The first run of four digits in the `year` field, e.g. “2020.” gives “2020”.
pub fn year(fields: &HashMap<String, String>) -> Option<String> {
    let raw = fields.get("year")?;
    YEAR.find(raw).map(|m| m.as_str().to_string())
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_strips_one_layer() {
        assert_eq!(normalize_value("  {{NASA} report}  "), "{NASA} report");
        assert_eq!(normalize_value("\"quoted\""), "quoted");
        assert_eq!(normalize_value("1999,"), "1999");
        assert_eq!(normalize_value("{"), "{");
    }

    #[test]
    fn test_normalize_is_idempotent_on_clean_values() {
        for value in ["plain text", "Smith, J. and Doe, A.", "2020", ""] {
            assert_eq!(normalize_value(value), value);
            let once = normalize_value(&format!("{{{}}}", value));
            assert_eq!(normalize_value(&once), once);
        }
    }

    #[test]
    fn test_split_authors() {
        assert_eq!(
            split_authors("Smith, J. and Doe, A. and Lee"),
            vec!["Smith, J.", "Doe, A.", "Lee"]
        );
        assert_eq!(
            split_authors("{van der Berg}, Ann   AND\n  Bob  Brandt"),
            vec!["van der Berg, Ann", "Bob Brandt"]
        );
        assert_eq!(split_authors("Anderson and Sandberg"), vec!["Anderson", "Sandberg"]);
        assert_eq!(split_authors("A and A"), vec!["A", "A"]);
        assert!(split_authors("{}").is_empty());
    }

    #[test]
    fn test_journal_name() {
        let f = fields(&[("journal", "The Journal of Bar")]);
        assert_eq!(journal_name(&f).as_deref(), Some("Journal of Bar"));

        let f = fields(&[("journal", ""), ("journaltitle", "{ACM} Computing Surveys")]);
        assert_eq!(journal_name(&f).as_deref(), Some("ACM Computing Surveys"));

        let f = fields(&[("journal", "Proceedings of the VLDB Endowment")]);
        assert_eq!(journal_name(&f).as_deref(), Some("VLDB Endowment"));

        assert_eq!(journal_name(&fields(&[("journal", "{}")])), None);
        assert_eq!(journal_name(&fields(&[])), None);
    }

    #[test]
    fn test_conference_name() {
        let f = fields(&[(
            "booktitle",
            "Proceedings of the International Conference on Foo",
        )]);
        assert_eq!(
            conference_name(&f).as_deref(),
            Some("International Conference on Foo")
        );

        let f = fields(&[("booktitle", "The Web Conference")]);
        assert_eq!(conference_name(&f).as_deref(), Some("The Web Conference"));

        let f = fields(&[("conference", "proceedings of {Bar} Conf")]);
        assert_eq!(conference_name(&f).as_deref(), Some("Bar Conf"));
    }

    #[test]
    fn test_year() {
        assert_eq!(year(&fields(&[("year", "2020.")])).as_deref(), Some("2020"));
        assert_eq!(year(&fields(&[("year", "c. 1850--1860")])).as_deref(), Some("1850"));
        assert_eq!(year(&fields(&[("year", "in press")])), None);
        assert_eq!(year(&fields(&[])), None);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a \t\n b  c"), "a b c");
    }
}
