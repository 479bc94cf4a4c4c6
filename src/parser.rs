use std::mem;
use std::path;
use std::str;

use crate::document::Document;
use crate::errors::{Result, StatsError};
use crate::lexer::{FieldLexer, LexingState, Token};
use crate::normalize;
use crate::segmenter::{RawBlock, Segmenter};
use crate::types::Entry;

/// Parser for one `.bib` document allowing iteration over `Entry` instances
pub struct Parser {
    pub(crate) document: Document,
}

impl Parser {
    /// Use a file at some filepath as source for the parsing process.
    pub fn from_file<P: AsRef<path::Path>>(path: P) -> Result<Parser> {
        let document = Document::from_file(path)?;
        Ok(Parser { document })
    }

    /// Use a string as source for the parsing process.
    pub fn from_string(data: String) -> Parser {
        Parser {
            document: Document::from_string("<string>", data),
        }
    }

    pub fn from_document(document: Document) -> Parser {
        Parser { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn iter(&self) -> Entries<'_> {
        Entries {
            blocks: Segmenter::new(&self.document.text),
        }
    }
}

impl str::FromStr for Parser {
    type Err = StatsError;

    /// Use a string as source for the parsing process.
    fn from_str(data: &str) -> Result<Self> {
        Ok(Parser::from_string(data.to_string()))
    }
}

/// Turn one raw block into an entry. Fields are read from the text after the
/// key; values lose one layer of delimiters, and a repeated field name
/// overwrites the earlier value.
pub fn decompose(block: &RawBlock<'_>) -> Entry {
    let mut entry = Entry::new(block.kind.as_str(), block.key.as_str());
    let text = block.field_text();
    let mut lexer = FieldLexer::new(&text);
    let mut name_cached = None;

    for token in lexer.by_ref() {
        match token {
            Token::FieldName(name) => {
                name_cached = Some(name.trim().to_lowercase());
            }
            Token::FieldData(data) => {
                if let Some(name) = mem::take(&mut name_cached) {
                    let value = normalize::normalize_value(&data);
                    if let Some(previous) = entry.fields.insert(name, value) {
                        tracing::trace!(key = %entry.key, %previous, "duplicate field overwritten");
                    }
                }
            }
            Token::CloseEntry => {}
        }
    }

    if lexer.state() != LexingState::Closed {
        tracing::debug!(
            key = %entry.key,
            line = block.lineno,
            state = %lexer.state(),
            "entry fields ended without closing brace"
        );
    }
    tracing::trace!(kind = %entry.kind, key = %entry.key, fields = entry.fields.len(), "decomposed entry");
    entry
}

/// Iterator yielding one `Entry` after another, in document order
pub struct Entries<'p> {
    pub(crate) blocks: Segmenter<'p>,
}

impl<'p> Iterator for Entries<'p> {
    type Item = Entry;

    fn next(&mut self) -> Option<Self::Item> {
        self.blocks.next().map(|block| decompose(&block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error;
    use std::str::FromStr;

    #[test]
    fn test_tolkien() -> std::result::Result<(), Box<dyn error::Error>> {
        let p = Parser::from_str("@book{tolkien1937, author = {J. R. R. Tolkien}}")?;
        let mut count = 0;
        for entry in p.iter() {
            assert_eq!(entry.kind, "book");
            assert_eq!(entry.key, "tolkien1937");
            assert_eq!(
                entry.fields.get("author"),
                Some(&"J. R. R. Tolkien".to_string())
            );
            count += 1;
        }
        assert_eq!(count, 1);
        Ok(())
    }

    #[test]
    fn test_taocp() -> std::result::Result<(), Box<dyn error::Error>> {
        let src = r#"@book{DBLP:books/lib/Knuth97,
  author    = {Donald Ervin Knuth},
  title     = {The art of computer programming, Volume {I:} Fundamental Algorithms,
               3rd Edition},
  publisher = {Addison-Wesley},
  year      = {1997},
  url       = {https://www.worldcat.org/oclc/312910844},
  isbn      = {0201896834},
  timestamp = {Fri, 17 Jul 2020 16:12:39 +0200},
  biburl    = {https://dblp.org/rec/books/lib/Knuth97.bib},
  bibsource = {{dblp computer science bibliography}, https://dblp.org}
}"#;
        let p = Parser::from_str(src)?;
        let mut iter = p.iter();
        let entry = iter.next().ok_or("no entry")?;
        assert_eq!(entry.kind, "book");
        assert_eq!(entry.key, "DBLP:books/lib/Knuth97");
        assert_eq!(entry.fields.len(), 9);
        assert_eq!(entry.fields["year"], "1997");
        assert_eq!(
            entry.fields["title"],
            "The art of computer programming, Volume {I:} Fundamental Algorithms,\n3rd Edition"
        );
        assert_eq!(
            entry.fields["bibsource"],
            "{dblp computer science bibliography}, https://dblp.org"
        );
        assert!(iter.next().is_none());
        Ok(())
    }

    #[test]
    fn test_single_line_fields() {
        let p = Parser::from_string(
            r#"@ARTICLE{k1, Author = "Ann Lee", YEAR = 2020., journal = {J}}"#.to_string(),
        );
        let entries: Vec<_> = p.iter().collect();
        assert_eq!(entries.len(), 1);
        let fields = &entries[0].fields;
        assert_eq!(entries[0].kind, "article");
        assert_eq!(fields["author"], "Ann Lee");
        assert_eq!(fields["year"], "2020.");
        assert_eq!(fields["journal"], "J");
    }

    #[test]
    fn test_fields_on_start_line_are_kept() {
        let p = Parser::from_string("@misc{m, year = 1999,\n  note = {n}\n}".to_string());
        let entry = p.iter().next().unwrap();
        assert_eq!(entry.fields["year"], "1999");
        assert_eq!(entry.fields["note"], "n");
    }

    #[test]
    fn test_bare_values_run_to_next_field() {
        let src = "@misc{m,\n  note = Some text\n    continued,\n  year = 2000\n}\n@misc{n, title = Hello, World, year = 2000}";
        let entries: Vec<_> = Parser::from_string(src.to_string()).iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].fields["note"], "Some text\ncontinued");
        assert_eq!(entries[0].fields["year"], "2000");
        assert_eq!(entries[1].fields["title"], "Hello, World");
        assert_eq!(entries[1].fields["year"], "2000");
    }

    #[test]
    fn test_duplicate_field_last_wins() {
        let p = Parser::from_string("@misc{d, year = 1999, Year = {2004}}".to_string());
        let entry = p.iter().next().unwrap();
        assert_eq!(entry.fields.len(), 1);
        assert_eq!(entry.fields["year"], "2004");
    }

    #[test]
    fn test_entry_without_fields() {
        let p = Parser::from_string("@misc{lonely}\n@misc{, }".to_string());
        let entries: Vec<_> = p.iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "unknown");
        assert!(entries[0].fields.is_empty());
        assert!(entries[1].fields.is_empty());
    }

    #[test]
    fn test_malformed_does_not_stop_parsing() {
        let src = "@article{a, year = {1999}}\n@article{b,\n  title = {oops\n@article{c, year = 2001}";
        let entries: Vec<_> = Parser::from_string(src.to_string()).iter().collect();
        // `b` swallows the start line of `c`
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "a");
        assert_eq!(entries[1].key, "b");
        assert!(entries[1].fields["title"].starts_with("oops\n@article{c"));
    }
}
