//! This crate computes publication statistics over `.bib` files.
//!
//! `.bib` files are popular in reference management since many resources
//! allow to export metadata in a BibTeχ or BibLaTeχ file. One entry
//! in such a file can look like this:
//!
//! ```tex
//! @inproceedings{DBLP:conf/sosp/RitchieT73,
//!     author    = {Dennis Ritchie and Ken Thompson},
//!     title     = {The {UNIX} Time-Sharing System},
//!     booktitle = {Proceedings of the Fourth Symposium on Operating Systems Principles},
//!     year      = {1973}
//! }
//! ```
//!
//! We call `inproceedings` the entry's `kind` and `DBLP:conf/sosp/RitchieT73` its `key`.
//! Then we have a sequence of fields with a name (like `year`) and a value (like `1973`).
//!
//! Real-world bibliographies are rarely clean, so parsing is forgiving:
//! entries are found line by line with a brace-counting heuristic, fields are
//! read with a small state machine, and anything that does not fit is skipped
//! instead of reported. Irregular input thins out the counts but never fails.
//!
//! ```rust
//! use bibstats::{Parser, Statistics};
//! use std::str::FromStr;
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let p = Parser::from_str(r#"@book{tolkien1937, author = {J. R. R. Tolkien}, year = 1937}"#)?;
//!     let stats: Statistics = p.iter().collect();
//!     assert_eq!(stats.total_entries, 1);
//!     assert_eq!(stats.authors.get("J. R. R. Tolkien"), 1);
//!     assert_eq!(stats.years.get("1937"), 1);
//!     Ok(())
//! }
//! ```
//!
//! A brace-counting heuristic decides where an entry ends: a line that ends
//! with `}` and has no more opening than closing braces closes the entry. A
//! multi-line value whose closing brace sits on a line of its own therefore
//! ends the entry early. This is a known limitation.

use std::path::Path;

mod document;
mod errors;
mod lexer;
pub mod normalize;
mod parser;
mod report;
mod segmenter;
mod stats;
mod types;

pub use crate::document::Document;
pub use crate::errors::{Result, StatsError};
pub use crate::parser::{decompose, Entries, Parser};
#[cfg(feature = "serde_json")]
pub use crate::report::render_json;
pub use crate::report::{render_markdown, ReportOptions};
pub use crate::segmenter::{RawBlock, Segmenter, UNKNOWN_KEY};
pub use crate::stats::{FrequencyTable, Statistics};
pub use crate::types::Entry;

/// Parse all `documents` in the given order and aggregate their entries.
pub fn analyze_documents<'d, I>(documents: I) -> Statistics
where
    I: IntoIterator<Item = &'d Document>,
{
    let mut stats = Statistics::new();
    for document in documents {
        let blocks = Segmenter::new(&document.text);
        let entries = stats.extend_from(blocks.map(|block| decompose(&block)));
        tracing::info!(document = %document.name, entries, "document analyzed");
    }
    stats
}

/// Parse the files at `paths`, in the given order, and aggregate their entries.
///
/// Every path is checked before the first file is read, so a missing file
/// fails the run with `StatsError::InputNotFound` before any parsing happens.
pub fn analyze_files<P: AsRef<Path>>(paths: &[P]) -> Result<Statistics> {
    analyze_files_with(paths, |_| {})
}

/// Like `analyze_files`, calling `on_start` with each path right before the
/// file is read. The CLI uses it for its `Processing <path>...` lines.
pub fn analyze_files_with<P, F>(paths: &[P], mut on_start: F) -> Result<Statistics>
where
    P: AsRef<Path>,
    F: FnMut(&Path),
{
    if let Some(missing) = paths.iter().find(|p| !p.as_ref().exists()) {
        return Err(StatsError::InputNotFound(missing.as_ref().to_path_buf()));
    }

    let mut stats = Statistics::new();
    for path in paths {
        let path = path.as_ref();
        on_start(path);
        let parser = Parser::from_file(path)?;
        let entries = stats.extend_from(parser.iter());
        tracing::info!(document = %parser.document().name, entries, "document analyzed");
    }
    Ok(stats)
}
