use std::iter::Enumerate;
use std::str::Lines;

/// Key used for entries whose start line carries no citation key.
pub const UNKNOWN_KEY: &str = "unknown";

/// The raw lines of one entry, from the line holding `@type{` up to the
/// line that closes it. Lines are stored trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBlock<'s> {
    /// lowercased entry type, e.g. “inproceedings”
    pub kind: String,
    /// citation key, or `UNKNOWN_KEY`
    pub key: String,
    /// 1-based line number of the start line
    pub lineno: usize,
    pub lines: Vec<&'s str>,
    // byte offset into lines[0] where the field text begins
    fields_start: usize,
}

impl<'s> RawBlock<'s> {
    /// The text following the type and key, i.e. everything after the first
    /// comma of the start line (or after the opening brace if the start line
    /// has no comma), with the remaining lines joined by newlines.
    pub fn field_text(&self) -> String {
        let mut text = String::new();
        if let Some(first) = self.lines.first() {
            text.push_str(&first[self.fields_start..]);
        }
        for line in self.lines.iter().skip(1) {
            text.push('\n');
            text.push_str(line);
        }
        text
    }
}

/// Position of a detected `@type{` in a line.
struct EntryStart<'l> {
    kind: &'l str,
    open: usize,
}

fn is_ident_char(chr: char) -> bool {
    chr.is_alphanumeric() || chr == '_'
}

/// Find the first `@`, followed by an identifier, optional whitespace and `{`.
fn find_entry_start(line: &str) -> Option<EntryStart<'_>> {
    for (at, _) in line.match_indices('@') {
        let rest = &line[at + 1..];
        let ident_len = rest
            .char_indices()
            .find(|&(_, c)| !is_ident_char(c))
            .map_or(rest.len(), |(i, _)| i);
        if ident_len == 0 {
            continue;
        }
        let after = &rest[ident_len..];
        let trimmed = after.trim_start();
        if trimmed.starts_with('{') {
            let open = at + 1 + ident_len + (after.len() - trimmed.len());
            return Some(EntryStart {
                kind: &rest[..ident_len],
                open,
            });
        }
    }
    None
}

/// Opening minus closing braces in `line`.
fn brace_balance(line: &str) -> isize {
    line.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

/// A line closes the open entry if it contains a closing brace, its own
/// balance is not positive and it ends with `}`. Nesting across lines is not
/// considered, so a value with a lone `}` on its own line ends the entry early.
fn closes_entry(line: &str) -> bool {
    line.contains('}') && brace_balance(line) <= 0 && line.trim_end().ends_with('}')
}

fn is_skipped(line: &str) -> bool {
    line.is_empty() || line.starts_with('%')
}

/// Lazily splits a document into `RawBlock`s, in document order.
///
/// Malformed input never produces an error: lines outside an entry that do not
/// start one are ignored and an entry still open at the end of the document is
/// dropped.
pub struct Segmenter<'s> {
    lines: Enumerate<Lines<'s>>,
    current: Option<RawBlock<'s>>,
    depth: isize,
}

impl<'s> Segmenter<'s> {
    pub fn new(src: &'s str) -> Segmenter<'s> {
        Segmenter {
            lines: src.lines().enumerate(),
            current: None,
            depth: 0,
        }
    }

    fn open(&mut self, line: &'s str, lineno: usize) -> Option<RawBlock<'s>> {
        let start = find_entry_start(line)?;
        let after_open = &line[start.open + 1..];
        let (key, fields_start) = match after_open.find(',') {
            Some(comma) => {
                let key = after_open[..comma].trim();
                let key = if key.is_empty() { UNKNOWN_KEY } else { key };
                (key, start.open + 1 + comma + 1)
            }
            None => (UNKNOWN_KEY, start.open + 1),
        };
        let block = RawBlock {
            kind: start.kind.to_lowercase(),
            key: key.to_string(),
            lineno,
            lines: vec![line],
            fields_start,
        };

        if closes_entry(line) {
            return Some(block);
        }
        self.depth = brace_balance(line);
        self.current = Some(block);
        None
    }

    fn close(&mut self) -> Option<RawBlock<'s>> {
        let block = self.current.take()?;
        if self.depth != 0 {
            tracing::debug!(
                key = %block.key,
                line = block.lineno,
                depth = self.depth,
                "entry closed with unbalanced braces"
            );
        }
        self.depth = 0;
        Some(block)
    }
}

impl<'s> Iterator for Segmenter<'s> {
    type Item = RawBlock<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((idx, raw)) = self.lines.next() {
            let line = raw.trim();
            if is_skipped(line) {
                continue;
            }

            match self.current.as_mut() {
                None => {
                    if let Some(block) = self.open(line, idx + 1) {
                        return Some(block);
                    }
                }
                Some(block) => {
                    block.lines.push(line);
                    self.depth += brace_balance(line);
                    if closes_entry(line) {
                        return self.close();
                    }
                }
            }
        }

        if let Some(block) = self.current.take() {
            tracing::debug!(
                key = %block.key,
                line = block.lineno,
                "end of document inside entry, dropping it"
            );
        }
        None
    }
}
