use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::str::Chars;

/// A token is one semantic unit read from the field part of an entry.
/// Given the text following the key of
///
/// ```tex
/// @Book{works:4,
///   author     = {Shakespeare, William},
///   title      = "Sonnets",
///   year       = 1609
/// }
/// ```
///
/// the lexer emits (FieldName("author"), FieldData("{Shakespeare, William}"),
/// FieldName("title"), FieldData("\"Sonnets\""), FieldName("year"),
/// FieldData("1609\n"), CloseEntry). Field data keeps its delimiters; removing
/// them is up to the parser. A bare value runs until the next `name =` pair or
/// the closing brace, so it may hold commas and line breaks.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    FieldName(String),
    FieldData(String),
    CloseEntry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LexingState {
    SeekField,
    ReadingName,
    WaitForAssign,
    SeekValue,
    InBraceValue,
    InQuoteValue,
    InBareValue,
    AfterValue,
    Closed,
}

impl fmt::Display for LexingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::SeekField => "waiting for next field",
                Self::ReadingName => "reading field name",
                Self::WaitForAssign => "expecting '=' for field assignment",
                Self::SeekValue => "reading start of field data",
                Self::InBraceValue => "reading {braced} field data",
                Self::InQuoteValue => "reading \"quoted\" field data",
                Self::InBareValue => "reading bare field data",
                Self::AfterValue => "expecting separator ',' between fields",
                Self::Closed => "entry closed",
            }
        )
    }
}

fn is_name_char(chr: char) -> bool {
    chr.is_alphanumeric() || chr == '_' || chr == '-'
}

/// Scans `name = value` pairs. Never fails: characters that do not fit
/// the current state are skipped, and a half-read name is dropped.
pub(crate) struct FieldLexer<'s> {
    src: Chars<'s>,
    next_tokens: VecDeque<Token>,
    state: LexingState,
    arg_cache: String, // accumulates the current name or data
    brace_level: usize, // inside how many levels of curly braces of the field data are we?
    eof: bool,
}

impl<'s> FieldLexer<'s> {
    pub(crate) fn new(src: &'s str) -> FieldLexer<'s> {
        FieldLexer {
            src: src.chars(),
            next_tokens: VecDeque::new(),
            state: LexingState::SeekField,
            arg_cache: String::new(),
            brace_level: 0,
            eof: false,
        }
    }

    pub(crate) fn state(&self) -> LexingState {
        self.state
    }

    fn emit_name(&mut self) {
        let name = mem::take(&mut self.arg_cache);
        self.next_tokens.push_back(Token::FieldName(name));
    }

    fn emit_data(&mut self) {
        let data = mem::take(&mut self.arg_cache);
        self.next_tokens.push_back(Token::FieldData(data));
    }

    fn close(&mut self) {
        self.next_tokens.push_back(Token::CloseEntry);
        self.state = LexingState::Closed;
    }

    fn drop_name(&mut self) {
        if !self.arg_cache.is_empty() {
            tracing::trace!(name = %self.arg_cache, state = %self.state, "dropping field name");
            self.arg_cache.clear();
        }
    }

    /// Whether the name character just read starts a `name =` pair. Only
    /// checked at word starts; the rest of the name is still unread.
    fn field_follows(&self) -> bool {
        if self.arg_cache.ends_with(is_name_char) {
            return false;
        }
        let mut rest = self
            .src
            .clone()
            .skip_while(|&c| is_name_char(c))
            .skip_while(|c| c.is_whitespace());
        rest.next() == Some('=')
    }

    fn step(&mut self, chr: char) {
        use LexingState as S;

        match self.state {
            S::SeekField => {
                if is_name_char(chr) {
                    self.arg_cache.push(chr);
                    self.state = S::ReadingName;
                } else if chr == '}' {
                    self.close();
                }
            }
            S::ReadingName => {
                if is_name_char(chr) {
                    self.arg_cache.push(chr);
                } else if chr.is_whitespace() {
                    self.state = S::WaitForAssign;
                } else if chr == '=' {
                    self.emit_name();
                    self.state = S::SeekValue;
                } else {
                    self.drop_name();
                    if chr == '}' {
                        self.close();
                    } else {
                        self.state = S::SeekField;
                    }
                }
            }
            S::WaitForAssign => {
                if chr.is_whitespace() {
                    // ignore
                } else if chr == '=' {
                    self.emit_name();
                    self.state = S::SeekValue;
                } else if is_name_char(chr) {
                    // the previous word was not a field name
                    self.drop_name();
                    self.arg_cache.push(chr);
                    self.state = S::ReadingName;
                } else {
                    self.drop_name();
                    if chr == '}' {
                        self.close();
                    } else {
                        self.state = S::SeekField;
                    }
                }
            }
            S::SeekValue => {
                if chr.is_whitespace() {
                    // ignore
                } else if chr == '{' {
                    self.arg_cache.push(chr);
                    self.brace_level = 1;
                    self.state = S::InBraceValue;
                } else if chr == '"' {
                    self.arg_cache.push(chr);
                    self.brace_level = 0;
                    self.state = S::InQuoteValue;
                } else if chr == ',' {
                    self.emit_data();
                    self.state = S::SeekField;
                } else if chr == '}' {
                    self.emit_data();
                    self.close();
                } else {
                    self.arg_cache.push(chr);
                    self.brace_level = 0;
                    self.state = S::InBareValue;
                }
            }
            S::InBraceValue => {
                self.arg_cache.push(chr);
                if chr == '{' {
                    self.brace_level += 1;
                } else if chr == '}' {
                    self.brace_level -= 1;
                    if self.brace_level == 0 {
                        self.emit_data();
                        self.state = S::AfterValue;
                    }
                }
            }
            S::InQuoteValue => {
                self.arg_cache.push(chr);
                if chr == '{' {
                    self.brace_level += 1;
                } else if chr == '}' {
                    self.brace_level = self.brace_level.saturating_sub(1);
                } else if chr == '"' && self.brace_level == 0 {
                    self.emit_data();
                    self.state = S::AfterValue;
                }
            }
            S::InBareValue => {
                if self.brace_level == 0 && is_name_char(chr) && self.field_follows() {
                    self.emit_data();
                    self.arg_cache.push(chr);
                    self.state = S::ReadingName;
                } else if self.brace_level == 0 && chr == '}' {
                    self.emit_data();
                    self.close();
                } else {
                    if chr == '{' {
                        self.brace_level += 1;
                    } else if chr == '}' {
                        self.brace_level -= 1;
                    }
                    self.arg_cache.push(chr);
                }
            }
            S::AfterValue => {
                if chr == ',' {
                    self.state = S::SeekField;
                } else if chr == '}' {
                    self.close();
                } else if is_name_char(chr) {
                    // tolerate a missing separator
                    self.arg_cache.push(chr);
                    self.state = S::ReadingName;
                }
            }
            S::Closed => {}
        }
    }

    /// Flush whatever is pending once the source is exhausted.
    fn finish(&mut self) {
        use LexingState as S;

        match self.state {
            S::InBraceValue | S::InQuoteValue | S::InBareValue => {
                tracing::trace!(state = %self.state, "field data unterminated at end of entry");
                self.emit_data();
            }
            S::SeekValue => self.emit_data(),
            S::ReadingName | S::WaitForAssign => self.drop_name(),
            S::SeekField | S::AfterValue | S::Closed => {}
        }
        self.eof = true;
    }
}

impl<'s> Iterator for FieldLexer<'s> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tok) = self.next_tokens.pop_front() {
                return Some(tok);
            }
            if self.eof {
                return None;
            }
            match self.src.next() {
                Some(_) if self.state == LexingState::Closed => self.finish(),
                Some(chr) => self.step(chr),
                None => self.finish(),
            }
        }
    }
}
