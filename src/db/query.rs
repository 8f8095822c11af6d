//! Query templates with textual placeholder substitution.
//!
//! A [`QueryBinder`] holds an SQL template and the values bound to its
//! placeholders. [`QueryBinder::bind`] produces the final SQL text, or fails
//! with [`DbError::BindFailure`] naming the first placeholder that has no value.
//!
//! Supported placeholder forms are the ones SQLite itself accepts:
//!
//! * named: `:name`, `@name`, `$name` (all three share the key `name`)
//! * positional: `?NNN` (explicit 1-based index) and bare `?` (one past the
//!   largest index seen so far)
//!
//! Markers inside string literals, quoted identifiers and comments are left
//! alone, and `::` is never a placeholder.
//!
//! # Escaping
//!
//! Substitution is purely textual: values are inserted exactly as given, with
//! no quoting, escaping or type conversion. Protecting against SQL injection
//! is the caller's job. [`QueryBinder::set_quoted`], [`QueryBinder::push_quoted`]
//! and [`quote_literal`] wrap a value as an SQL string literal for callers that
//! want that.

use crate::errors::{DbError, DbResult};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Range;

/// A placeholder key referenced by a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Named(String),
    Index(usize),
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Named(name) => write!(f, ":{name}"),
            Placeholder::Index(i) => write!(f, "?{i}"),
        }
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Text(Range<usize>),
    Slot { key: Placeholder, label: String },
    /// A positional marker SQLite would reject; never resolves.
    Invalid { label: String },
}

/// Largest parameter index SQLite accepts by default.
pub const MAX_PARAMETER_INDEX: usize = 32766;

/// SQL template plus bound values.
#[derive(Debug, Clone)]
pub struct QueryBinder {
    template: String,
    segments: Vec<Segment>,
    named: HashMap<String, String>,
    positional: BTreeMap<usize, String>,
    next_push: usize,
}

impl QueryBinder {
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let segments = scan(&template);
        Self {
            template,
            segments,
            named: HashMap::new(),
            positional: BTreeMap::new(),
            next_push: 1,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Keys referenced by the template, in order of first appearance.
    pub fn placeholders(&self) -> Vec<Placeholder> {
        let mut out: Vec<Placeholder> = Vec::new();
        for seg in &self.segments {
            if let Segment::Slot { key, .. } = seg
                && !out.contains(key)
            {
                out.push(key.clone());
            }
        }
        out
    }

    /// Bind a value to a named placeholder. The name is given without its
    /// `:`, `@` or `$` prefix (a leading prefix is tolerated and stripped).
    pub fn set(&mut self, name: &str, value: impl fmt::Display) -> &mut Self {
        let key = name.trim_start_matches([':', '@', '$']);
        self.named.insert(key.to_string(), value.to_string());
        self
    }

    /// Bind a value to the 1-based positional index `index`.
    pub fn set_index(&mut self, index: usize, value: impl fmt::Display) -> &mut Self {
        self.positional.insert(index, value.to_string());
        self
    }

    /// Bind the next positional index: 1 for the first call, 2 for the second...
    pub fn push(&mut self, value: impl fmt::Display) -> &mut Self {
        let index = self.next_push;
        self.next_push += 1;
        self.set_index(index, value)
    }

    pub fn set_quoted(&mut self, name: &str, value: &str) -> &mut Self {
        self.set(name, quote_literal(value))
    }

    pub fn push_quoted(&mut self, value: &str) -> &mut Self {
        self.push(quote_literal(value))
    }

    /// Resolve the template against the bound values.
    ///
    /// Repeated calls return the same text; the binder is not modified.
    pub fn bind(&self) -> DbResult<String> {
        let mut out = String::with_capacity(self.template.len());
        for seg in &self.segments {
            match seg {
                Segment::Text(range) => out.push_str(&self.template[range.clone()]),
                Segment::Invalid { label } => {
                    return Err(DbError::BindFailure {
                        placeholder: label.clone(),
                    });
                }
                Segment::Slot { key, label } => {
                    let value = match key {
                        Placeholder::Named(name) => self.named.get(name),
                        Placeholder::Index(i) => self.positional.get(i),
                    };
                    match value {
                        Some(v) => out.push_str(v),
                        None => {
                            return Err(DbError::BindFailure {
                                placeholder: label.clone(),
                            });
                        }
                    }
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Display for QueryBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// Wrap `value` as an SQL string literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Split a template into literal text and placeholder slots.
fn scan(sql: &str) -> Vec<Segment> {
    let bytes = sql.as_bytes();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut max_index: usize = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i = skip_until(bytes, i + 1, &[quote]);
            }
            b'[' => {
                i = skip_until(bytes, i + 1, b"]");
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = skip_until(bytes, i + 2, b"\n");
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_until(bytes, i + 2, b"*/");
            }
            b':' if bytes.get(i + 1) == Some(&b':') => {
                i += 2;
            }
            b'?' => {
                let digits_end = scan_while(bytes, i + 1, |b| b.is_ascii_digit());
                let index = if digits_end > i + 1 {
                    // The digit run is ASCII, so parsing only fails on overflow.
                    sql[i + 1..digits_end].parse::<usize>().ok()
                } else {
                    Some(max_index + 1)
                };
                push_text(&mut segments, text_start, i);
                match index {
                    Some(index @ 1..=MAX_PARAMETER_INDEX) => {
                        max_index = max_index.max(index);
                        segments.push(Segment::Slot {
                            key: Placeholder::Index(index),
                            label: format!("?{index}"),
                        });
                    }
                    Some(index) if digits_end == i + 1 => segments.push(Segment::Invalid {
                        label: format!("?{index}"),
                    }),
                    _ => segments.push(Segment::Invalid {
                        label: sql[i..digits_end].to_string(),
                    }),
                }
                i = digits_end;
                text_start = i;
            }
            b':' | b'@' | b'$' => {
                let name_end = scan_while(bytes, i + 1, is_name_byte);
                if name_end > i + 1 {
                    push_text(&mut segments, text_start, i);
                    segments.push(Segment::Slot {
                        key: Placeholder::Named(sql[i + 1..name_end].to_string()),
                        label: sql[i..name_end].to_string(),
                    });
                    text_start = name_end;
                }
                i = name_end.max(i + 1);
            }
            _ => i += 1,
        }
    }
    push_text(&mut segments, text_start, bytes.len());
    segments
}

fn push_text(segments: &mut Vec<Segment>, start: usize, end: usize) {
    if end > start {
        segments.push(Segment::Text(start..end));
    }
}

fn scan_while(bytes: &[u8], from: usize, pred: impl Fn(u8) -> bool) -> usize {
    let mut i = from;
    while i < bytes.len() && pred(bytes[i]) {
        i += 1;
    }
    i
}

/// Index just past the next occurrence of `end` at or after `from`, or the
/// end of input when it never occurs.
fn skip_until(bytes: &[u8], from: usize, end: &[u8]) -> usize {
    let mut i = from;
    while i + end.len() <= bytes.len() {
        if &bytes[i..i + end.len()] == end {
            return i + end.len();
        }
        i += 1;
    }
    bytes.len()
}
