//! Captured result rows.

use rusqlite::types::ValueRef;
use serde::Serialize;

/// Text stored for SQL NULL values.
pub const NULL_TEXT: &str = "NULL";

/// One result row: text fields in column order.
pub type Row = Vec<String>;

/// Rows captured from the last executed statement(s).
///
/// The store is owned by a [`Connection`](crate::db::connection::Connection)
/// and cleared at the start of every execute call.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RowStore {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn clear(&mut self) {
        self.columns.clear();
        self.rows.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Column names of the last statement that returned columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub(crate) fn set_columns(&mut self, columns: Vec<String>) {
        self.columns = columns;
    }
}

impl<'a> IntoIterator for &'a RowStore {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Flatten an engine value to the text the engine itself would report.
pub fn value_to_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => NULL_TEXT.to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => real_to_text(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Format a real the way SQLite's `%!.15g` does: 15 significant digits,
/// trailing zeros dropped but at least one fractional digit kept, and an
/// exponent of at least two digits below 1e-4 or from 1e15 up.
fn real_to_text(f: f64) -> String {
    if f.is_nan() {
        return NULL_TEXT.to_string();
    }
    if f.is_infinite() {
        let text = if f > 0.0 { "Inf" } else { "-Inf" };
        return text.to_string();
    }
    // Negative zero included.
    if f == 0.0 {
        return "0.0".to_string();
    }

    let sci = format!("{:.14e}", f.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let digits = digits.trim_end_matches('0');
    let sign = if f < 0.0 { "-" } else { "" };

    if !(-4..15).contains(&exp) {
        let (head, tail) = digits.split_at(1);
        let tail = if tail.is_empty() { "0" } else { tail };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        format!("{sign}{head}.{tail}e{exp_sign}{:02}", exp.abs())
    } else if exp >= 0 {
        let int_len = exp as usize + 1;
        if digits.len() <= int_len {
            let zeros = "0".repeat(int_len - digits.len());
            format!("{sign}{digits}{zeros}.0")
        } else {
            let (int_part, frac) = digits.split_at(int_len);
            format!("{sign}{int_part}.{frac}")
        }
    } else {
        let zeros = "0".repeat((-exp - 1) as usize);
        format!("{sign}0.{zeros}{digits}")
    }
}
