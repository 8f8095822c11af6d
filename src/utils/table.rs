//! Table rendering utilities for CLI outputs.

use crate::utils::colors::colorize_field;
use unicode_width::UnicodeWidthStr;

pub struct Column {
    pub header: String,
    pub width: usize,
}

pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table whose column widths fit both headers and cells.
    pub fn new(headers: &[String], rows: &[Vec<String>]) -> Self {
        let count = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(headers.len()))
            .max()
            .unwrap_or(0);

        let columns = (0..count)
            .map(|i| {
                let header = headers
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("col{}", i + 1));
                let width = rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|cell| UnicodeWidthStr::width(cell.as_str()))
                    .chain(std::iter::once(UnicodeWidthStr::width(header.as_str())))
                    .max()
                    .unwrap_or(0);
                Column { header, width }
            })
            .collect();

        Self {
            columns,
            rows: rows.to_vec(),
        }
    }

    /// Render as `| a | b |` lines, with a rule of `separator` under the header.
    pub fn render(&self, separator: char, color: bool) -> String {
        let mut out = String::new();
        if self.columns.is_empty() {
            return out;
        }

        // Header
        out.push('|');
        for col in &self.columns {
            out.push(' ');
            push_padded(&mut out, &col.header, col.width, false);
            out.push_str(" |");
        }
        out.push('\n');

        out.push('|');
        for col in &self.columns {
            out.extend(std::iter::repeat_n(separator, col.width + 2));
            out.push('|');
        }
        out.push('\n');

        // Rows
        for row in &self.rows {
            out.push('|');
            for (i, col) in self.columns.iter().enumerate() {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                out.push(' ');
                push_padded(&mut out, cell, col.width, color);
                out.push_str(" |");
            }
            out.push('\n');
        }

        out
    }
}

// Pad by display width; escape codes must not count towards it.
fn push_padded(out: &mut String, cell: &str, width: usize, color: bool) {
    let shown = UnicodeWidthStr::width(cell);
    if color {
        out.push_str(&colorize_field(cell));
    } else {
        out.push_str(cell);
    }
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(shown)));
}
