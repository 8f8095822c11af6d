//! Rendering of captured rows as table, CSV or JSON text.

use crate::db::rows::RowStore;
use crate::errors::{AppError, AppResult};
use crate::utils::table::Table;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

pub struct RenderOptions {
    pub format: OutputFormat,
    pub separator: char,
    pub color: bool,
}

pub fn render(store: &RowStore, opts: &RenderOptions) -> AppResult<String> {
    match opts.format {
        OutputFormat::Table => {
            Ok(Table::new(store.columns(), store.rows()).render(opts.separator, opts.color))
        }
        OutputFormat::Csv => render_csv(store),
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(store).map_err(|e| AppError::Output(e.to_string()))?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn render_csv(store: &RowStore) -> AppResult<String> {
    // Rows may be wider than the header when a later statement had no columns.
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    if !store.columns().is_empty() {
        wtr.write_record(store.columns())
            .map_err(|e| AppError::Output(e.to_string()))?;
    }
    for row in store {
        wtr.write_record(row)
            .map_err(|e| AppError::Output(e.to_string()))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Output(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::Output(e.to_string()))
}
