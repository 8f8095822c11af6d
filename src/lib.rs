//! sqliteplus library root.
//!
//! The core is [`db::connection::Connection`], a SQLite handle that always
//! sits inside a transaction and captures every result row as text, and
//! [`db::query::QueryBinder`], which fills placeholders in an SQL template.
//!
//! ```no_run
//! use sqliteplus::{Connection, QueryBinder};
//!
//! # fn main() -> sqliteplus::DbResult<()> {
//! let mut conn = Connection::new("people.sqlite")?;
//! conn.execute("CREATE TABLE IF NOT EXISTS people (id INTEGER, name TEXT)")?;
//!
//! let mut insert = QueryBinder::new("INSERT INTO people VALUES (:id, :name)");
//! insert.set("id", 1).set_quoted("name", "Ada");
//! conn.execute(&insert)?;
//! conn.commit()?;
//!
//! conn.execute("SELECT name FROM people")?;
//! for row in conn.results() {
//!     println!("{}", row[0]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod db;
pub mod errors;
pub mod utils;

pub use db::connection::{Connection, SqlSource, TxState};
pub use db::query::{Placeholder, QueryBinder, quote_literal};
pub use db::rows::{NULL_TEXT, Row, RowStore};
pub use errors::{AppError, AppResult, DbError, DbResult};

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let format = cli.format.unwrap_or(cfg.output_format);
    match &cli.command {
        Commands::Exec { .. } => cli::commands::exec::handle(&cli.command, cfg, format),
        Commands::Query { .. } => cli::commands::query::handle(&cli.command, cfg, format),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let mut cfg = Config::load()?;

    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    dispatch(&cli, &cfg)
}
