pub mod config;
pub mod exec;
pub mod query;

use crate::config::Config;
use crate::db::connection::{Connection, SqlSource};
use crate::errors::AppResult;
use crate::utils::colors::{GREEN, RESET};
use crate::utils::output::{self, OutputFormat, RenderOptions};
use crate::utils::path::expand_tilde;
use std::io::{self, IsTerminal, Write};

/// Open the configured database, run `source`, print its rows and commit
/// unless asked not to.
pub(crate) fn run_and_print<S: SqlSource + ?Sized>(
    cfg: &Config,
    format: OutputFormat,
    source: &S,
    no_commit: bool,
) -> AppResult<()> {
    let mut conn = Connection::new(expand_tilde(&cfg.database))?;
    conn.execute(source)?;

    let stdout = io::stdout();
    let opts = RenderOptions {
        format,
        separator: cfg.separator(),
        color: stdout.is_terminal(),
    };
    let rendered = output::render(conn.results(), &opts)?;
    stdout.lock().write_all(rendered.as_bytes())?;

    if cfg.auto_commit && !no_commit {
        conn.commit()?;
        eprintln!("{GREEN}✔ Committed{RESET} ({} row(s))", conn.row_count());
    }

    conn.close()?;
    Ok(())
}
