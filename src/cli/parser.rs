use crate::utils::output::OutputFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for sqliteplus
#[derive(Parser)]
#[command(
    name = "sqliteplus",
    version = env!("CARGO_PKG_VERSION"),
    about = "Run SQL against a SQLite database inside a transaction and print the captured rows",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the configured output format
    #[arg(global = true, long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute raw SQL (one or more statements) and print the rows
    Exec {
        /// SQL text; several statements may be separated by `;`
        sql: String,

        /// Leave the work uncommitted (it is discarded on exit)
        #[arg(long = "no-commit")]
        no_commit: bool,
    },

    /// Execute a query template after binding its placeholders
    Query {
        /// Template with :name, @name, $name, ?NNN or ? placeholders
        template: String,

        /// Named value, e.g. --bind id=7 (repeatable)
        #[arg(long = "bind", short = 'b', value_name = "KEY=VALUE")]
        bind: Vec<String>,

        /// Positional value for the next ? placeholder (repeatable)
        #[arg(long = "arg", short = 'a', value_name = "VALUE")]
        args: Vec<String>,

        /// Insert every value as a quoted SQL string literal
        #[arg(long = "quote")]
        quote: bool,

        /// Leave the work uncommitted (it is discarded on exit)
        #[arg(long = "no-commit")]
        no_commit: bool,
    },

    /// Show or create the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "init", help = "Write the configuration file with current values")]
        init: bool,
    },
}
