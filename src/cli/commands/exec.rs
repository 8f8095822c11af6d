use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::utils::output::OutputFormat;

/// Handle the `exec` subcommand
pub fn handle(cmd: &Commands, cfg: &Config, format: OutputFormat) -> AppResult<()> {
    if let Commands::Exec { sql, no_commit } = cmd {
        super::run_and_print(cfg, format, sql.as_str(), *no_commit)?;
    }
    Ok(())
}
