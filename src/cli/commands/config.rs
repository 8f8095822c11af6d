use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::utils::colors::{GREEN, RESET};

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config { print_config, init } = cmd {
        if *init {
            let path = cfg.save()?;
            println!("{GREEN}✅ Config file: {}{RESET}", path.display());
        }

        if *print_config || !*init {
            println!("📄 Current configuration ({}):\n", Config::config_file().display());
            print!("{}", cfg.to_yaml()?);
        }
    }
    Ok(())
}
