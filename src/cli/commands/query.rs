use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::query::QueryBinder;
use crate::errors::{AppError, AppResult};
use crate::utils::output::OutputFormat;

/// Handle the `query` subcommand
pub fn handle(cmd: &Commands, cfg: &Config, format: OutputFormat) -> AppResult<()> {
    if let Commands::Query {
        template,
        bind,
        args,
        quote,
        no_commit,
    } = cmd
    {
        let binder = build_binder(template, bind, args, *quote)?;
        super::run_and_print(cfg, format, &binder, *no_commit)?;
    }
    Ok(())
}

/// Turn `KEY=VALUE` and positional arguments into a binder.
pub fn build_binder(
    template: &str,
    bind: &[String],
    args: &[String],
    quote: bool,
) -> AppResult<QueryBinder> {
    let mut binder = QueryBinder::new(template);

    for pair in bind {
        let (key, value) = pair
            .split_once('=')
            .filter(|(k, _)| !k.trim().is_empty())
            .ok_or_else(|| AppError::InvalidBinding(pair.clone()))?;
        if quote {
            binder.set_quoted(key.trim(), value);
        } else {
            binder.set(key.trim(), value);
        }
    }

    for value in args {
        if quote {
            binder.push_quoted(value);
        } else {
            binder.push(value);
        }
    }

    Ok(binder)
}
