mod api;
mod cli;
mod commands;
mod config;
mod form;
mod format;
mod input;
mod logging;
mod models;
mod request;
mod routes;
mod ui;
mod view;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use config::{Config, Overrides};
use logging::LogTarget;
use routes::Route;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "taskdesk", &mut std::io::stdout());
        return Ok(());
    }

    let overrides = Overrides {
        base_url: cli.base_url.clone(),
        log_level: cli.log_level(),
    };
    let dotenv = config::load_dotenv();
    let config = Config::load(&overrides).context("Failed to load configuration")?;

    let target = match cli.command {
        None | Some(Commands::Tui { .. }) => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    logging::init(&config.log, target)?;
    if let Err(e) = dotenv {
        log::warn!("could not read .env: {}", e);
    }
    log::debug!("using task API at {}", config.api.base_url);

    let api = api::ApiService::new(&config.api.base_url, config.api.timeout())?;
    let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let date_format = config.ui.date_format.as_str();

    match cli.command {
        Some(Commands::List) => rt.block_on(commands::list_tasks(&api, date_format)),
        Some(Commands::Add {
            title,
            date,
            description,
            priority,
        }) => rt.block_on(commands::add_task(
            &api,
            &title,
            date.as_deref(),
            description.as_deref(),
            priority,
            date_format,
        )),
        Some(Commands::Show { id }) => rt.block_on(commands::show_task(&api, &id, date_format)),
        Some(Commands::Completions { .. }) => Ok(()),
        Some(Commands::Tui { open }) => {
            let start = match open {
                Some(path) => Some(
                    Route::parse(&path).with_context(|| format!("Unknown route '{}'", path))?,
                ),
                None => None,
            };
            ui::run_tui(api, rt.handle().clone(), date_format, start)
        }
        None => ui::run_tui(api, rt.handle().clone(), date_format, None),
    }
}
