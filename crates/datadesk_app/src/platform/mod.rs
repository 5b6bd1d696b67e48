pub mod cli;
mod config;
mod logging;
mod persistence;
mod render;
mod runner;

use std::process::ExitCode;

use datadesk_engine::JobRequest;
use datadesk_logging::desk_info;

use cli::{Cli, Command};
use config::AppConfig;
use persistence::HistoryStore;
use runner::RunOutcome;

pub async fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = AppConfig::load(cli.config.as_deref())?.with_server(cli.server);
    logging::initialize(&config.data_dir, cli.verbose);
    desk_info!("datadesk starting against {}", config.server);

    let request = match cli.command {
        Command::Research { topic, max_pdfs } => JobRequest::Research { topic, max_pdfs },
        Command::Upload { file } => runner::read_upload(&file).await?,
        Command::History { limit } => {
            print_history(&HistoryStore::new(&config.data_dir), limit);
            return Ok(ExitCode::SUCCESS);
        }
    };

    Ok(match runner::run_job(&config, request).await? {
        RunOutcome::Completed => ExitCode::SUCCESS,
        RunOutcome::Failed => ExitCode::FAILURE,
        RunOutcome::Cancelled => ExitCode::from(130),
    })
}

fn print_history(store: &HistoryStore, limit: usize) {
    let jobs = store.load();
    if jobs.is_empty() {
        println!("No finished jobs recorded in {}", store.path().display());
        return;
    }
    for entry in jobs.iter().rev().take(limit) {
        println!("{}", persistence::describe(entry));
    }
}
