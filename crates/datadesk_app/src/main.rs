mod platform;

use std::process::ExitCode;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    platform::run_app(platform::cli::Cli::parse()).await
}
