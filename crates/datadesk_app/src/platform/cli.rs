use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// Submit research and PDF extraction jobs and print the tables they produce.
#[derive(Debug, Parser)]
#[command(name = "datadesk", version, about)]
pub struct Cli {
    /// Backend base URL; overrides the config file
    #[arg(long, env = "DATADESK_SERVER", global = true)]
    pub server: Option<String>,

    /// RON config file (defaults to ./datadesk.ron when present)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// More log output on the terminal; repeat for more detail
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the web for PDFs about a topic and extract their tables
    Research {
        #[arg(long)]
        topic: String,
        #[arg(long = "max-pdfs", default_value_t = 5)]
        max_pdfs: u32,
    },
    /// Upload a local PDF and extract its tables
    Upload { file: PathBuf },
    /// List previously finished jobs
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}
