use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use switchman::{clash, logging};

#[derive(Parser)]
#[command(name = "switchman")]
#[command(about = "Terminal switchboard for Clash/Mihomo proxy groups", long_about = None)]
#[command(version)]
struct Cli {
    /// Base URL of the daemon's external controller
    #[arg(long, default_value = clash::DEFAULT_BASE_URL)]
    url: String,

    /// API secret, sent as a bearer token
    #[arg(long, env = "MIHOMO_SECRET", default_value = "", hide_env_values = true)]
    secret: String,

    /// Append diagnostics to this file (level via RUST_LOG, default info)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        logging::init(path)?;
    }

    let api = clash::connect(&cli.url, &cli.secret)?;
    switchman::tui::run(api)
}
