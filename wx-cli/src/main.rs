//! wx-cli - Command line tool for station weather and crop-yield data.

use clap::Parser;
use std::path::PathBuf;
use wx_cmd::config::DEFAULT_DATABASE_PATH;

#[derive(Parser)]
#[command(
    name = "wx-cli",
    version,
    about = "Station weather ingestion and yearly statistics toolkit"
)]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_PATH)]
    database: PathBuf,

    #[command(subcommand)]
    command: wx_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("using database {}", cli.database.display());
    wx_cmd::run(cli.database, cli.command).await
}
