//! Development tasks for the Inkleaf reader.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod index_volume;

#[derive(Parser)]
#[command(name = "xtask", about = "Inkleaf development tasks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fully pre-index every text file in a volume directory, so a
    /// card prepared on the desk never needs on-device indexing.
    IndexVolume(index_volume::IndexVolumeArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::IndexVolume(args) => index_volume::run(args).await,
    }
}
