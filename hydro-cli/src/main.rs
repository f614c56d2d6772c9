//! Hydro CLI - Command line tool for streamflow statistics.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "hydro-cli",
    version,
    about = "Streamflow statistics for USGS gauging stations"
)]
struct Cli {
    #[command(subcommand)]
    command: hydro_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    hydro_cmd::run(cli.command)
}
