mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

fn main() -> Result<()> {
    env_logger::init();

    ci_hunter::output::print_banner();

    let cli = Cli::parse();
    info!("Starting ci-hunter");
    cli.execute()?;

    Ok(())
}
