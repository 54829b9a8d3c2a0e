use anyhow::Result;
use clap::Parser as ClapParser;
use tracing::Level;

use boolit::builder::build_index;
use boolit::cli::BuildArgs;
use boolit::config::IndexBuilderConfig;

fn main() -> Result<()> {
    let args = BuildArgs::parse();

    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = IndexBuilderConfig::load()?;
    let stats = build_index(&config)?;

    println!("{}", stats.report());

    Ok(())
}
