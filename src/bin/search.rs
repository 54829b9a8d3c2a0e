use anyhow::Result;
use clap::Parser as ClapParser;
use tracing::Level;

use boolit::cli::SearchArgs;
use boolit::config::IndexBuilderConfig;
use boolit::query::{search, SearchMode};

fn main() -> Result<()> {
    let args = SearchArgs::parse();

    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = IndexBuilderConfig::load()?;
    let mode = match args.mode.as_str() {
        "or" => SearchMode::Or,
        _ => SearchMode::And,
    };

    let results = search(&config.final_index_dir, &args.query, mode)?;

    if results.is_empty() {
        println!("No results found.");
    } else {
        for (i, result) in results.iter().enumerate() {
            println!("{}. URL: {}, Score: {:.2}", i + 1, result.url, result.score);
        }
    }

    Ok(())
}
