//! Command-line argument definitions for the two binaries this crate ships:
//! `build-index` (no positional arguments, driven entirely by configuration)
//! and `search` (a query string plus a boolean mode flag).

use clap::Parser as ClapParser;

/// Builds the on-disk inverted index from the configured dataset directory.
#[derive(ClapParser, Debug)]
#[command(author, version, about = "Builds an inverted index over a crawled HTML corpus", long_about = None)]
pub struct BuildArgs {
    /// Print verbose (debug-level) logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Runs a boolean keyword query against a previously built index.
#[derive(ClapParser, Debug)]
#[command(author, version, about = "Runs a boolean keyword query against a built index", long_about = None)]
pub struct SearchArgs {
    /// The query text. All terms are combined using `--mode`.
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Boolean combination mode for multi-term queries
    #[arg(short, long, default_value = "and", value_parser = ["and", "or"])]
    pub mode: String,

    /// Print verbose (debug-level) logging
    #[arg(short, long)]
    pub verbose: bool,
}
