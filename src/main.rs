use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use quire::build::build_site;
use quire::config::Config;
use std::path::PathBuf;
use tracing::info;

mod logging;

/// Builds a static blog from Markdown posts.
#[derive(Parser)]
#[command(name = "quire", version)]
struct Cli {
    /// The project directory. Sources are read from `posts/`, `public/`,
    /// and `templates/` under it and the site is written to `dist/`.
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Log more detail (repeat for even more).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet)?;

    let config = Config::from_directory(&cli.root).context("loading configuration")?;
    let report = build_site(&config).context("building site")?;
    info!(
        posts = report.posts,
        skipped = report.skipped,
        "blog generation complete"
    );
    Ok(())
}
