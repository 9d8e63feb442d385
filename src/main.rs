//! Shopmap - sitemap and robots.txt generation for a storefront.

mod cli;
mod config;
mod generate;
mod logger;
mod robots;
mod serve;
mod sitemap;
mod source;
mod utils;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use generate::{Generator, ROBOTS_FILE};
use robots::write_robots;
use serve::serve_sitemap;
use source::RestSource;

fn main() {
    if let Err(err) = run() {
        log!("error"; "{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = SiteConfig::load(&cli, |name| std::env::var(name).ok())?;

    if config.config_path.exists() {
        log!("config"; "{}", config.config_path.display());
    }

    match &cli.command {
        Commands::Generate { .. } => {
            let source = RestSource::from_config(&config)?;
            let written = Generator::new(&config, &source).write()?;
            log!("generate"; "{} file(s) in {}", written.len(), config.sitemap.output.display());
            Ok(())
        }
        Commands::Robots { .. } => {
            let path = config.sitemap.output.join(ROBOTS_FILE);
            write_robots(&path, &config.sitemap_url()).map(|_| ())
        }
        Commands::Serve { .. } => {
            let source = RestSource::from_config(&config)?;
            serve_sitemap(&config, &source)
        }
    }
}
