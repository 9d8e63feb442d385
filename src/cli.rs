//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Storefront sitemap generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Public-assets output directory (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file name (default: shopmap.toml)
    #[arg(short = 'C', long, default_value = "shopmap.toml")]
    pub config: PathBuf,

    /// Override the public site URL.
    ///
    /// Takes precedence over both `[site.url]` and `SITE_URL`.
    #[arg(long = "site-url")]
    pub site_url: Option<String>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for offline generation
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Split into per-type shards referenced by sitemap-index.xml
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub sharded: Option<bool>,

    /// Gzip shard files
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub gzip: Option<bool>,

    /// Minify the xml content
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Drop records whose path already appeared earlier in the document
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub dedupe: Option<bool>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Fetch content and write sitemap files plus robots.txt
    Generate {
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Point robots.txt at the sitemap without regenerating it
    Robots {
        /// Reference sitemap-index.xml instead of sitemap.xml
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        sharded: Option<bool>,
    },

    /// Serve freshly rendered sitemap xml to bearer-authorized requests
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Whether the command talks to the backend.
    pub const fn needs_backend(&self) -> bool {
        !matches!(self.command, Commands::Robots { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate_flags() {
        let cli = Cli::parse_from(["shopmap", "generate", "--sharded", "--gzip", "false"]);
        match cli.command {
            Commands::Generate { args } => {
                assert_eq!(args.sharded, Some(true));
                assert_eq!(args.gzip, Some(false));
                assert_eq!(args.minify, None);
            }
            _ => panic!("expected generate"),
        }
        assert_eq!(cli.config, PathBuf::from("shopmap.toml"));
    }

    #[test]
    fn test_parse_global_options() {
        let cli = Cli::parse_from([
            "shopmap",
            "--site-url",
            "https://shop.example.com",
            "-o",
            "dist",
            "serve",
            "--port",
            "9000",
        ]);
        assert_eq!(cli.site_url.as_deref(), Some("https://shop.example.com"));
        assert_eq!(cli.output, Some(PathBuf::from("dist")));
        assert!(matches!(
            cli.command,
            Commands::Serve {
                port: Some(9000),
                interface: None
            }
        ));
    }

    #[test]
    fn test_needs_backend() {
        assert!(Cli::parse_from(["shopmap", "generate"]).needs_backend());
        assert!(Cli::parse_from(["shopmap", "serve"]).needs_backend());
        assert!(!Cli::parse_from(["shopmap", "robots"]).needs_backend());
    }
}
