//! Configuration management for `shopmap.toml`.
//!
//! # Sections
//!
//! | Section      | Purpose                                          |
//! |--------------|--------------------------------------------------|
//! | `[site]`     | Public storefront URL                            |
//! | `[backend]`  | REST backend URL, key and timeout                |
//! | `[sitemap]`  | Output dir, sharding, gzip, static routes        |
//! | `[serve]`    | On-demand endpoint (interface, port)             |
//!
//! # Precedence
//!
//! Defaults, then `shopmap.toml` (optional), then environment variables,
//! then CLI flags. The merged result is validated before any work starts.
//!
//! # Example
//!
//! ```toml
//! [site]
//! url = "https://shop.example.com"
//!
//! [sitemap]
//! output = "public"
//! sharded = false
//!
//! [serve]
//! port = 5278
//! ```

mod backend;
pub mod defaults;
mod error;
mod serve;
mod site;
mod sitemap;

pub use error::ConfigError;
pub use sitemap::RouteConfig;

use backend::BackendConfig;
use serve::ServeConfig;
use site::SiteSection;
use sitemap::SitemapConfig;

use crate::{
    cli::{Cli, Commands},
    generate::SITEMAP_FILE,
    sitemap::INDEX_FILE,
};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

// ============================================================================
// Environment Variables
// ============================================================================

/// Public site URL.
pub const ENV_SITE_URL: &str = "SITE_URL";
/// Backend project URL.
pub const ENV_BACKEND_URL: &str = "SUPABASE_URL";
/// Backend key, preferred.
pub const ENV_BACKEND_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
/// Backend key, fallback when the service key is absent.
pub const ENV_BACKEND_ANON_KEY: &str = "SUPABASE_ANON_KEY";

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing shopmap.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Public storefront information
    #[serde(default)]
    pub site: SiteSection,

    /// Backend connection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Sitemap generation settings
    #[serde(default)]
    pub sitemap: SitemapConfig,

    /// On-demand endpoint settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Build the effective configuration for a CLI invocation.
    ///
    /// The config file is optional; environment variables are read through
    /// `env` so callers (and tests) control the process environment.
    pub fn load(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.config_path = normalize_path(&config_path);
        config.apply_env(env);
        config.update_with_cli(cli, root);
        config.validate(cli.needs_backend())?;

        Ok(config)
    }

    /// Overlay environment variables. Empty values count as unset.
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = var(ENV_SITE_URL) {
            self.site.url = url;
        }
        if let Some(url) = var(ENV_BACKEND_URL) {
            self.backend.url = Some(url);
        }
        if let Some(key) = var(ENV_BACKEND_KEY).or_else(|| var(ENV_BACKEND_ANON_KEY)) {
            self.backend.key = Some(key);
        }
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli, root: &Path) {
        Self::update_option(&mut self.site.url, cli.site_url.as_ref());
        Self::update_option(&mut self.sitemap.output, cli.output.as_ref());

        match &cli.command {
            Commands::Generate { args } => {
                Self::update_option(&mut self.sitemap.sharded, args.sharded.as_ref());
                Self::update_option(&mut self.sitemap.gzip, args.gzip.as_ref());
                Self::update_option(&mut self.sitemap.minify, args.minify.as_ref());
                Self::update_option(&mut self.sitemap.dedupe, args.dedupe.as_ref());
            }
            Commands::Robots { sharded } => {
                Self::update_option(&mut self.sitemap.sharded, sharded.as_ref());
            }
            Commands::Serve { interface, port } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
            }
        }

        self.sitemap.output = normalize_path(&root.join(&self.sitemap.output));
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Validate the merged configuration.
    ///
    /// Backend settings are only required when the command fetches content.
    pub fn validate(&self, needs_backend: bool) -> Result<()> {
        if !self.site.url.starts_with("http") {
            bail!(ConfigError::Validation(
                "[site.url] must start with http:// or https://".into()
            ));
        }

        if needs_backend {
            match self.backend.url.as_deref() {
                None | Some("") => bail!(ConfigError::Missing {
                    field: "[backend.url]",
                    env: ENV_BACKEND_URL,
                }),
                Some(url) if !url.starts_with("http") => bail!(ConfigError::Validation(
                    "[backend.url] must start with http:// or https://".into()
                )),
                _ => {}
            }
            if self.backend.key.as_deref().is_none_or(str::is_empty) {
                bail!(ConfigError::Missing {
                    field: "[backend.key]",
                    env: ENV_BACKEND_KEY,
                });
            }
        }

        for route in &self.sitemap.routes {
            if !route.path.starts_with('/') {
                bail!(ConfigError::Validation(format!(
                    "[sitemap.routes] path `{}` must start with `/`",
                    route.path
                )));
            }
            if !(0.0..=1.0).contains(&route.priority) {
                bail!(ConfigError::Validation(format!(
                    "[sitemap.routes] priority of `{}` must be within 0.0..=1.0",
                    route.path
                )));
            }
        }

        let shard_dir = &self.sitemap.shard_dir;
        if !shard_dir
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            bail!(ConfigError::Validation(format!(
                "[sitemap.shard_dir] `{}` must be a relative path inside the output directory",
                shard_dir.display()
            )));
        }

        Ok(())
    }

    /// Public URL of the document crawlers should start from.
    pub fn sitemap_url(&self) -> String {
        let file = if self.sitemap.sharded {
            INDEX_FILE
        } else {
            SITEMAP_FILE
        };
        self.site.absolute(&format!("/{file}"))
    }
}

/// Normalize a path to absolute, using canonicalize if the path exists
fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        // For non-existent paths, manually make them absolute
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}

// ============================================================================
// Tests
// ============================================================================
