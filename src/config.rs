use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const APP_NAME: &str = "repotally";

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    pub github_token: Option<String>,
    pub api_base_url: Option<String>,
    pub fetch_traffic: bool,
    pub concurrency: usize,
    pub max_release_pages: u32,
    pub log_level: String,
    #[serde(default)]
    pub export_path: Option<PathBuf>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("github_token", &self.github_token.as_ref().map(|_| "[REDACTED]"))
            .field("api_base_url", &self.api_base_url)
            .field("fetch_traffic", &self.fetch_traffic)
            .field("concurrency", &self.concurrency)
            .field("max_release_pages", &self.max_release_pages)
            .field("log_level", &self.log_level)
            .field("export_path", &self.export_path)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            api_base_url: None,
            fetch_traffic: true,
            concurrency: 4,
            max_release_pages: 20,
            log_level: "info".to_string(),
            export_path: None,
        }
    }
}

/// Values given on the command line; they win over every other layer.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub token: Option<String>,
    pub no_traffic: bool,
}

impl Config {
    pub fn load(overrides: Overrides) -> Self {
        Self::load_from(app_dir().join("config.toml"), overrides)
    }

    pub fn load_from(config_file: PathBuf, overrides: Overrides) -> Self {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if config_file.exists() {
            figment = figment.merge(Toml::file(&config_file));
        }

        figment = figment.merge(Env::prefixed("REPOTALLY_")).merge(
            Env::raw()
                .only(&["GITHUB_TOKEN"])
                .map(|_| "github_token".into()),
        );

        if let Some(token) = overrides.token {
            figment = figment.merge(Serialized::default("github_token", token));
        }
        if overrides.no_traffic {
            figment = figment.merge(Serialized::default("fetch_traffic", false));
        }

        match figment.extract() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("warning: config parse error, using defaults: {e}");
                Config::default()
            }
        }
    }

    /// Trimmed token, `None` when unset or blank.
    pub fn token(&self) -> Option<&str> {
        self.github_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn export_path(&self) -> PathBuf {
        self.export_path
            .clone()
            .unwrap_or_else(crate::report::default_export_path)
    }
}

pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn app_dir() -> PathBuf {
    config_dir().join(APP_NAME)
}
