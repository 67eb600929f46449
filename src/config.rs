use serde::Deserialize;
use std::path::PathBuf;
use std::env;
use std::fs;

use crate::answer::http_client::DEFAULT_BASE_URL;

pub const DEFAULT_GREETING: &str =
    "Hi! I'm Line Drive AI. Ask me anything about MLB players and their performance.";
pub const DEFAULT_LOG_FILE: &str = "linedrive.log";
const CONFIG_FILE_NAME: &str = ".linedrive.json";

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub debug: Option<bool>,
    #[serde(default)]
    pub service: ServiceConfig,
    pub greeting: Option<String>,
    pub log_file: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    pub base_url: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        let mut cfg = Self::load_from_paths(&Self::config_paths());

        let base_url = env::var("LINEDRIVE_BASE_URL").ok().filter(|s| !s.trim().is_empty());
        let debug = env::var("LINEDRIVE_DEBUG").ok().and_then(|s| s.parse::<bool>().ok());
        cfg.apply_overrides(base_url, debug);

        log::debug!("Loaded config: {:?}", cfg);
        cfg
    }

    /// Global first, local last, so the working directory wins.
    fn config_paths() -> Vec<PathBuf> {
        [
            dirs::home_dir().map(|p| p.join(CONFIG_FILE_NAME)),
            dirs::config_dir().map(|p| p.join("linedrive").join(CONFIG_FILE_NAME)),
            Some(PathBuf::from(".").join(CONFIG_FILE_NAME)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn load_from_paths(paths: &[PathBuf]) -> Self {
        let mut config = Config::default();
        for path in paths.iter().filter(|p| p.exists()) {
            log::debug!("Attempting to load config from: {:?}", path);
            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    log::warn!("Failed to read config file at {:?}: {}", path, e);
                    continue;
                }
            };
            match serde_json::from_str::<Config>(&content) {
                Ok(loaded) => {
                    config.merge(loaded);
                    log::info!("Successfully loaded and merged config from: {:?}", path);
                }
                Err(e) => log::warn!("Failed to parse config file at {:?}: {}", path, e),
            }
        }
        config
    }

    fn merge(&mut self, other: Config) {
        if other.debug.is_some() { self.debug = other.debug; }
        if other.service.base_url.is_some() { self.service.base_url = other.service.base_url; }
        if other.greeting.is_some() { self.greeting = other.greeting; }
        if other.log_file.is_some() { self.log_file = other.log_file; }
    }

    /// Environment or command-line values; `None` leaves the file value alone.
    pub fn apply_overrides(&mut self, base_url: Option<String>, debug: Option<bool>) {
        if let Some(url) = base_url { self.service.base_url = Some(url); }
        if let Some(debug) = debug { self.debug = Some(debug); }
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug.unwrap_or(false)
    }

    pub fn base_url(&self) -> &str {
        self.service.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn greeting(&self) -> &str {
        self.greeting.as_deref().unwrap_or(DEFAULT_GREETING)
    }

    pub fn log_file(&self) -> &str {
        self.log_file.as_deref().unwrap_or(DEFAULT_LOG_FILE)
    }
}
