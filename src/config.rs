use serde::Deserialize;
use std::path::Path;

use crate::store::StorageKeys;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Prefix for every persisted key (`<namespace>_custom_feeds`, ...)
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Storage partition, the equivalent of the browser's per-origin storage
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Article data produced by the site builder
    #[serde(default = "default_items_path")]
    pub items_path: String,
    #[serde(default = "default_site_title")]
    pub site_title: String,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_namespace() -> String {
    "snd".to_string()
}

fn default_origin() -> String {
    "local".to_string()
}

fn default_items_path() -> String {
    "data/items.json".to_string()
}

fn default_site_title() -> String {
    "Senior News Daily".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            origin: default_origin(),
            items_path: default_items_path(),
            site_title: default_site_title(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys::new(&self.namespace)
    }
}
