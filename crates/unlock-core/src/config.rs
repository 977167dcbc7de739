use crate::error::{Result, UnlockError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_email: Option<String>,
}

// ---------------------------------------------------------------------------
// LookupConfig
// ---------------------------------------------------------------------------

/// Third-party IMEI lookup service. Absent means lookup is disabled and
/// registration takes the model from the catalog entry alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    10
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub store: StoreConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup: Option<LookupConfig>,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(store_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            store: StoreConfig {
                name: store_name.into(),
                support_email: None,
            },
            lookup: None,
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(UnlockError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::config_path(root), data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("unlockhub");
        cfg.lookup = Some(LookupConfig {
            base_url: "https://lookup.example.com".into(),
            timeout_seconds: 5,
        });
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.store.name, "unlockhub");
        assert_eq!(loaded.lookup.unwrap().timeout_seconds, 5);
    }

    #[test]
    fn load_without_init_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(UnlockError::NotInitialized)
        ));
    }

    #[test]
    fn lookup_key_omitted_when_absent() {
        let cfg = Config::new("shop");
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        assert!(!yaml.contains("lookup"));
    }
}
