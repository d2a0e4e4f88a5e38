// ⚙️ Gallery Configuration - Loaded from JSON, every field optional

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "GALLERY_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Image list endpoint (POST `subreddit=<name>`)
    pub api_url: String,

    /// Categories added at startup, in order
    pub default_categories: Vec<String>,

    /// Per-request timeout for image list fetches
    pub request_timeout_secs: u64,

    /// How many draws `next_image` makes before giving up
    pub max_draw_attempts: usize,

    /// Address the API server listens on
    pub bind_addr: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        GalleryConfig {
            api_url: "http://localhost:8080/api/image_lists.php".to_string(),
            default_categories: vec![
                "aww".to_string(),
                "earthporn".to_string(),
                "HumanPorn".to_string(),
            ],
            request_timeout_secs: 10,
            max_draw_attempts: 5,
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl GalleryConfig {
    /// Load config from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: GalleryConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `$GALLERY_CONFIG` if set, defaults otherwise
    pub fn load() -> Result<Self> {
        match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            bail!("api_url must not be empty");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be at least 1");
        }
        if self.max_draw_attempts == 0 {
            bail!("max_draw_attempts must be at least 1");
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
