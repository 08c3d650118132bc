use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{DepotError, Result};

pub const URL_ENV: &str = "DEPOT_URL";

/// Where the file store lives and how the upload view paces itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub upload_path: String,
    pub delete_path: String,
    pub listing_path: String,
    /// Minimum spacing between two speed samples.
    pub speed_sample_ms: u64,
    /// How long a completed upload stays visible.
    pub dismiss_after_ms: u64,
    pub fade_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            upload_path: "/upload".to_string(),
            delete_path: "/delete".to_string(),
            listing_path: "/uploads/".to_string(),
            speed_sample_ms: 200,
            dismiss_after_ms: 3000,
            fade_ms: 300,
        }
    }
}

impl ClientConfig {
    /// Defaults, then the JSON file if given, then `DEPOT_URL`, then `url_override`.
    pub fn load(file: Option<&Path>, url_override: Option<String>) -> Result<Self> {
        let mut cfg = match file {
            Some(p) => {
                let raw = std::fs::read_to_string(p)?;
                serde_json::from_str(&raw)
                    .map_err(|e| DepotError::Config(format!("{}: {e}", p.display())))?
            }
            None => ClientConfig::default(),
        };
        if let Ok(url) = std::env::var(URL_ENV) {
            if !url.trim().is_empty() {
                cfg.base_url = url;
            }
        }
        if let Some(url) = url_override {
            cfg.base_url = url;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.base()?;
        if !self.listing_path.ends_with('/') {
            return Err(DepotError::Config(format!(
                "listing_path must end with '/': {}",
                self.listing_path
            )));
        }
        Ok(())
    }

    pub fn base(&self) -> Result<Url> {
        Url::parse(&self.base_url)
            .map_err(|e| DepotError::Config(format!("invalid base URL {}: {e}", self.base_url)))
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base()?
            .join(path)
            .map_err(|e| DepotError::Config(format!("invalid endpoint {path}: {e}")))
    }

    pub fn session_timing(&self) -> SessionTiming {
        SessionTiming {
            speed_sample: Duration::from_millis(self.speed_sample_ms),
            dismiss_after: Duration::from_millis(self.dismiss_after_ms),
            fade: Duration::from_millis(self.fade_ms),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionTiming {
    pub speed_sample: Duration,
    pub dismiss_after: Duration,
    pub fade: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        ClientConfig::default().session_timing()
    }
}
