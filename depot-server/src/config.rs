use std::path::PathBuf;

use depot_core::format_bytes_compact;
use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub upload_dir: PathBuf,
    /// 0 means unlimited.
    pub max_file_size: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_file_size: 0,
        }
    }
}

impl ServerConfig {
    /// `PORT`, `UPLOAD_DIR` and `MAX_FILE_SIZE` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let mut cfg = ServerConfig::default();
        if let Some(raw) = lookup("PORT") {
            match raw.trim().parse::<u16>() {
                Ok(p) => cfg.port = p,
                Err(_) => warn!("Invalid PORT value: {raw}, using {DEFAULT_PORT}"),
            }
        }
        if let Some(dir) = lookup("UPLOAD_DIR").filter(|d| !d.trim().is_empty()) {
            cfg.upload_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("MAX_FILE_SIZE") {
            cfg.max_file_size = parse_max_size(&raw);
        }
        cfg
    }

    pub fn log_limits(&self) {
        if self.max_file_size > 0 {
            info!("Maximum file size set to {}", format_bytes_compact(self.max_file_size));
        } else {
            info!("Maximum file size: unlimited");
        }
    }
}

fn parse_max_size(raw: &str) -> u64 {
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => n as u64,
        Ok(_) => 0,
        Err(_) => {
            warn!("Invalid MAX_FILE_SIZE value: {raw}, using unlimited");
            0
        }
    }
}
