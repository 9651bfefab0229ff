use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");

const DATA_DIR_ENV: &str = "SSHRECALL_DIR";
const SSH_CONFIG_ENV: &str = "SSHRECALL_SSH_CONFIG";

const HISTORY_FILE: &str = "history.json";
const SETTINGS_FILE: &str = "settings.json";
const LOG_FILE: &str = "sshrecall.log";

/// Filesystem locations, resolved once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub ssh_config: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let data_dir = match env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir()
                .ok_or_else(|| anyhow!("cannot determine the config directory"))?
                .join(CRATE_NAME),
        };

        let ssh_config = match env::var_os(SSH_CONFIG_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => dirs::home_dir()
                .ok_or_else(|| anyhow!("cannot determine the home directory"))?
                .join(".ssh")
                .join("config"),
        };

        Ok(Self {
            data_dir,
            ssh_config,
        })
    }

    pub fn history_file(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}
