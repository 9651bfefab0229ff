use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::AppConfig;
use crate::connection::{Connection, HistoryEntry};
use crate::db::Db;
use crate::history;
use crate::settings::Settings;
use crate::sshconfig;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot parse ssh config {}: {message}", path.display())]
    SshConfig { path: PathBuf, message: String },
}

/// Where known connections come from and where used ones are recorded.
pub trait ConnectionStore {
    /// Every recorded entry; order is unspecified and duplicates may exist.
    fn fetch_history(&self) -> Result<Vec<HistoryEntry>, StoreError>;

    fn fetch_config(&self, search: Option<&str>) -> Result<Vec<Connection>, StoreError>;

    fn append(&mut self, entry: HistoryEntry) -> Result<(), StoreError>;

    fn remove_by_host(&mut self, host: &str) -> Result<(), StoreError>;

    fn remove_by_name(&mut self, name: &str) -> Result<(), StoreError>;
}

pub trait SettingsStore {
    /// Falls back to defaults when nothing usable is stored.
    fn load_settings(&self) -> Settings;

    fn save_settings(&mut self, settings: &Settings) -> Result<(), StoreError>;
}

/// JSON files under the data directory plus the user's ssh config.
#[derive(Clone, Debug)]
pub struct FileStore {
    history_path: PathBuf,
    settings_path: PathBuf,
    ssh_config_path: PathBuf,
}

impl FileStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            history_path: config.history_file(),
            settings_path: config.settings_file(),
            ssh_config_path: config.ssh_config.clone(),
        }
    }

    pub fn ssh_config_path(&self) -> &Path {
        &self.ssh_config_path
    }

    fn history(&self) -> Result<Db<Vec<HistoryEntry>>, StoreError> {
        Db::open(&self.history_path)
    }

    fn retain_history<F>(&mut self, keep: F) -> Result<(), StoreError>
    where
        F: Fn(&HistoryEntry) -> bool,
    {
        let mut db = self.history()?;
        let before = db.len();
        db.retain(|entry| keep(entry));
        let merged = history::merge(None, std::mem::take(&mut *db));
        *db = merged;
        log::info!(
            "removing {} history entries from {}",
            before - db.len(),
            self.history_path.display()
        );
        db.flush()
    }
}

impl ConnectionStore for FileStore {
    fn fetch_history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(self.history()?.into_inner())
    }

    fn fetch_config(&self, search: Option<&str>) -> Result<Vec<Connection>, StoreError> {
        sshconfig::read_connections(&self.ssh_config_path, search)
    }

    fn append(&mut self, entry: HistoryEntry) -> Result<(), StoreError> {
        let mut db = self.history()?;
        log::info!("recording connection to {}", entry.connection.host);
        let merged = history::merge(Some(entry), std::mem::take(&mut *db));
        *db = merged;
        db.flush()
    }

    fn remove_by_host(&mut self, host: &str) -> Result<(), StoreError> {
        self.retain_history(|entry| entry.connection.host != host)
    }

    fn remove_by_name(&mut self, name: &str) -> Result<(), StoreError> {
        self.retain_history(|entry| entry.connection.name != name)
    }
}

impl SettingsStore for FileStore {
    fn load_settings(&self) -> Settings {
        match Db::<Settings>::open(&self.settings_path) {
            Ok(db) => db.into_inner(),
            Err(err) => {
                log::warn!("ignoring unreadable settings: {err}");
                Settings::default()
            }
        }
    }

    fn save_settings(&mut self, settings: &Settings) -> Result<(), StoreError> {
        let mut db = Db::<Settings>::open(&self.settings_path)
            .unwrap_or_else(|_| Db::empty(&self.settings_path))
            .pretty();
        *db = *settings;
        db.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::{TimeZone, Utc};

    fn store(dir: &Path) -> FileStore {
        FileStore::new(&AppConfig {
            data_dir: dir.to_path_buf(),
            ssh_config: dir.join("ssh_config"),
        })
    }

    fn entry(name: &str, host: &str, user: &str, minute: u32) -> HistoryEntry {
        HistoryEntry::new(
            Connection {
                name: name.into(),
                host: host.into(),
                port: "22".into(),
                user: user.into(),
                key_path: String::new(),
            },
            Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap(),
        )
    }

    #[test]
    fn append_puts_newest_first_and_replaces_same_endpoint() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut store = store(temp.path());

        store.append(entry("a", "h1", "u", 1))?;
        store.append(entry("b", "h2", "u", 2))?;
        store.append(entry("a2", "h1", "u", 3))?;

        let list = store.fetch_history()?;
        let names: Vec<&str> = list.iter().map(|e| e.connection.name.as_str()).collect();
        assert_eq!(names, vec!["a2", "b"]);
        Ok(())
    }

    #[test]
    fn remove_by_host_drops_every_user_of_that_host() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut store = store(temp.path());
        store.append(entry("a", "h1", "u1", 1))?;
        store.append(entry("b", "h1", "u2", 2))?;
        store.append(entry("c", "h2", "u3", 3))?;

        store.remove_by_host("h1")?;

        let list = store.fetch_history()?;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].connection.host, "h2");
        Ok(())
    }

    #[test]
    fn remove_by_name_keeps_other_names() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut store = store(temp.path());
        store.append(entry("keep", "h1", "u1", 1))?;
        store.append(entry("drop", "h2", "u2", 2))?;

        store.remove_by_name("drop")?;

        let list = store.fetch_history()?;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].connection.name, "keep");
        Ok(())
    }

    #[test]
    fn append_refuses_to_overwrite_corrupt_history() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut store = store(temp.path());
        std::fs::write(temp.path().join("history.json"), "not json")?;

        assert!(store.append(entry("a", "h", "u", 1)).is_err());
        assert_eq!(
            std::fs::read_to_string(temp.path().join("history.json"))?,
            "not json"
        );
        Ok(())
    }

    #[test]
    fn settings_default_then_persist_pretty() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut store = store(temp.path());
        assert!(!store.load_settings().fullscreen);

        store.save_settings(&Settings { fullscreen: true })?;

        assert!(store.load_settings().fullscreen);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("settings.json"))?,
            "{\n  \"fullscreen\": true\n}"
        );
        Ok(())
    }

    #[test]
    fn corrupt_settings_load_as_default_and_are_replaced() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut store = store(temp.path());
        std::fs::write(temp.path().join("settings.json"), "{oops")?;

        assert_eq!(store.load_settings(), Settings::default());
        store.save_settings(&Settings { fullscreen: true })?;
        assert!(store.load_settings().fullscreen);
        Ok(())
    }
}
