use chrono::{DateTime, Utc};

use crate::connection::{Connection, HistoryEntry};
use crate::history::readable_time;
use crate::layout::{Column, CONFIG_COLUMNS, HISTORY_COLUMNS};

/// Which list the picker is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Config,
    History,
}

impl View {
    pub fn columns(self) -> &'static [Column] {
        match self {
            View::Config => &CONFIG_COLUMNS,
            View::History => &HISTORY_COLUMNS,
        }
    }
}

/// Display projection of a connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub connection: Connection,
    pub last_login: Option<String>,
}

impl Row {
    pub fn from_config(connection: Connection) -> Self {
        Self {
            connection,
            last_login: None,
        }
    }

    pub fn from_history(entry: HistoryEntry, now: DateTime<Utc>) -> Self {
        let since = now.signed_duration_since(entry.date);
        Self {
            connection: entry.connection,
            last_login: Some(readable_time(since)),
        }
    }

    /// Cell texts in column order: Name, Host, Port, User, Key[, Last login].
    pub fn cells(&self) -> Vec<&str> {
        let c = &self.connection;
        let mut cells = vec![
            c.name.as_str(),
            c.host.as_str(),
            c.port.as_str(),
            c.user.as_str(),
            c.key_path.as_str(),
        ];
        if let Some(last_login) = &self.last_login {
            cells.push(last_login.as_str());
        }
        cells
    }
}
