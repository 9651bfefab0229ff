mod app;
mod command;
mod config;
mod connection;
mod db;
mod filter;
mod history;
mod input;
mod layout;
mod row;
mod select_box;
mod settings;
mod sshconfig;
mod store;
mod terminal;

pub use app::{render_table, run_ssh, ssh_available, App};
pub use command::{Action, USAGE};
pub use config::{AppConfig, CRATE_NAME};
pub use connection::{Connection, HistoryEntry, Identity};
pub use db::Db;
pub use filter::{filter, filter_indices};
pub use history::{latest_by_identity, merge, readable_time, record_from_args};
pub use layout::{layout, Column, Grow, CONFIG_COLUMNS, HISTORY_COLUMNS};
pub use row::{Row, View};
pub use select_box::{Outcome, SelectBox, State};
pub use settings::Settings;
pub use sshconfig::read_connections;
pub use store::{ConnectionStore, FileStore, SettingsStore, StoreError};
pub use terminal::Terminal;
