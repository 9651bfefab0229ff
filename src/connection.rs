use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const DEFAULT_USER: &str = "root";

/// A remote endpoint the user can connect to.
///
/// `name` is a label only; two connections are the same endpoint when their
/// [`Identity`] matches.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub user: String,
    #[serde(default, rename = "key")]
    pub key_path: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identity<'a> {
    pub host: &'a str,
    pub user: &'a str,
    pub port: &'a str,
}

impl Connection {
    pub fn identity(&self) -> Identity<'_> {
        Identity {
            host: &self.host,
            user: &self.user,
            port: &self.port,
        }
    }

    pub fn same_endpoint(&self, other: &Connection) -> bool {
        self.identity() == other.identity()
    }

    /// Fills in the user `ssh` logs in as when none is set.
    pub fn with_default_user(mut self) -> Self {
        if self.user.is_empty() {
            self.user = DEFAULT_USER.to_string();
        }
        self
    }

    /// Arguments for the `ssh` binary: `user@host [-i key] [-p port]`.
    pub fn ssh_args(&self) -> Vec<String> {
        let user = if self.user.is_empty() {
            DEFAULT_USER
        } else {
            self.user.as_str()
        };

        let mut args = vec![format!("{}@{}", user, self.host)];
        if !self.key_path.is_empty() {
            args.push("-i".to_string());
            args.push(self.key_path.clone());
        }
        if !self.port.is_empty() {
            args.push("-p".to_string());
            args.push(self.port.clone());
        }
        args.retain(|arg| !arg.is_empty());
        args
    }

    /// Rebuilds a connection from arguments that were handed to `ssh`.
    ///
    /// Only `user@host`, `-p PORT`, `-pPORT` and `-i KEY` are understood; the
    /// rest is ignored. The host is empty when no `user@host` token exists.
    pub fn from_ssh_args<S: AsRef<str>>(args: &[S]) -> Self {
        let mut connection = Connection::default();
        let mut iter = args.iter().map(AsRef::as_ref);

        while let Some(arg) = iter.next() {
            if arg == "-p" {
                if let Some(port) = iter.next() {
                    connection.port = port.to_string();
                }
            } else if let Some(port) = arg.strip_prefix("-p") {
                connection.port = port.to_string();
            } else if arg == "-i" {
                if let Some(key) = iter.next() {
                    connection.key_path = key.to_string();
                }
            } else if let Some((user, host)) = arg.split_once('@') {
                connection.user = user.to_string();
                connection.host = host.to_string();
            }
        }

        connection
    }

    pub(crate) fn clean_name(&mut self) {
        self.name = self.name.trim().to_string();
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub connection: Connection,
    pub date: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(connection: Connection, date: DateTime<Utc>) -> Self {
        Self { connection, date }
    }

    pub fn now(connection: Connection) -> Self {
        Self::new(connection, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(user: &str, host: &str, port: &str, key: &str) -> Connection {
        Connection {
            name: String::new(),
            host: host.to_string(),
            port: port.to_string(),
            user: user.to_string(),
            key_path: key.to_string(),
        }
    }

    #[test]
    fn default_user_is_filled_only_when_missing() {
        let bare = Connection {
            host: "h".into(),
            ..Connection::default()
        };
        assert_eq!(bare.with_default_user().user, "root");

        let named = Connection {
            host: "h".into(),
            user: "deploy".into(),
            ..Connection::default()
        };
        assert_eq!(named.with_default_user().user, "deploy");
    }

    #[test]
    fn ssh_args_default_to_root_and_strip_empty_options() {
        assert_eq!(conn("", "10.0.0.1", "", "").ssh_args(), vec!["root@10.0.0.1"]);
    }

    #[test]
    fn ssh_args_include_key_then_port() {
        let args = conn("deploy", "web", "2222", "/keys/web").ssh_args();
        assert_eq!(args, vec!["deploy@web", "-i", "/keys/web", "-p", "2222"]);
    }

    #[test]
    fn parses_split_and_joined_port_flags() {
        let joined = Connection::from_ssh_args(&["admin@db", "-p2200"]);
        assert_eq!(joined.port, "2200");

        let split = Connection::from_ssh_args(&["-p", "2201", "-i", "id", "admin@db"]);
        assert_eq!(split.port, "2201");
        assert_eq!(split.key_path, "id");
        assert_eq!(split.user, "admin");
        assert_eq!(split.host, "db");
    }

    #[test]
    fn trailing_flag_without_value_is_ignored() {
        let parsed = Connection::from_ssh_args(&["a@b", "-p"]);
        assert_eq!(parsed.host, "b");
        assert!(parsed.port.is_empty());
    }

    #[test]
    fn identity_ignores_name_and_key() {
        let mut a = conn("u", "h", "22", "k1");
        a.name = "one".into();
        let mut b = conn("u", "h", "22", "k2");
        b.name = "two".into();
        assert!(a.same_endpoint(&b));
        assert!(!a.same_endpoint(&conn("other", "h", "22", "")));
    }

    #[test]
    fn history_entry_uses_short_json_field_names() {
        let entry = HistoryEntry::new(
            conn("u", "h", "22", "k"),
            "2024-05-01T10:00:00Z".parse().unwrap(),
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["connection"]["key"], "k");
        assert_eq!(json["date"], "2024-05-01T10:00:00Z");
    }

    #[test]
    fn history_entry_accepts_offset_timestamps_and_missing_fields() {
        let raw = r#"{"connection":{"host":"h"},"date":"2024-05-01T12:00:00.5+02:00"}"#;
        let entry: HistoryEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.connection.host, "h");
        assert!(entry.connection.user.is_empty());
        assert_eq!(entry.date.to_rfc3339(), "2024-05-01T10:00:00.500+00:00");
    }
}
