use std::collections::HashMap;

use chrono::Duration;

use crate::connection::{Connection, HistoryEntry};
use crate::store::{ConnectionStore, StoreError};

type IdentityKey = (String, String, String);

fn identity_key(connection: &Connection) -> IdentityKey {
    let id = connection.identity();
    (id.host.to_string(), id.user.to_string(), id.port.to_string())
}

/// One entry per endpoint, the most recent one, newest first.
pub fn latest_by_identity(entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut latest: HashMap<IdentityKey, HistoryEntry> = HashMap::new();
    for entry in entries {
        let key = identity_key(&entry.connection);
        match latest.get(&key) {
            Some(existing) if existing.date >= entry.date => {}
            _ => {
                latest.insert(key, entry);
            }
        }
    }

    let mut list: Vec<HistoryEntry> = latest.into_values().collect();
    list.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| identity_key(&a.connection).cmp(&identity_key(&b.connection)))
    });
    list
}

/// Builds the list to persist: `current` (if it has a host) first, then the
/// older entries without `current`'s endpoint, each endpoint kept once with
/// its latest date.
pub fn merge(current: Option<HistoryEntry>, existing: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut list: Vec<HistoryEntry> = Vec::with_capacity(existing.len() + 1);
    let mut index: HashMap<IdentityKey, usize> = HashMap::new();

    let current = current.filter(|entry| !entry.connection.host.is_empty());
    for mut entry in current.into_iter().chain(existing) {
        entry.connection.clean_name();
        let key = identity_key(&entry.connection);
        match index.get(&key) {
            Some(&i) => {
                if entry.date > list[i].date {
                    list[i] = entry;
                }
            }
            None => {
                index.insert(key, list.len());
                list.push(entry);
            }
        }
    }

    list
}

/// Records the connection described by raw `ssh` arguments.
///
/// A lone argument without `@` is treated as an ssh config alias and recorded
/// only if the alias exists. Arguments without a host are ignored.
pub fn record_from_args<S, C>(args: &[S], store: &mut C) -> Result<(), StoreError>
where
    S: AsRef<str>,
    C: ConnectionStore + ?Sized,
{
    let connection = match args {
        [single] if !single.as_ref().contains('@') => {
            let alias = single.as_ref();
            match store.fetch_config(None) {
                Ok(list) => match list.into_iter().find(|c| c.name == alias) {
                    Some(connection) => connection,
                    None => return Ok(()),
                },
                Err(err) => {
                    log::debug!("not recording {alias}: {err}");
                    return Ok(());
                }
            }
        }
        _ => Connection::from_ssh_args(args),
    };

    if connection.host.is_empty() {
        log::debug!("nothing to record for {} arguments", args.len());
        return Ok(());
    }

    store.append(HistoryEntry::now(connection))
}

/// Coarse "time since" label for the last-login column.
pub fn readable_time(since: Duration) -> String {
    let seconds = since.num_seconds().max(0);
    let (value, unit) = match seconds {
        s if s < 60 => (s, "second"),
        s if s < 60 * 60 => (s / 60, "minute"),
        s if s < 60 * 60 * 24 => (s / (60 * 60), "hour"),
        s if s < 60 * 60 * 24 * 30 => (s / (60 * 60 * 24), "day"),
        s if s < 60 * 60 * 24 * 365 => (s / (60 * 60 * 24 * 30), "month"),
        s => (s / (60 * 60 * 24 * 365), "year"),
    };

    if value == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{value} {unit}s ago")
    }
}
