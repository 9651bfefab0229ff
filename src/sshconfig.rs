use std::{fs::File, io::BufReader, path::Path};

use ssh2_config::{ParseRule, SshConfig};

use crate::connection::Connection;
use crate::store::StoreError;

/// Reads every concrete `Host` alias of an OpenSSH client config.
///
/// Wildcard and negated patterns are skipped. `HostName` falls back to the
/// alias itself, the same way `ssh` resolves it. With a `search` term only
/// entries whose name or host contains it (ignoring case) are returned.
pub fn read_connections(path: &Path, search: Option<&str>) -> Result<Vec<Connection>, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let config = SshConfig::default()
        .parse(&mut reader, ParseRule::ALLOW_UNKNOWN_FIELDS)
        .map_err(|err| StoreError::SshConfig {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    let needle = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut datas = Vec::new();
    for host in config.get_hosts() {
        for alias in host.pattern.iter() {
            if alias.negated || is_wildcard(&alias.pattern) {
                continue;
            }

            let connection = Connection {
                name: alias.pattern.clone(),
                host: host
                    .params
                    .host_name
                    .clone()
                    .unwrap_or_else(|| alias.pattern.clone()),
                port: host.params.port.map(|p| p.to_string()).unwrap_or_default(),
                user: host.params.user.clone().unwrap_or_default(),
                key_path: host
                    .params
                    .identity_file
                    .as_ref()
                    .and_then(|files| files.first())
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            };

            if let Some(needle) = &needle {
                let haystack = format!("{} {}", connection.name, connection.host).to_lowercase();
                if !haystack.contains(needle.as_str()) {
                    continue;
                }
            }

            datas.push(connection);
        }
    }

    Ok(datas)
}

fn is_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}
