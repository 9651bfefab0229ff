use std::process::Command;

use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::event;
use unicode_width::UnicodeWidthStr;

use crate::command::{Action, USAGE};
use crate::connection::{Connection, HistoryEntry};
use crate::history;
use crate::row::{Row, View};
use crate::select_box::{Outcome, SelectBox};
use crate::store::{ConnectionStore, SettingsStore};
use crate::terminal::Terminal;

const SSH_BINARY: &str = "ssh";

pub struct App<S> {
    store: S,
}

impl<S> App<S>
where
    S: ConnectionStore + SettingsStore,
{
    pub fn new(store: S) -> Self {
        App { store }
    }

    /// Runs `action` and returns the exit code for the process.
    pub fn run(&mut self, action: Action) -> Result<i32> {
        let args = match action {
            Action::Help => {
                println!("{USAGE}");
                return Ok(0);
            }
            Action::ListHistory => {
                print_table(View::History, &self.history_rows());
                return Ok(0);
            }
            Action::ListConfig => {
                print_table(View::Config, &self.config_rows(None));
                return Ok(0);
            }
            Action::InteractiveHistory => match self.pick(View::History, None)? {
                Outcome::Chosen(connection) => return self.connect(connection),
                Outcome::Cancelled | Outcome::Exhausted => return Ok(0),
            },
            Action::InteractiveConfig(search) => match self.pick(View::Config, search.as_deref())? {
                Outcome::Chosen(connection) => return self.connect(connection),
                Outcome::Cancelled | Outcome::Exhausted => return Ok(0),
            },
            Action::Ssh(args) => args,
        };

        self.record_args(&args);
        run_ssh(&args)
    }

    /// Records a connection chosen in the picker under the user `ssh` will
    /// log in as, so it shares a history row with the same `user@host` typed
    /// on the command line.
    pub fn record_pick(&mut self, connection: Connection) {
        let entry = HistoryEntry::now(connection.with_default_user());
        if let Err(err) = self.store.append(entry) {
            log::warn!("failed to record history: {err}");
            eprintln!("error saving history: {err}");
        }
    }

    /// Records the connection described by raw `ssh` arguments.
    pub fn record_args(&mut self, args: &[String]) {
        if let Err(err) = history::record_from_args(args, &mut self.store) {
            log::warn!("failed to record history: {err}");
            eprintln!("error saving history: {err}");
        }
    }

    /// History rows, one per endpoint, newest first.
    pub fn history_rows(&self) -> Vec<Row> {
        let entries = self.store.fetch_history().unwrap_or_else(|err| {
            log::warn!("treating history as empty: {err}");
            Vec::new()
        });

        let now = Utc::now();
        history::latest_by_identity(entries)
            .into_iter()
            .map(|entry| Row::from_history(entry, now))
            .collect()
    }

    pub fn config_rows(&self, search: Option<&str>) -> Vec<Row> {
        self.store
            .fetch_config(search)
            .unwrap_or_else(|err| {
                log::warn!("treating ssh config as empty: {err}");
                Vec::new()
            })
            .into_iter()
            .map(Row::from_config)
            .collect()
    }

    /// Loads the rows for `view` and runs the picker over them.
    ///
    /// Without rows nothing is drawn: a notice is printed and the outcome is
    /// [`Outcome::Exhausted`].
    pub fn pick(&mut self, view: View, search: Option<&str>) -> Result<Outcome> {
        let rows = match view {
            View::History => self.history_rows(),
            View::Config => self.config_rows(search),
        };

        if rows.is_empty() {
            match view {
                View::History => println!("No history found."),
                View::Config => println!("No config found."),
            }
            return Ok(Outcome::Exhausted);
        }

        self.select(view, rows)
    }

    fn select(&mut self, view: View, rows: Vec<Row>) -> Result<Outcome> {
        let mut select_box = SelectBox::new(view, rows, self.store.load_settings());
        let mut terminal = Terminal::new(
            select_box.settings().fullscreen,
            select_box.windowed_viewport_height(),
        )
        .context("failed to set up the terminal")?;

        let size = terminal.size()?;
        select_box.resize(size.width, size.height);

        loop {
            select_box.draw(&mut terminal)?;
            let event = event::read().context("failed to read terminal input")?;

            if let Some(outcome) = select_box.handle_event(event, &mut self.store) {
                let outcome = outcome.clone();
                // clear the current buffer
                terminal.clear()?;
                return Result::Ok(outcome);
            }

            let fullscreen = select_box.settings().fullscreen;
            if fullscreen != terminal.is_fullscreen() {
                terminal.set_fullscreen(fullscreen)?;
                let size = terminal.size()?;
                select_box.resize(size.width, size.height);
            }
        }
    }

    fn connect(&mut self, connection: Connection) -> Result<i32> {
        let args = connection.ssh_args();
        self.record_pick(connection);
        run_ssh(&args)
    }
}

/// Runs `ssh` attached to this process's terminal and waits for it.
pub fn run_ssh(args: &[String]) -> Result<i32> {
    let args: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|arg| !arg.is_empty())
        .collect();
    log::info!("running {SSH_BINARY} {}", args.join(" "));

    let status = Command::new(SSH_BINARY)
        .args(&args)
        .status()
        .with_context(|| format!("failed to run {SSH_BINARY}"))?;
    Ok(status.code().unwrap_or(1))
}

/// Whether an `ssh` executable is reachable through `PATH`.
pub fn ssh_available() -> bool {
    which::which(SSH_BINARY).is_ok()
}

fn print_table(view: View, rows: &[Row]) {
    print!("{}", render_table(view, rows));
}

/// Plain-text rendering of `rows` for the list commands.
pub fn render_table(view: View, rows: &[Row]) -> String {
    let titles: Vec<&str> = view.columns().iter().map(|c| c.title).collect();
    let mut widths: Vec<usize> = titles.iter().map(|t| t.width()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.width());
        }
    }

    let line = |cells: &[&str]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell}{}", " ".repeat(width - cell.width())))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(&titles);
    for row in rows {
        out.push_str(&line(&row.cells()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn ssh_is_found_through_path() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let with_ssh = tempfile::tempdir()?;
        let binary = with_ssh.path().join(SSH_BINARY);
        std::fs::write(&binary, "#!/bin/sh\n")?;
        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755))?;
        let without_ssh = tempfile::tempdir()?;

        let original = std::env::var_os("PATH");
        std::env::set_var("PATH", with_ssh.path());
        let found = ssh_available();
        std::env::set_var("PATH", without_ssh.path());
        let missing = ssh_available();
        match original {
            Some(path) => std::env::set_var("PATH", path),
            None => std::env::remove_var("PATH"),
        }

        assert!(found);
        assert!(!missing);
        Ok(())
    }

    #[test]
    fn render_table_pads_columns_to_widest_cell() {
        let rows = vec![
            Row::from_config(Connection {
                name: "web".into(),
                host: "10.0.0.1".into(),
                port: "22".into(),
                user: "deploy".into(),
                key_path: String::new(),
            }),
            Row::from_config(Connection {
                name: "database".into(),
                host: "db".into(),
                ..Connection::default()
            }),
        ];

        let out = render_table(View::Config, &rows);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Name      Host      Port  User    Key");
        assert_eq!(lines[1], "web       10.0.0.1  22    deploy");
        assert_eq!(lines[2], "database  db");
    }
}
