use std::fs::OpenOptions;

use anyhow::{bail, Context};
use sshrecall::{Action, App, AppConfig, FileStore};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_logging(&config);

    let action = Action::parse(std::env::args().skip(1));
    if action != Action::Help && !sshrecall::ssh_available() {
        bail!("ssh executable not found in PATH");
    }

    let mut app = App::new(FileStore::new(&config));
    let code = app.run(action)?;

    std::process::exit(code);
}

/// Logs go to a file next to the history: stderr belongs to the picker.
fn init_logging(config: &AppConfig) {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }

    let file = std::fs::create_dir_all(&config.data_dir)
        .and_then(|_| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(config.log_file())
        })
        .with_context(|| format!("cannot open {}", config.log_file().display()));

    match file {
        Ok(file) => env_logger::Builder::from_default_env()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init(),
        Err(err) => eprintln!("logging disabled: {err:#}"),
    }
}
