use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::Result;

/// Installs the global subscriber. `RUST_LOG` wins over the verbosity flag.
///
/// The CLI logs to stderr. The dashboard owns the terminal, so it logs to
/// `log_file` when configured and nowhere otherwise.
pub fn init(config: &Config) -> Result<()> {
    let default_level = if config.verbose { "disktrend=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if !config.dashboard {
        builder.with_writer(std::io::stderr).init();
        return Ok(());
    }

    match &config.log_file {
        Some(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::sink).init(),
    }

    Ok(())
}
