use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::platform;
use crate::probe::DEFAULT_PROBE_TIMEOUT;
use crate::store::HISTORY_FILE_NAME;

pub struct Config {
    pub history_path: PathBuf,
    pub probe_timeout: Duration,
    pub json_output: bool,
    pub dashboard: bool,
    pub verbose: bool,
    /// Where dashboard sessions write logs; discarded when unset.
    pub log_file: Option<PathBuf>,
}

/// Optional settings read from `config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub history_path: Option<PathBuf>,
    /// humantime duration, e.g. "2s" or "750ms"
    pub probe_timeout: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let history_path = platform::home_dir()
            .map(|h| h.join(HISTORY_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(HISTORY_FILE_NAME));

        Config {
            history_path,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            json_output: false,
            dashboard: false,
            verbose: false,
            log_file: None,
        }
    }
}

impl Config {
    /// Defaults, then the config file, then command-line flags.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = Config::default();

        let file = match &cli.config {
            Some(path) => Some(read_file(path)?),
            None => match default_config_path() {
                Some(path) => read_optional_file(&path)?,
                None => None,
            },
        };
        if let Some(file) = file {
            config.apply_file(file)?;
        }

        if let Some(path) = &cli.history {
            config.history_path = path.clone();
        }
        if let Some(secs) = cli.timeout {
            config.probe_timeout = validate_timeout(Duration::from_secs(secs))?;
        }
        config.json_output = cli.json;
        config.dashboard = cli.graph;
        config.verbose = cli.verbose;

        Ok(config)
    }

    pub fn apply_file(&mut self, file: FileConfig) -> Result<()> {
        if let Some(path) = file.history_path {
            self.history_path = path;
        }
        if let Some(timeout) = file.probe_timeout {
            let parsed = humantime::parse_duration(&timeout)
                .map_err(|e| Error::Config(format!("invalid probe_timeout '{timeout}': {e}")))?;
            self.probe_timeout = validate_timeout(parsed)?;
        }
        if let Some(path) = file.log_file {
            self.log_file = Some(path);
        }
        Ok(())
    }
}

/// `~/.config/disktrend/config.toml` or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "disktrend")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn parse_file(contents: &str) -> Result<FileConfig> {
    toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
}

fn read_file(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
    parse_file(&contents)
}

/// Like `read_file`, but a missing file just means no overrides.
fn read_optional_file(path: &Path) -> Result<Option<FileConfig>> {
    match fs::read_to_string(path) {
        Ok(contents) => parse_file(&contents).map(Some),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Config(format!("failed to read {}: {e}", path.display()))),
    }
}

fn validate_timeout(timeout: Duration) -> Result<Duration> {
    if timeout.is_zero() {
        return Err(Error::Config("probe timeout must be greater than zero".to_string()));
    }
    Ok(timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn defaults_use_two_second_timeout() {
        let config = Config::default();
        assert_eq!(config.probe_timeout, Duration::from_secs(2));
        assert!(config.history_path.ends_with(HISTORY_FILE_NAME));
    }

    #[test]
    fn file_overrides_defaults() {
        let file = parse_file(
            r#"
            history_path = "/var/lib/disktrend/history.json"
            probe_timeout = "750ms"
            "#,
        )
        .unwrap();

        let mut config = Config::default();
        config.apply_file(file).unwrap();
        assert_eq!(config.history_path, PathBuf::from("/var/lib/disktrend/history.json"));
        assert_eq!(config.probe_timeout, Duration::from_millis(750));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(parse_file("retention = \"7d\""), Err(Error::Config(_))));
    }

    #[test]
    fn bad_duration_is_a_config_error() {
        let file = parse_file("probe_timeout = \"soon\"").unwrap();
        assert!(Config::default().apply_file(file).is_err());

        let file = parse_file("probe_timeout = \"0s\"").unwrap();
        assert!(Config::default().apply_file(file).is_err());
    }

    #[test]
    fn cli_flags_override_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "probe_timeout = \"5s\"\nhistory_path = \"/from/file.json\"\n").unwrap();

        let cli = Cli::parse_from([
            "disktrend",
            "--config",
            path.to_str().unwrap(),
            "--timeout",
            "3",
            "--graph",
        ]);
        let config = Config::from_cli(&cli).unwrap();

        assert_eq!(config.probe_timeout, Duration::from_secs(3));
        assert_eq!(config.history_path, PathBuf::from("/from/file.json"));
        assert!(config.dashboard);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let cli = Cli::parse_from(["disktrend", "--config", "/definitely/not/here.toml"]);
        assert!(matches!(Config::from_cli(&cli), Err(Error::Config(_))));
    }
}
