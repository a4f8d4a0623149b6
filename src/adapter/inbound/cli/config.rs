//! Handler for the `config` command group and config file discovery.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::adapter::inbound::cli::command::ConfigCommand;
use crate::adapter::inbound::cli::diagnostic::ConfigSourceError;
use crate::adapter::inbound::cli::output;
use crate::error::{ConfigError, Error, Result};
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::paths;

/// A validated configuration and the file it came from, if any.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedConfig {
    pub source: Option<PathBuf>,
    #[serde(flatten)]
    pub config: Config,
}

/// Why a config file could not be turned into a [`Config`].
#[derive(Debug)]
pub enum LoadError {
    /// The TOML itself is malformed; carries the file for display.
    Source(ConfigSourceError),
    Other(Error),
}

impl From<Error> for LoadError {
    fn from(e: Error) -> Self {
        Self::Other(e)
    }
}

/// Locate and load configuration.
///
/// An explicit path must exist. Without one, `~/.qa-ledger/config.toml` is
/// used when present and built-in defaults otherwise.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load(explicit: Option<&Path>) -> std::result::Result<LoadedConfig, LoadError> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(paths::default_config()).filter(|p| p.is_file()),
    };

    let Some(path) = path else {
        return Ok(LoadedConfig {
            source: None,
            config: Config::parse_toml("")?,
        });
    };

    let content = std::fs::read_to_string(&path).map_err(|e| Error::from(ConfigError::ReadFile(e)))?;
    match Config::parse_toml(&content) {
        Ok(config) => Ok(LoadedConfig {
            source: Some(path),
            config,
        }),
        Err(Error::Config(ConfigError::Parse(parse))) => Err(LoadError::Source(
            ConfigSourceError::new(
                format!("failed to parse config: {}", parse.message()),
                path.display().to_string(),
                content,
                parse.span(),
            )
            .with_help("see config.toml.example for the accepted sections and keys"),
        )),
        Err(other) => Err(other.into()),
    }
}

/// Execute a `config` subcommand against an already loaded config.
pub fn execute(command: &ConfigCommand, loaded: &LoadedConfig) -> Result<()> {
    match command {
        ConfigCommand::Show => execute_show(loaded),
        ConfigCommand::Validate => {
            execute_validate(loaded);
            Ok(())
        }
    }
}

fn source_label(loaded: &LoadedConfig) -> String {
    loaded.source.as_ref().map_or_else(
        || output::muted("(built-in defaults)"),
        |p| p.display().to_string(),
    )
}

fn execute_show(loaded: &LoadedConfig) -> Result<()> {
    if output::is_json() {
        output::record("config", loaded, |_| {});
        return Ok(());
    }

    let storage = &loaded.config.storage;
    output::section("Effective Configuration");
    output::field("Source", source_label(loaded));

    output::section("Logging");
    output::field("Level", &loaded.config.logging.level);
    output::field("Format", &loaded.config.logging.format);

    output::section("Storage");
    output::field("Backend", storage.backend);
    output::field("Database", storage.database_path().display());
    output::field("Pool size", storage.pool_size);
    output::field("Busy timeout", format!("{}ms", storage.busy_timeout_ms));

    if output::verbosity() > 0 {
        output::section("TOML");
        for line in loaded.config.to_toml()?.lines() {
            output::note(line);
        }
    }
    Ok(())
}

fn execute_validate(loaded: &LoadedConfig) {
    output::record(
        "config_valid",
        &serde_json::json!({ "valid": true, "source": loaded.source }),
        |_| {
            output::success("Configuration is valid");
            output::field("Source", source_label(loaded));
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(
            result,
            Err(LoadError::Other(Error::Config(ConfigError::ReadFile(_))))
        ));
    }

    #[test]
    fn malformed_file_reports_span() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[storage]\npool_size = \"many\"").unwrap();

        let Err(LoadError::Source(err)) = load(Some(file.path())) else {
            panic!("expected a source diagnostic");
        };
        assert!(err.message.starts_with("failed to parse config"));
        assert!(err.span.is_some());
        assert!(err.help.is_some());
    }

    #[test]
    fn explicit_file_is_recorded_as_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[storage]\nbackend = \"memory\"").unwrap();

        let loaded = load(Some(file.path())).unwrap();
        assert_eq!(loaded.source.as_deref(), Some(file.path()));
    }

    #[test]
    fn invalid_value_is_not_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[storage]\npool_size = 0").unwrap();

        assert!(matches!(
            load(Some(file.path())),
            Err(LoadError::Other(Error::Config(ConfigError::InvalidValue { .. })))
        ));
    }
}
