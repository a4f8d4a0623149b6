//! CLI module graph and command dispatch.

pub mod chat;
pub mod command;
pub mod config;
pub mod diagnostic;
pub mod output;
pub mod subject;
pub mod vote;

use miette::Report;

use self::command::{Cli, ColorChoice, Commands};
use self::config::{LoadError, LoadedConfig};
use self::output::OutputConfig;
use crate::error::{Error, Result};
use crate::infrastructure::build_services;
use crate::infrastructure::config::logging::LoggingConfig;

/// A command that failed, with the exit code it maps to.
#[derive(Debug)]
pub struct Failure {
    exit_code: i32,
    report: Report,
}

impl Failure {
    /// Process exit code for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Print the failure to stderr, as a JSON line in `--json` mode.
    pub fn print(&self) {
        if output::is_json() {
            output::error(&self.report.to_string());
        } else {
            eprintln!("{:?}", self.report);
        }
    }
}

impl From<Error> for Failure {
    fn from(error: Error) -> Self {
        Self {
            exit_code: diagnostic::exit_code(&error),
            report: diagnostic::report(&error),
        }
    }
}

impl From<LoadError> for Failure {
    fn from(error: LoadError) -> Self {
        match error {
            LoadError::Source(source) => Self {
                exit_code: diagnostic::EXIT_FAILURE,
                report: Report::new(source),
            },
            LoadError::Other(error) => error.into(),
        }
    }
}

fn apply_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Auto => {}
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
    }
}

/// Logging settings after `-q` and `-v` are applied.
fn logging_for(base: &LoggingConfig, quiet: bool, verbose: u8) -> LoggingConfig {
    match (quiet, verbose) {
        (true, _) => base.with_level("error"),
        (false, 0) => base.clone(),
        (false, 1) => base.with_level("debug"),
        (false, _) => base.with_level("trace"),
    }
}

/// Run a parsed command line.
///
/// # Errors
/// Returns a [`Failure`] carrying the diagnostic and exit code.
pub async fn run(cli: Cli) -> std::result::Result<(), Failure> {
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));
    apply_color(cli.color);

    let loaded = config::load(cli.config.as_deref())?;
    logging_for(&loaded.config.logging, cli.quiet, cli.verbose).init();

    execute(&cli.command, &loaded).await?;
    Ok(())
}

async fn execute(command: &Commands, loaded: &LoadedConfig) -> Result<()> {
    if let Commands::Config(command) = command {
        return config::execute(command, loaded);
    }

    let services = build_services(&loaded.config)?;
    tracing::debug!(backend = %services.store.backend(), "services ready");

    match command {
        Commands::Ask(args) => subject::execute_ask(&services, args).await,
        Commands::Answer(args) => subject::execute_answer(&services, args).await,
        Commands::Vote(args) => vote::execute(&services, args).await,
        Commands::Show(args) => subject::execute_show(&services, args).await,
        Commands::List(args) => subject::execute_list(&services, args).await,
        Commands::Edit(args) => subject::execute_edit(&services, args).await,
        Commands::Moderate(args) => subject::execute_moderate(&services, args).await,
        Commands::Approve(args) => subject::execute_approve(&services, args).await,
        Commands::Delete(args) => subject::execute_delete(&services, args).await,
        Commands::Audit(args) => subject::execute_audit(&services, args).await,
        Commands::Chat(command) => chat::execute(&services, command).await,
        Commands::Config(command) => config::execute(command, loaded),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::error::ConflictError;

    #[test]
    fn quiet_wins_over_verbose() {
        let base = LoggingConfig::default();
        assert_eq!(logging_for(&base, true, 2).level, "error");
        assert_eq!(logging_for(&base, false, 0).level, "info");
        assert_eq!(logging_for(&base, false, 1).level, "debug");
        assert_eq!(logging_for(&base, false, 3).level, "trace");
    }

    #[test]
    fn failure_keeps_exit_code() {
        let failure = Failure::from(Error::from(ConflictError::DuplicateVote {
            subject: "s".into(),
            voter: "v".into(),
        }));
        assert_eq!(failure.exit_code(), diagnostic::EXIT_CONFLICT);

        let failure = Failure::from(Error::from(DomainError::EmptyBody));
        assert_eq!(failure.exit_code(), diagnostic::EXIT_INVALID);
    }
}
