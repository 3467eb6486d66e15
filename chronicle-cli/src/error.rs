//! CLI error types and result alias.

use miette::Diagnostic;
use thiserror::Error;

use chronicle_migrate::MigrationError;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(chronicle::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(chronicle::config),
        help("check environments/<env>.toml or run `chronicle init`")
    )]
    Config(String),

    /// Migration error
    #[error("{0}")]
    #[diagnostic(code(chronicle::migration))]
    Migration(#[from] MigrationError),

    /// Command error
    #[error("Command error: {0}")]
    #[diagnostic(code(chronicle::command))]
    Command(String),
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("Failed to parse TOML: {}", err))
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        CliError::Config(format!("Failed to serialize TOML: {}", err))
    }
}
