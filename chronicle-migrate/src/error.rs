//! Error types for the migration engine.

use thiserror::Error;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that can occur during migration operations.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// File system or output stream error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Changelog query error.
    #[error("Database error: {0}")]
    Database(String),

    /// Invalid migration file, name or identifier.
    #[error("Invalid migration: {0}")]
    InvalidMigration(String),

    /// Migration or scripts directory not found.
    #[error("Migration '{0}' not found")]
    NotFound(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A whole command failed; wraps the first failure encountered.
    #[error("Error executing command. Cause: {0}")]
    Command(#[source] Box<MigrationError>),
}

impl MigrationError {
    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create an invalid migration error.
    pub fn invalid_migration(msg: impl Into<String>) -> Self {
        Self::InvalidMigration(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an error as a failed command. Already wrapped errors are returned unchanged.
    pub fn command(cause: MigrationError) -> Self {
        match cause {
            Self::Command(_) => cause,
            other => Self::Command(Box::new(other)),
        }
    }

    /// The innermost cause of a wrapped command failure.
    pub fn root_cause(&self) -> &MigrationError {
        match self {
            Self::Command(inner) => inner.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_error_display() {
        let err = MigrationError::NotFound("20231215_test".to_string());
        assert!(err.to_string().contains("20231215_test"));
    }

    #[test]
    fn test_command_display_has_fixed_prefix() {
        let err = MigrationError::command(MigrationError::database("connection refused"));
        assert_eq!(
            err.to_string(),
            "Error executing command. Cause: Database error: connection refused"
        );
    }

    #[test]
    fn test_command_exposes_source() {
        let err = MigrationError::command(MigrationError::database("gone"));
        let source = err.source().expect("wrapped cause");
        assert_eq!(source.to_string(), "Database error: gone");
        assert!(matches!(err.root_cause(), MigrationError::Database(_)));
    }

    #[test]
    fn test_command_is_not_double_wrapped() {
        let once = MigrationError::command(MigrationError::config("boom"));
        let twice = MigrationError::command(once);
        assert_eq!(twice.to_string(), "Error executing command. Cause: Configuration error: boom");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: MigrationError = io.into();
        assert!(matches!(err, MigrationError::Io(_)));
        assert!(err.to_string().contains("pipe closed"));
    }
}
