//! CLI command implementations.

pub mod init;
pub mod new;
pub mod script;
pub mod status;
pub mod version;

use chronicle_migrate::{FileMigrationLoader, MigrationEngine, SqliteChangelog};

use crate::config::{EnvironmentConfig, Paths};
use crate::error::CliResult;

/// Engine over the project's scripts directory and the environment's database
pub(crate) type ProjectEngine = MigrationEngine<FileMigrationLoader, SqliteChangelog>;

/// Build the engine for the selected environment
pub(crate) fn engine(paths: &Paths, config: EnvironmentConfig) -> CliResult<ProjectEngine> {
    let url = paths.resolve_database_url(config.database_url()?);
    let changelog = SqliteChangelog::from_url(&url)?.with_table(&config.merge.changelog_table);
    let loader = FileMigrationLoader::new(paths.scripts_dir());
    Ok(MigrationEngine::new(Some(config.merge), loader, changelog))
}
