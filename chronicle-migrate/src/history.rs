//! Changelog access.

use crate::change::Change;
use crate::error::MigrateResult;

/// Read access to the changelog table of a target database.
#[async_trait::async_trait]
pub trait ChangelogRepository: Send + Sync {
    /// Whether the changelog table exists yet.
    async fn changelog_exists(&self) -> MigrateResult<bool>;

    /// Every change recorded as applied, ordered by id.
    async fn get_changelog(&self) -> MigrateResult<Vec<Change>>;
}

/// DDL for a changelog table.
pub fn changelog_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE {} (ID NUMERIC(20,0) NOT NULL, APPLIED_AT VARCHAR(25) NOT NULL, DESCRIPTION VARCHAR(255) NOT NULL)",
        table
    )
}

/// Query for every changelog row, ordered by id.
pub fn select_changelog_sql(table: &str) -> String {
    format!("SELECT ID, APPLIED_AT, DESCRIPTION FROM {} ORDER BY ID", table)
}
