//! SQLite-backed changelog access.

use std::path::{Path, PathBuf};

use rusqlite::OpenFlags;
use rusqlite::types::Value;
use tokio_rusqlite::Connection;
use tracing::{debug, trace};

use crate::change::{Change, ChangeId};
use crate::config::DEFAULT_CHANGELOG_TABLE;
use crate::error::{MigrateResult, MigrationError};
use crate::history::{ChangelogRepository, select_changelog_sql};

impl From<tokio_rusqlite::Error> for MigrationError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        MigrationError::database(err.to_string())
    }
}

/// Reads the changelog of a SQLite database.
///
/// Every call opens its own read-only connection and closes it before
/// returning. A missing database file is an error, not an empty changelog.
///
/// SQLite keeps a numeric `ID` as a 64-bit integer or, past that range, as a
/// double. Ids wider than `i64` are therefore read back rounded and will not
/// match the script they were recorded for. Keep ids within 19 digits when
/// the changelog lives in SQLite.
#[derive(Debug, Clone)]
pub struct SqliteChangelog {
    path: PathBuf,
    table: String,
}

impl SqliteChangelog {
    /// Create an accessor for the database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: DEFAULT_CHANGELOG_TABLE.to_string(),
        }
    }

    /// Create an accessor from a `sqlite:`/`file:` URL or a plain path.
    pub fn from_url(url: &str) -> MigrateResult<Self> {
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .or_else(|| url.strip_prefix("file:"))
            .unwrap_or(url);

        if path.is_empty() {
            return Err(MigrationError::config(format!(
                "Invalid SQLite database URL: '{}'",
                url
            )));
        }
        Ok(Self::new(path))
    }

    /// Set the changelog table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Changelog table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    async fn open(&self) -> MigrateResult<Connection> {
        trace!(path = %self.path.display(), "Opening changelog connection");
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Ok(Connection::open_with_flags(&self.path, flags).await?)
    }
}

#[async_trait::async_trait]
impl ChangelogRepository for SqliteChangelog {
    async fn changelog_exists(&self) -> MigrateResult<bool> {
        let conn = self.open().await?;
        let table = self.table.clone();

        let result = conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
                    [&table],
                    |row| row.get(0),
                )?;
                Ok(count > 0)
            })
            .await;

        conn.close().await?;
        let exists = result?;
        debug!(table = %self.table, exists, "Checked changelog table");
        Ok(exists)
    }

    async fn get_changelog(&self) -> MigrateResult<Vec<Change>> {
        let conn = self.open().await?;
        let sql = select_changelog_sql(&self.table);
        debug!(sql = %sql, "Reading changelog");

        let result = conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], |row| {
                    Ok((
                        row.get::<_, Value>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                    ))
                })?;
                let rows: Result<Vec<_>, _> = rows.collect();
                Ok(rows?)
            })
            .await;

        conn.close().await?;

        result?
            .into_iter()
            .map(|(id, applied_at, description)| {
                Ok(Change::applied(
                    id_from_value(id)?,
                    applied_at.unwrap_or_default(),
                    description.unwrap_or_default(),
                ))
            })
            .collect()
    }
}

/// Read a changelog `ID` stored as integer, real or text.
fn id_from_value(value: Value) -> MigrateResult<ChangeId> {
    match value {
        Value::Integer(i) => Ok(ChangeId::from(bigdecimal::BigDecimal::from(i))),
        Value::Real(r) => r.to_string().parse(),
        Value::Text(text) => text.parse(),
        other => Err(MigrationError::database(format!(
            "Unsupported changelog ID value: {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::history::changelog_table_sql;
    use crate::merge::version_insert;
    use crate::reconcile::pending_changes;

    fn database(dir: &TempDir, statements: &[&str]) -> PathBuf {
        let path = dir.path().join("test.db");
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("PRAGMA user_version = 1").unwrap();
        for sql in statements {
            conn.execute_batch(sql).unwrap();
        }
        path
    }

    #[test]
    fn test_from_url() {
        assert_eq!(
            SqliteChangelog::from_url("sqlite://data/app.db").unwrap().path(),
            Path::new("data/app.db")
        );
        assert_eq!(
            SqliteChangelog::from_url("file:./dev.db").unwrap().path(),
            Path::new("./dev.db")
        );
        assert_eq!(
            SqliteChangelog::from_url("plain.db").unwrap().path(),
            Path::new("plain.db")
        );
        assert!(SqliteChangelog::from_url("sqlite:").is_err());
    }

    #[tokio::test]
    async fn test_missing_table() {
        let dir = TempDir::new().unwrap();
        let path = database(&dir, &[]);
        let changelog = SqliteChangelog::new(path);
        assert!(!changelog.changelog_exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_reads_changelog_rows() {
        let dir = TempDir::new().unwrap();
        let create = changelog_table_sql("changelog");
        let path = database(
            &dir,
            &[
                &create,
                "INSERT INTO changelog VALUES (2, '2024-01-02 00:00:00.000', 'add_index')",
                "INSERT INTO changelog VALUES (1, '2024-01-01 00:00:00.000', 'create_users')",
            ],
        );

        let changelog = SqliteChangelog::new(path).with_table("CHANGELOG");
        assert!(changelog.changelog_exists().await.unwrap());

        let entries = changelog.get_changelog().await.unwrap();
        let ids: Vec<_> = entries.iter().map(|c| c.id.to_string()).collect();
        assert!(ids.contains(&"1".to_string()));
        assert!(ids.contains(&"2".to_string()));
        assert_eq!(ids.len(), 2);

        let first = entries.iter().find(|c| c.id == ChangeId::from(1u64)).unwrap();
        assert_eq!(first.description, "create_users");
        assert_eq!(first.applied_at.as_deref(), Some("2024-01-01 00:00:00.000"));
    }

    #[test]
    fn test_id_from_value() {
        assert_eq!(id_from_value(Value::Integer(7)).unwrap(), ChangeId::from(7u64));
        assert_eq!(id_from_value(Value::Real(3.0)).unwrap(), ChangeId::from(3u64));
        assert_eq!(id_from_value(Value::Text("12".to_string())).unwrap(), ChangeId::from(12u64));
        assert!(id_from_value(Value::Null).is_err());
    }

    #[tokio::test]
    async fn test_timestamp_ids_round_trip() {
        let dir = TempDir::new().unwrap();
        let id: ChangeId = "20231215120000".parse().unwrap();
        let insert = version_insert(
            &Change::new(id.clone(), "20231215120000_a.sql", "a"),
            "CHANGELOG",
            "2024-01-01 00:00:00.000",
            "",
        );
        let path = database(&dir, &[&changelog_table_sql("CHANGELOG"), &insert]);

        let entries = SqliteChangelog::new(path).get_changelog().await.unwrap();
        assert_eq!(entries[0].id, id);
    }

    #[tokio::test]
    async fn test_ids_wider_than_i64_are_rounded() {
        let dir = TempDir::new().unwrap();
        let wide: ChangeId = "123456789012345678901234567890".parse().unwrap();
        let change = Change::new(wide.clone(), "123456789012345678901234567890_a.sql", "a");
        let insert = version_insert(&change, "CHANGELOG", "2024-01-01 00:00:00.000", "");
        let path = database(&dir, &[&changelog_table_sql("CHANGELOG"), &insert]);

        let entries = SqliteChangelog::new(path).get_changelog().await.unwrap();
        assert_ne!(entries[0].id, wide);
        assert_eq!(
            pending_changes(vec![change], true, &entries)
                .iter()
                .map(|c| c.id.clone())
                .collect::<Vec<_>>(),
            vec![wide]
        );
    }

    #[tokio::test]
    async fn test_missing_database_file() {
        let dir = TempDir::new().unwrap();
        let changelog = SqliteChangelog::new(dir.path().join("absent.db"));
        assert!(matches!(
            changelog.changelog_exists().await,
            Err(MigrationError::Database(_))
        ));
        assert!(!dir.path().join("absent.db").exists());
    }

    #[tokio::test]
    async fn test_query_failure_is_database_error() {
        let dir = TempDir::new().unwrap();
        let path = database(&dir, &[]);
        let err = SqliteChangelog::new(path).get_changelog().await.unwrap_err();
        assert!(matches!(err, MigrationError::Database(_)));
    }
}
