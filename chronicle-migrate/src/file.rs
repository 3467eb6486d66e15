//! Migration scripts on the filesystem.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::change::{Change, ChangeId};
use crate::error::{MigrateResult, MigrationError};
use crate::loader::{MigrationLoader, ScriptReader};

/// Marker line separating a script's "do" section from its "undo" section.
pub const UNDO_MARKER: &str = "-- //@UNDO";

/// How ids for new scripts are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Current UTC time as `YYYYMMDDHHMMSS`.
    #[default]
    Timestamp,
    /// One more than the highest existing id.
    Sequence,
}

/// Loads migrations from a directory of `<id>_<description>.sql` scripts.
#[derive(Debug, Clone)]
pub struct FileMigrationLoader {
    /// Directory where scripts are stored.
    scripts_dir: PathBuf,
}

impl FileMigrationLoader {
    /// Create a loader for the given directory.
    pub fn new(scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
        }
    }

    /// Get the scripts directory.
    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    /// Ensure the scripts directory exists.
    pub async fn ensure_dir(&self) -> MigrateResult<()> {
        tokio::fs::create_dir_all(&self.scripts_dir).await?;
        Ok(())
    }

    /// Path of the script backing `change`.
    pub fn script_path(&self, change: &Change) -> PathBuf {
        self.scripts_dir.join(&change.filename)
    }

    /// Create a new, empty script for `description` and return its path.
    ///
    /// Whitespace runs in the description become single underscores in the
    /// file name.
    pub async fn create_script(
        &self,
        description: &str,
        strategy: IdStrategy,
    ) -> MigrateResult<PathBuf> {
        let description = description.trim();
        if description.is_empty() {
            return Err(MigrationError::invalid_migration(
                "Description is required for a new migration script",
            ));
        }

        self.ensure_dir().await?;

        let id = self.next_id(strategy).await?;
        let slug = description.split_whitespace().collect::<Vec<_>>().join("_");
        let path = self.scripts_dir.join(format!("{}_{}.sql", id, slug));

        if tokio::fs::try_exists(&path).await? {
            return Err(MigrationError::invalid_migration(format!(
                "Script already exists: {}",
                path.display()
            )));
        }

        tokio::fs::write(&path, script_template(description)).await?;
        debug!(path = %path.display(), "Created migration script");
        Ok(path)
    }

    /// The id the next new script would get.
    pub async fn next_id(&self, strategy: IdStrategy) -> MigrateResult<ChangeId> {
        match strategy {
            IdStrategy::Timestamp => Utc::now().format("%Y%m%d%H%M%S").to_string().parse(),
            IdStrategy::Sequence => {
                let existing = if tokio::fs::try_exists(&self.scripts_dir).await? {
                    self.migrations().await?
                } else {
                    Vec::new()
                };
                Ok(existing
                    .into_iter()
                    .map(|change| change.id)
                    .max()
                    .map(|id| id.next_in_sequence())
                    .unwrap_or_else(|| ChangeId::from(1u64)))
            }
        }
    }
}

#[async_trait::async_trait]
impl MigrationLoader for FileMigrationLoader {
    async fn migrations(&self) -> MigrateResult<Vec<Change>> {
        if !tokio::fs::try_exists(&self.scripts_dir).await? {
            return Err(MigrationError::NotFound(
                self.scripts_dir.display().to_string(),
            ));
        }

        let mut entries = tokio::fs::read_dir(&self.scripts_dir).await?;
        let mut changes = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(String::from) else {
                warn!(path = %entry.path().display(), "Skipping script with non UTF-8 name");
                continue;
            };

            if !name.ends_with(".sql") {
                continue;
            }

            match Change::from_filename(&name) {
                Ok(change) => changes.push(change),
                Err(e) => warn!(file = %name, error = %e, "Skipping script"),
            }
        }

        Ok(changes)
    }

    async fn script_reader(&self, change: &Change, for_apply: bool) -> MigrateResult<ScriptReader> {
        let path = self.script_path(change);

        if !for_apply {
            let file = tokio::fs::File::open(&path).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MigrationError::NotFound(path.display().to_string())
                } else {
                    MigrationError::Io(e)
                }
            })?;
            return Ok(Box::new(file));
        }

        let content = tokio::fs::read_to_string(&path).await?;
        Ok(Box::new(Cursor::new(do_section(&content).to_string().into_bytes())))
    }
}

/// The part of a script before its undo marker.
pub fn do_section(script: &str) -> &str {
    let mut offset = 0;
    for line in script.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed
            .as_bytes()
            .get(..UNDO_MARKER.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(UNDO_MARKER.as_bytes()))
        {
            return &script[..offset];
        }
        offset += line.len();
    }
    script
}

/// Initial content of a new script.
fn script_template(description: &str) -> String {
    format!("-- // {}\n\n\n{}\n\n", description, UNDO_MARKER)
}
