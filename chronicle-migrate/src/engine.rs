//! Migration engine implementation.

use std::collections::HashMap;

use tokio::io::AsyncWrite;
use tracing::info;

use crate::change::{Change, ChangeId};
use crate::config::MergeConfig;
use crate::error::{MigrateResult, MigrationError};
use crate::history::ChangelogRepository;
use crate::loader::MigrationLoader;
use crate::merge::{MergeSummary, merge};
use crate::reconcile::resolve_pending;

/// Ties a migration loader and a changelog together.
pub struct MigrationEngine<L: MigrationLoader, R: ChangelogRepository> {
    config: MergeConfig,
    loader: L,
    changelog: R,
}

impl<L: MigrationLoader, R: ChangelogRepository> MigrationEngine<L, R> {
    /// Create a new migration engine. Without a configuration the defaults apply.
    pub fn new(config: Option<MergeConfig>, loader: L, changelog: R) -> Self {
        Self {
            config: config.unwrap_or_default(),
            loader,
            changelog,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Changes not yet recorded in the changelog, sorted by id.
    pub async fn pending(&self) -> MigrateResult<Vec<Change>> {
        resolve_pending(&self.loader, &self.changelog).await
    }

    /// Write the merged up-script for every pending change to `sink`.
    pub async fn merged_script<W>(&self, sink: &mut W) -> MigrateResult<MergeSummary>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let pending = self.pending().await.map_err(MigrationError::command)?;
        let summary = merge(&pending, &self.loader, &self.config, sink).await?;
        info!(merged = summary.count(), "Generated merged script");
        Ok(summary)
    }

    /// Applied and pending state of every known change.
    pub async fn status(&self) -> MigrateResult<MigrationStatus> {
        let migrations = self.loader.migrations().await?;
        let applied: HashMap<ChangeId, Change> = if self.changelog.changelog_exists().await? {
            self.changelog
                .get_changelog()
                .await?
                .into_iter()
                .map(|entry| (entry.id.clone(), entry))
                .collect()
        } else {
            HashMap::new()
        };

        let mut changes: Vec<Change> = migrations
            .into_iter()
            .map(|mut change| {
                change.applied_at = applied
                    .get(&change.id)
                    .and_then(|entry| entry.applied_at.clone());
                change
            })
            .collect();
        changes.sort();

        let total_pending = changes.iter().filter(|c| !c.is_applied()).count();
        Ok(MigrationStatus {
            total_applied: changes.len() - total_pending,
            total_pending,
            changes,
        })
    }
}

/// Migration status information.
#[derive(Debug)]
pub struct MigrationStatus {
    /// Every known change sorted by id; `applied_at` is set for applied ones.
    pub changes: Vec<Change>,
    /// Number of applied changes.
    pub total_applied: usize,
    /// Number of pending changes.
    pub total_pending: usize,
}

impl MigrationStatus {
    /// Changes still to run.
    pub fn pending(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter().filter(|c| !c.is_applied())
    }

    /// Whether the database is up to date.
    pub fn is_up_to_date(&self) -> bool {
        self.total_pending == 0
    }

    /// Get a summary of the status.
    pub fn summary(&self) -> String {
        if self.changes.is_empty() {
            return "No migrations found".to_string();
        }
        format!(
            "{} applied, {} pending",
            self.total_applied, self.total_pending
        )
    }
}
