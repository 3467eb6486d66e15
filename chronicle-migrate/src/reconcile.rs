//! Changelog reconciliation: which changes still need to run.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::change::{Change, ChangeId};
use crate::error::MigrateResult;
use crate::history::ChangelogRepository;
use crate::loader::MigrationLoader;

/// Compute the ordered list of pending changes.
///
/// Without a changelog every migration is pending. Otherwise a migration is
/// pending when no changelog entry has the same id. Duplicate ids among the
/// migrations are passed through untouched. The result is sorted by id.
pub fn pending_changes(
    migrations: Vec<Change>,
    changelog_exists: bool,
    changelog: &[Change],
) -> Vec<Change> {
    let mut pending = if changelog_exists {
        let applied: HashSet<&ChangeId> = changelog.iter().map(|entry| &entry.id).collect();
        migrations
            .into_iter()
            .filter(|change| !applied.contains(&change.id))
            .collect()
    } else {
        migrations
    };

    // Stable, so duplicate ids keep their loader order.
    pending.sort();
    pending
}

/// Load the migration set and the changelog, then reconcile them.
///
/// The changelog entries are only fetched when the table exists. Collaborator
/// failures are returned as-is.
pub async fn resolve_pending<L, R>(loader: &L, changelog: &R) -> MigrateResult<Vec<Change>>
where
    L: MigrationLoader + ?Sized,
    R: ChangelogRepository + ?Sized,
{
    let migrations = loader.migrations().await?;
    let exists = changelog.changelog_exists().await?;
    let entries = if exists {
        changelog.get_changelog().await?
    } else {
        debug!("Changelog table does not exist; every migration is pending");
        Vec::new()
    };

    let total = migrations.len();
    let pending = pending_changes(migrations, exists, &entries);
    info!(
        total = total,
        applied = entries.len(),
        pending = pending.len(),
        "Reconciled migrations against changelog"
    );
    Ok(pending)
}
