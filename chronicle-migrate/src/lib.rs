//! # chronicle-migrate
//!
//! Migration engine for chronicle.
//!
//! This crate provides functionality for:
//! - Reading numbered migration scripts from a directory
//! - Reading the changelog table of a target database
//! - Reconciling both into the ordered list of pending changes
//! - Exporting a single merged SQL script for every pending change, including
//!   the changelog inserts that mark each change as applied
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │ Migration Loader │     │ Changelog Table  │
//! └──────────────────┘     └──────────────────┘
//!           │                        │
//!           └──────────┬─────────────┘
//!                      ▼
//!            ┌──────────────────┐
//!            │   Reconciler     │  pending = scripts - changelog, sorted by id
//!            └──────────────────┘
//!                      │
//!                      ▼
//!            ┌──────────────────┐     ┌─────────────┐
//!            │  Script Merger   │────▶│    Sink     │
//!            └──────────────────┘     └─────────────┘
//! ```
//!
//! The merged script is never executed here; it is written to a caller
//! supplied sink (stdout, a file, a buffer) for review or batch execution.
//!
//! ## Example
//!
//! ```rust,ignore
//! use chronicle_migrate::{FileMigrationLoader, MergeConfig, MigrationEngine, SqliteChangelog};
//!
//! async fn export() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MergeConfig::new().delimiter("GO").full_line_delimiter(true);
//!     let loader = FileMigrationLoader::new("./scripts");
//!     let changelog = SqliteChangelog::new("./app.db").with_table(&config.changelog_table);
//!
//!     let engine = MigrationEngine::new(Some(config), loader, changelog);
//!
//!     let mut stdout = tokio::io::stdout();
//!     let summary = engine.merged_script(&mut stdout).await?;
//!     eprintln!("{} changes merged", summary.count());
//!     Ok(())
//! }
//! ```
//!
//! ## Migration Files
//!
//! ```text
//! scripts/
//! ├── 20231215120000_create_users.sql
//! ├── 20231216090000_add_posts.sql
//! └── 20231217110000_add_user_email.sql
//! ```
//!
//! A script may carry an undo section after a `-- //@UNDO` line. Merged
//! scripts always contain the complete, unexecuted file.

pub mod change;
pub mod config;
pub mod engine;
pub mod error;
pub mod file;
pub mod history;
pub mod loader;
pub mod merge;
pub mod reconcile;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod timestamp;

// Re-exports
pub use change::{Change, ChangeId};
pub use config::{DEFAULT_CHANGELOG_TABLE, DEFAULT_DELIMITER, MergeConfig};
pub use engine::{MigrationEngine, MigrationStatus};
pub use error::{MigrateResult, MigrationError};
pub use file::{FileMigrationLoader, IdStrategy, UNDO_MARKER};
pub use history::{ChangelogRepository, changelog_table_sql};
pub use loader::{MigrationLoader, ScriptReader};
pub use merge::{BLOCK_SIZE, MergeSummary, copy_script_body, merge, trim_final_block, version_insert};
pub use reconcile::{pending_changes, resolve_pending};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteChangelog;
pub use timestamp::applied_timestamp;
