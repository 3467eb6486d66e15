//! # Chronicle
//!
//! Changelog-driven SQL migrations for Rust.
//!
//! Chronicle provides:
//! - Numbered migration scripts kept in a plain directory
//! - A changelog table recording which scripts a database has applied
//! - Reconciliation of both into the ordered list of pending changes
//! - Export of every pending change as one merged SQL script, changelog
//!   inserts included, for review or batch execution by other tooling
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chronicle::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), chronicle::MigrationError> {
//!     let engine = MigrationEngine::new(
//!         None,
//!         FileMigrationLoader::new("./scripts"),
//!         SqliteChangelog::new("./app.db"),
//!     );
//!
//!     let mut out = tokio::fs::File::create("up.sql").await?;
//!     let summary = engine.merged_script(&mut out).await?;
//!     println!("{} pending changes merged", summary.count());
//!
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Migration loading, reconciliation and script merging.
pub mod migrate {
    pub use chronicle_migrate::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::migrate::{
        Change, ChangeId, ChangelogRepository, FileMigrationLoader, MergeConfig, MergeSummary,
        MigrationEngine, MigrationLoader, SqliteChangelog,
    };
}

// Re-export key types at the crate root
pub use migrate::{Change, ChangeId, MergeConfig, MigrateResult, MigrationEngine, MigrationError};
