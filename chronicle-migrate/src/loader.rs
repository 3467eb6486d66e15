//! Source of migration scripts.

use tokio::io::AsyncRead;

use crate::change::Change;
use crate::error::MigrateResult;

/// An owned stream over one script's content.
pub type ScriptReader = Box<dyn AsyncRead + Send + Unpin>;

/// Loads the known migration set and the content of individual scripts.
#[async_trait::async_trait]
pub trait MigrationLoader: Send + Sync {
    /// Every known migration, in no particular order.
    async fn migrations(&self) -> MigrateResult<Vec<Change>>;

    /// Open the content of one script.
    ///
    /// With `for_apply == false` the stream yields the raw, unexecuted script
    /// body. With `for_apply == true` the loader may prepare the script for
    /// live application, for example by cutting off its undo section.
    async fn script_reader(&self, change: &Change, for_apply: bool) -> MigrateResult<ScriptReader>;
}
