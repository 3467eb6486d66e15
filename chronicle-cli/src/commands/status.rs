//! `chronicle status` command - Show applied and pending migrations.

use crate::config::Paths;
use crate::error::CliResult;
use crate::output::{self, style_pending, style_success};

/// Marker shown in place of an applied-at time
const PENDING: &str = "...pending...";

/// Run the status command
pub async fn run(paths: &Paths) -> CliResult<()> {
    let config = paths.load_environment()?;
    let engine = super::engine(paths, config)?;
    let status = engine.status().await?;

    output::header(&format!("Migration Status ({})", paths.env()));

    if status.changes.is_empty() {
        output::dim("No migrations found");
        return Ok(());
    }

    let id_width = status
        .changes
        .iter()
        .map(|c| c.id.to_string().len())
        .max()
        .unwrap_or(2)
        .max(2);

    output::section(&format!("{:<id_width$}  {:<23}  Description", "ID", "Applied At"));
    for change in &status.changes {
        let applied = match &change.applied_at {
            Some(at) => style_success(&format!("{:<23}", at)),
            None => style_pending(&format!("{:<23}", PENDING)),
        };
        println!(
            "{:<id_width$}  {}  {}",
            change.id.to_string(),
            applied,
            change.description
        );
    }

    output::newline();
    output::info(&status.summary());
    Ok(())
}
