//! `chronicle script` command - Export a merged up-script.

use tokio::io::AsyncWriteExt;

use crate::cli::ScriptArgs;
use crate::config::Paths;
use crate::error::CliResult;
use crate::output;

/// Run the script command
pub async fn run(paths: &Paths, args: ScriptArgs) -> CliResult<()> {
    let config = paths.load_environment()?;
    let engine = super::engine(paths, config)?;

    let summary = match &args.output {
        Some(path) => {
            let mut file = tokio::fs::File::create(path).await?;
            let summary = engine.merged_script(&mut file).await?;
            file.sync_all().await?;
            summary
        }
        None => {
            let mut stdout = tokio::io::stdout();
            let summary = engine.merged_script(&mut stdout).await?;
            stdout.flush().await?;
            summary
        }
    };

    if summary.is_empty() {
        output::note("Database is up to date; no pending migrations");
    } else {
        let target = args
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".to_string());
        output::note(&format!("Merged {} pending migrations into {}", summary.count(), target));
    }

    Ok(())
}
