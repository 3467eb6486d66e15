//! `chronicle new` command - Create a new migration script.

use chronicle_migrate::{FileMigrationLoader, IdStrategy};

use crate::cli::NewArgs;
use crate::config::Paths;
use crate::error::CliResult;
use crate::output::success;

/// Run the new command
pub async fn run(paths: &Paths, args: NewArgs) -> CliResult<()> {
    let strategy = if args.sequence {
        IdStrategy::Sequence
    } else if paths.environment_file().exists() {
        paths.load_environment()?.id_strategy
    } else {
        IdStrategy::default()
    };

    let loader = FileMigrationLoader::new(paths.scripts_dir());
    let path = loader
        .create_script(&args.description.join(" "), strategy)
        .await?;

    success(&format!("Created {}", path.display()));
    Ok(())
}
