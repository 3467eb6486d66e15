//! `chronicle init` command - Create the project layout.

use crate::cli::InitArgs;
use crate::config::{DEFAULT_DATABASE_URL, EnvironmentConfig, Paths};
use crate::error::{CliError, CliResult};
use crate::output::{self, kv, success};

/// Run the init command
pub async fn run(paths: &Paths, args: InitArgs) -> CliResult<()> {
    output::header("Initialize Chronicle Project");

    let env_file = paths.environment_file();
    if env_file.exists() && !args.force {
        return Err(CliError::Command(format!(
            "{} already exists (use --force to overwrite)",
            env_file.display()
        )));
    }

    tokio::fs::create_dir_all(paths.scripts_dir()).await?;
    tokio::fs::create_dir_all(paths.environments_dir()).await?;

    let mut config = EnvironmentConfig::default();
    config.database.url = Some(args.url.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()));
    config.save(&env_file)?;

    kv("Project", &paths.base().display().to_string());
    kv("Scripts", &paths.scripts_dir().display().to_string());
    kv("Environment", &env_file.display().to_string());
    output::newline();
    success("Project initialized");

    Ok(())
}
