//! Chronicle CLI - Command-line interface for chronicle migrations.

use clap::Parser;

use chronicle_cli::cli::{Cli, Command};
use chronicle_cli::commands;
use chronicle_cli::config::Paths;
use chronicle_cli::error::CliResult;
use chronicle_cli::{logging, output};

#[tokio::main]
async fn main() {
    logging::init();

    if let Err(e) = run().await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let paths = Paths::new(cli.path, cli.env);

    match cli.command {
        Command::Init(args) => commands::init::run(&paths, args).await,
        Command::New(args) => commands::new::run(&paths, args).await,
        Command::Status => commands::status::run(&paths).await,
        Command::Script(args) => commands::script::run(&paths, args).await,
        Command::Version => commands::version::run().await,
    }
}
