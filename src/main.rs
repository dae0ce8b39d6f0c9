use std::io;
use std::process::ExitCode;

use clap::Parser;

use bookstore_queries::{
    app::commands,
    cli::{Cli, Commands},
    config::{Config, Settings},
    logging,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.log_json, cli.verbose);

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Plan(args) => {
            let settings = Settings::from_env()?;
            commands::show_plan(&mut io::stdout().lock(), &settings, &args)
        }
        Commands::Run(args) => {
            let config = Config::from_env(cli.uri, cli.db)?;
            commands::run_sequence(&config, args).await
        }
        Commands::Seed(args) => {
            let config = Config::from_env(cli.uri, cli.db)?;
            commands::seed(&config, args).await
        }
    }
}
