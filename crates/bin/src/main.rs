use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use output::OutputFormat;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output on stdout stays parseable
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "binder=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let format = OutputFormat::from_json_flag(cli.json);
    let config = &cli.backend_config;

    let result = match &cli.command {
        Commands::Info => commands::info::run(config, format).await.map(|()| true),
        Commands::List => commands::list::run(config, format).await.map(|()| true),
        Commands::Show(args) => commands::show::run(args, config, format).await.map(|()| true),
        Commands::Bind(args) => commands::bind::run(args, config, format).await.map(|()| true),
        Commands::Unbind(args) => commands::unbind::run(args, config, format)
            .await
            .map(|()| true),
        Commands::Check(args) => commands::check::run(args, config, format).await,
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}
