use std::{env, io, process::ExitCode};

use scripts::{cli::Cli, config::ToolchainConfig, utils::exit_status};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::try_parse_with_dotenv(None, env::args_os()).unwrap_or_else(|e| e.exit());

    // Logs go to stderr so stdout only carries command output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .pretty()
        .init();

    let config = ToolchainConfig::from_env();
    let paths = cli.paths();
    let Cli {
        network, command, ..
    } = cli;

    let res = command.run(&config, &paths, &network).await;
    ExitCode::from(exit_status(res, &mut io::stderr()))
}
