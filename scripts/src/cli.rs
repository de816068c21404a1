//! Definitions of CLI arguments and commands for deploy scripts

use std::{
    ffi::OsString,
    io,
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{compile, deploy, show_config, verify},
    config::{load_dotenv, ToolchainConfig},
    constants::{
        DEFAULT_ARTIFACTS_PATH, DEFAULT_CONTRACT, DEFAULT_DEPLOYMENTS_PATH,
        DEFAULT_DEPLOY_CONFIRMATIONS, DEFAULT_SOURCES_PATH, SEPOLIA_NETWORK,
    },
    deployer::{setup_client, RpcDeployer},
    errors::ScriptError,
    types::ProjectPaths,
};

/// Compile, deploy, and verify the crowdfunding contracts.
///
/// Network credentials are read from the environment (or a `.env` file).
#[derive(Parser)]
pub struct Cli {
    /// Name of the configured network to use
    #[arg(short, long, env = "DEPLOY_NETWORK", default_value = SEPOLIA_NETWORK)]
    pub network: String,

    /// Directory containing the Solidity sources
    #[arg(long, default_value = DEFAULT_SOURCES_PATH)]
    pub sources_path: PathBuf,

    /// Directory to write compilation artifacts to
    #[arg(long, default_value = DEFAULT_ARTIFACTS_PATH)]
    pub artifacts_path: PathBuf,

    /// Path to the file recording deployed addresses
    #[arg(short, long, default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse the given arguments after loading `.env`, so flags backed by
    /// environment variables see the values it sets
    pub fn try_parse_with_dotenv<I, T>(dotenv: Option<&Path>, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        load_dotenv(dotenv);
        Self::try_parse_from(args)
    }

    /// The filesystem locations given on the command line
    pub fn paths(&self) -> ProjectPaths {
        ProjectPaths {
            sources: self.sources_path.clone(),
            artifacts: self.artifacts_path.clone(),
            deployments: self.deployments_path.clone(),
        }
    }
}

/// The available commands
#[derive(Subcommand)]
pub enum Command {
    /// Compile a contract and publish it to the network
    Deploy(DeployArgs),
    /// Compile a contract without deploying it
    Compile(CompileArgs),
    /// Verify a deployed contract's source on Etherscan
    Verify(VerifyArgs),
    /// Print the loaded configuration with secrets redacted
    Config,
}

impl Command {
    /// Run the command against the given configuration
    pub async fn run(
        self,
        config: &ToolchainConfig,
        paths: &ProjectPaths,
        network: &str,
    ) -> Result<(), ScriptError> {
        match self {
            Command::Deploy(args) => {
                let network = config.resolve_network(network)?;
                let client = setup_client(&network)?;
                let deployer = RpcDeployer::new(client, args.confirmations);

                deploy(
                    &args,
                    config,
                    paths,
                    &network.name,
                    &deployer,
                    &mut io::stdout(),
                )
                .await
                .map(|_| ())
            }
            Command::Compile(args) => compile(&args, config, paths),
            Command::Verify(args) => {
                let network = config.resolve_network(network)?;
                let client = setup_client(&network)?;
                verify(&args, config, paths, &network.name, &client).await
            }
            Command::Config => show_config(config, &mut io::stdout()),
        }
    }
}

/// Deploy a contract
#[derive(Args)]
pub struct DeployArgs {
    /// Name of the contract to deploy
    #[arg(short, long, default_value = DEFAULT_CONTRACT)]
    pub contract: String,

    /// Deploy the existing artifact instead of recompiling
    #[arg(long)]
    pub no_compile: bool,

    /// Number of confirmations to wait for
    #[arg(long, default_value_t = DEFAULT_DEPLOY_CONFIRMATIONS)]
    pub confirmations: u64,
}

/// Compile a contract
#[derive(Args)]
pub struct CompileArgs {
    /// Name of the contract to compile
    #[arg(short, long, default_value = DEFAULT_CONTRACT)]
    pub contract: String,
}

/// Verify a deployed contract
#[derive(Args)]
pub struct VerifyArgs {
    /// Name of the contract to verify
    #[arg(short, long, default_value = DEFAULT_CONTRACT)]
    pub contract: String,

    /// Address of the deployed contract in hex.
    /// Defaults to the address recorded in the deployments file.
    #[arg(short, long)]
    pub address: Option<String>,
}
