//! Implementations of the various deploy scripts

use std::{fs, io::Write, str::FromStr};

use alloy::providers::Provider;
use alloy_primitives::Address;
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    artifacts::read_artifact,
    cli::{CompileArgs, DeployArgs, VerifyArgs},
    compile::{compile_contract, installed_solc_version},
    config::ToolchainConfig,
    constants::SOLIDITY_EXTENSION,
    deployer::ContractDeployer,
    errors::ScriptError,
    types::{DeploymentResult, ProjectPaths},
    utils::{
        load_deployments, network_deployments, parse_addr_from_deployments_file,
        save_deployments,
    },
    verify::{EtherscanClient, VerificationRequest},
};

/// Compiles the contract (unless told not to), publishes it through the given
/// deployer, prints its address, and records it in the deployments file
pub async fn deploy<D: ContractDeployer>(
    args: &DeployArgs,
    config: &ToolchainConfig,
    paths: &ProjectPaths,
    network: &str,
    deployer: &D,
    out: &mut impl Write,
) -> Result<DeploymentResult, ScriptError> {
    if args.no_compile {
        warn!("Skipping compilation, deploying existing artifact");
    } else {
        compile_contract(config, &paths.sources, &paths.artifacts, &args.contract)?;
    }

    let artifact = read_artifact(&paths.artifacts, &args.contract)?;
    let creation_code = artifact.creation_code()?;

    // A malformed deployments file must surface before anything goes on-chain
    let mut deployments = load_deployments(&paths.deployments)?;
    network_deployments(&mut deployments, network)?;

    info!("Deploying `{}` to {network}", args.contract);
    let contract = deployer.deploy(creation_code).await?;

    writeln!(out, "Contract address: {}", contract.address)
        .map_err(|e| ScriptError::Output(e.to_string()))?;

    // The contract is live at this point, so recording it is best effort
    let recorded = network_deployments(&mut deployments, network)
        .map(|entries| {
            entries.insert(
                args.contract.clone(),
                Value::String(format!("{:#x}", contract.address)),
            );
        })
        .and_then(|_| save_deployments(&paths.deployments, &deployments));
    if let Err(e) = recorded {
        warn!("Failed to record deployment in {}: {e}", paths.deployments.display());
    }

    Ok(DeploymentResult {
        contract_name: args.contract.clone(),
        network: network.to_string(),
        contract,
    })
}

/// Compile a contract and write its artifact
pub fn compile(
    args: &CompileArgs,
    config: &ToolchainConfig,
    paths: &ProjectPaths,
) -> Result<(), ScriptError> {
    let artifact_path = compile_contract(config, &paths.sources, &paths.artifacts, &args.contract)?;
    info!("Wrote artifact to {}", artifact_path.display());

    Ok(())
}

/// Verify a deployed contract's source on Etherscan, looking up its address in
/// the deployments file when none is given
pub async fn verify(
    args: &VerifyArgs,
    config: &ToolchainConfig,
    paths: &ProjectPaths,
    network: &str,
    client: &impl Provider,
) -> Result<(), ScriptError> {
    let api_key = config.etherscan_api_key()?;

    let address = match &args.address {
        Some(address) => Address::from_str(address)
            .map_err(|e| ScriptError::ContractVerification(e.to_string()))?,
        None => parse_addr_from_deployments_file(&paths.deployments, network, &args.contract)?,
    };

    let source_path = paths
        .sources
        .join(format!("{}.{SOLIDITY_EXTENSION}", args.contract));
    let source_code = fs::read_to_string(&source_path).map_err(|e| {
        ScriptError::ContractVerification(format!("{}: {e}", source_path.display()))
    })?;

    let expected_version = config.solidity_version()?;
    let solc_version = installed_solc_version()?;
    if solc_version.version != expected_version {
        return Err(ScriptError::ContractVerification(format!(
            "configured solc {expected_version}, found {}",
            solc_version.version
        )));
    }

    let chain_id = client
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    info!("Verifying `{}` at {address:#x} on chain {chain_id}", args.contract);
    let request = VerificationRequest {
        chain_id,
        address,
        contract_name: args.contract.clone(),
        source_code,
        compiler_version: solc_version.long_version,
    };

    EtherscanClient::new(api_key).verify(&request).await
}

/// Print the configuration as JSON with credentials redacted
pub fn show_config(config: &ToolchainConfig, out: &mut impl Write) -> Result<(), ScriptError> {
    let json = serde_json::to_string_pretty(&config.redacted())
        .map_err(|e| ScriptError::Serde(e.to_string()))?;

    writeln!(out, "{json}").map_err(|e| ScriptError::Output(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use alloy_primitives::{address, b256, Bytes};
    use serde_json::json;

    use super::{deploy, show_config};
    use crate::{
        artifacts::{write_artifact, ContractArtifact},
        cli::DeployArgs,
        config::ToolchainConfig,
        deployer::ContractDeployer,
        errors::ScriptError,
        types::{DeployedContract, ProjectPaths},
        utils::parse_addr_from_deployments_file,
    };

    const CONTRACT: &str = "MultiCrowdfunding";

    /// A deployer that returns a canned result and counts its invocations
    struct MockDeployer {
        result: Result<DeployedContract, String>,
        calls: AtomicUsize,
    }

    impl MockDeployer {
        fn succeeding() -> Self {
            Self {
                result: Ok(DeployedContract {
                    address: address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
                    tx_hash: b256!(
                        "1111111111111111111111111111111111111111111111111111111111111111"
                    ),
                }),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(msg: &str) -> Self {
            Self {
                result: Err(msg.to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ContractDeployer for MockDeployer {
        async fn deploy(&self, creation_code: Bytes) -> Result<DeployedContract, ScriptError> {
            assert!(!creation_code.is_empty());
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(ScriptError::ContractDeployment)
        }
    }

    fn setup_project() -> (tempfile::TempDir, ProjectPaths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths {
            sources: dir.path().join("contracts"),
            artifacts: dir.path().join("artifacts"),
            deployments: dir.path().join("deployments.json"),
        };

        let artifact = ContractArtifact::new(
            CONTRACT,
            "contracts/MultiCrowdfunding.sol",
            json!([]),
            &[0x60, 0x80, 0x60, 0x40, 0x52],
            &[0x60, 0x80],
        );
        write_artifact(&paths.artifacts, &artifact).unwrap();

        (dir, paths)
    }

    fn deploy_args(no_compile: bool) -> DeployArgs {
        DeployArgs {
            contract: CONTRACT.to_string(),
            no_compile,
            confirmations: 1,
        }
    }

    fn is_contract_address_line(line: &str) -> bool {
        let Some(hex) = line.strip_prefix("Contract address: 0x") else {
            return false;
        };
        hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit())
    }

    #[tokio::test]
    async fn test_deploy_prints_address() {
        let (_dir, paths) = setup_project();
        let config = ToolchainConfig::from_lookup(|_| None);
        let deployer = MockDeployer::succeeding();
        let mut out = Vec::new();

        let res = deploy(&deploy_args(true), &config, &paths, "sepolia", &deployer, &mut out)
            .await
            .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.lines().count(), 1);
        assert!(is_contract_address_line(printed.trim_end()), "{printed}");
        assert_eq!(deployer.calls.load(Ordering::SeqCst), 1);

        let recorded = parse_addr_from_deployments_file(&paths.deployments, "sepolia", CONTRACT)
            .unwrap();
        assert_eq!(recorded, res.contract.address);
    }

    #[tokio::test]
    async fn test_deploy_failure_propagates() {
        let (_dir, paths) = setup_project();
        let config = ToolchainConfig::from_lookup(|_| None);
        let deployer = MockDeployer::failing("insufficient funds for gas * price + value");
        let mut out = Vec::new();

        let res = deploy(&deploy_args(true), &config, &paths, "sepolia", &deployer, &mut out).await;

        assert!(matches!(res, Err(ScriptError::ContractDeployment(_))));
        assert!(out.is_empty());
        assert!(!paths.deployments.exists());
    }

    #[tokio::test]
    async fn test_missing_compiler_version_blocks_deploy() {
        let (_dir, paths) = setup_project();
        let mut config = ToolchainConfig::from_lookup(|_| None);
        config.solidity.version = None;
        let deployer = MockDeployer::succeeding();
        let mut out = Vec::new();

        let res = deploy(&deploy_args(false), &config, &paths, "sepolia", &deployer, &mut out).await;

        assert!(matches!(res, Err(ScriptError::MissingConfig(_))));
        assert_eq!(deployer.calls.load(Ordering::SeqCst), 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_deployments_file_blocks_deploy() {
        let (_dir, paths) = setup_project();
        std::fs::write(&paths.deployments, "[]").unwrap();
        let config = ToolchainConfig::from_lookup(|_| None);
        let deployer = MockDeployer::succeeding();
        let mut out = Vec::new();

        let res = deploy(&deploy_args(true), &config, &paths, "sepolia", &deployer, &mut out).await;

        assert!(matches!(res, Err(ScriptError::ReadDeployments(_))));
        assert_eq!(deployer.calls.load(Ordering::SeqCst), 0);
        assert!(out.is_empty());
        assert_eq!(std::fs::read_to_string(&paths.deployments).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_unwritable_deployments_file_still_succeeds() {
        let (dir, mut paths) = setup_project();
        paths.deployments = dir.path().join("missing-dir").join("deployments.json");
        let config = ToolchainConfig::from_lookup(|_| None);
        let deployer = MockDeployer::succeeding();
        let mut out = Vec::new();

        let res = deploy(&deploy_args(true), &config, &paths, "sepolia", &deployer, &mut out).await;

        assert!(res.is_ok());
        assert_eq!(deployer.calls.load(Ordering::SeqCst), 1);
        assert!(is_contract_address_line(String::from_utf8(out).unwrap().trim_end()));
        assert!(!paths.deployments.exists());
    }

    #[tokio::test]
    async fn test_deploy_missing_artifact() {
        let (_dir, paths) = setup_project();
        let config = ToolchainConfig::from_lookup(|_| None);
        let deployer = MockDeployer::succeeding();
        let args = DeployArgs {
            contract: "Unknown".to_string(),
            no_compile: true,
            confirmations: 1,
        };

        let res = deploy(&args, &config, &paths, "sepolia", &deployer, &mut Vec::new()).await;

        assert!(matches!(res, Err(ScriptError::ArtifactParsing(_))));
        assert_eq!(deployer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_show_config_is_redacted_json() {
        let config = ToolchainConfig::from_lookup(|key| match key {
            "INFURA_RPC" => Some("https://sepolia.infura.io/v3/secret-project-id".to_string()),
            _ => Some(format!("secret-{key}")),
        });
        let mut out = Vec::new();

        show_config(&config, &mut out).unwrap();

        let printed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed["solidity"]["version"], "0.8.18");
        assert_eq!(
            printed["networks"]["sepolia"]["url"],
            "https://sepolia.infura.io/v3/<redacted>"
        );
        assert!(!String::from_utf8_lossy(&out).contains("secret"));
        assert_eq!(printed["networks"]["sepolia"]["accounts"][0], "<redacted>");
        assert_eq!(printed["etherscan"]["api_key"], "<redacted>");
    }
}
