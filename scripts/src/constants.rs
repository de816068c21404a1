//! Constants used in the deploy scripts

/// The Solidity compiler version the contracts are written against
pub const SOLIDITY_VERSION: &str = "0.8.18";

/// The name of the only network configured for deployment
pub const SEPOLIA_NETWORK: &str = "sepolia";

/// The contract deployed when no other is given on the command line
pub const DEFAULT_CONTRACT: &str = "MultiCrowdfunding";

/// The environment variable holding the Sepolia RPC endpoint URL
pub const RPC_URL_ENV_VAR: &str = "INFURA_RPC";

/// The environment variable holding the Sepolia deployer private key
pub const PRIVATE_KEY_ENV_VAR: &str = "SEPOLIA_PRIVATE_KEY";

/// The environment variable holding the Etherscan API key
pub const ETHERSCAN_API_KEY_ENV_VAR: &str = "API_KEY";

/// The environment variable used to override the `solc` binary
pub const SOLC_ENV_VAR: &str = "SOLC";

/// The default name of the Solidity compiler binary
pub const SOLC_COMMAND: &str = "solc";

/// The outputs requested from `solc --combined-json`
pub const COMBINED_JSON_OUTPUTS: &str = "abi,bin,bin-runtime";

/// The prefix of the version line printed by `solc --version`
pub const SOLC_VERSION_PREFIX: &str = "Version: ";

/// The extension of Solidity source files
pub const SOLIDITY_EXTENSION: &str = "sol";

/// The extension of artifact files
pub const JSON_EXTENSION: &str = "json";

/// The format tag written into every artifact
pub const ARTIFACT_FORMAT: &str = "hh-sol-artifact-1";

/// The subdirectory of the artifacts directory holding contract artifacts
pub const ARTIFACT_CONTRACTS_SEGMENT: &str = "contracts";

/// The default directory holding Solidity sources
pub const DEFAULT_SOURCES_PATH: &str = "contracts";

/// The default directory holding compilation artifacts
pub const DEFAULT_ARTIFACTS_PATH: &str = "artifacts";

/// The default path of the deployments ledger
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The deployments key in the `deployments.json` file
pub const DEPLOYMENTS_KEY: &str = "deployments";

/// The default number of confirmations to wait for the deployment transaction
pub const DEFAULT_DEPLOY_CONFIRMATIONS: u64 = 1;

/// The placeholder shown in place of secrets when printing the configuration
pub const REDACTED: &str = "<redacted>";

/// The Etherscan v2 API endpoint, shared by all supported chains
pub const ETHERSCAN_API_URL: &str = "https://api.etherscan.io/v2/api";

/// The source format submitted to Etherscan
pub const ETHERSCAN_CODE_FORMAT: &str = "solidity-single-file";

/// The status value Etherscan uses for a successful request
pub const ETHERSCAN_STATUS_OK: &str = "1";

/// The result Etherscan reports while a verification is still queued
pub const ETHERSCAN_PENDING_RESULT: &str = "Pending in queue";

/// The substring Etherscan uses to report an already-verified contract
pub const ETHERSCAN_ALREADY_VERIFIED: &str = "already verified";

/// The maximum number of times to poll Etherscan for a verification result
pub const VERIFICATION_MAX_POLLS: usize = 10;

/// The delay between verification status polls, in milliseconds
pub const VERIFICATION_POLL_INTERVAL_MS: u64 = 3_000;
