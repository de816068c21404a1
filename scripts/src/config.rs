//! The toolchain configuration: compiler version, networks, and block explorer credentials.
//!
//! Loading reads the environment verbatim. Unset variables are kept as `None`
//! and only become errors when a command needs them.

use std::{collections::BTreeMap, path::Path};

use alloy::transports::http::reqwest::Url;
use serde::Serialize;

use crate::{
    constants::{
        ETHERSCAN_API_KEY_ENV_VAR, PRIVATE_KEY_ENV_VAR, REDACTED, RPC_URL_ENV_VAR,
        SEPOLIA_NETWORK, SOLIDITY_VERSION,
    },
    errors::ScriptError,
};

/// Load variables from the given `.env` file, or from `.env` in the working
/// directory or its parents when none is given.
///
/// Variables already set in the process environment take precedence.
pub fn load_dotenv(path: Option<&Path>) {
    let res = match path {
        Some(path) => dotenvy::from_path(path).map(|_| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };

    match res {
        Ok(path) => tracing::debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("failed to load .env: {e}"),
    }
}

/// Settings consumed by the compile, deploy, and verify commands
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ToolchainConfig {
    /// Solidity compiler settings
    pub solidity: SolidityConfig,
    /// Connection parameters, keyed by network name
    pub networks: BTreeMap<String, NetworkConfig>,
    /// Block explorer settings
    pub etherscan: EtherscanConfig,
}

/// Solidity compiler settings
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SolidityConfig {
    /// The semantic version of `solc` to compile with
    pub version: Option<String>,
}

/// Connection parameters for a single network
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NetworkConfig {
    /// The RPC endpoint URL
    pub url: Option<String>,
    /// Signing credentials, in order; the first one deploys
    pub accounts: Vec<Option<String>>,
}

/// Block explorer settings
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EtherscanConfig {
    /// The Etherscan API key
    pub api_key: Option<String>,
}

/// A network whose URL and deployer key are both present
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedNetwork {
    /// The name of the network
    pub name: String,
    /// The RPC endpoint URL
    pub rpc_url: String,
    /// The deployer's private key
    pub priv_key: String,
}

impl ToolchainConfig {
    /// Load the configuration from the process environment, reading a `.env`
    /// file in the working directory first if one exists
    pub fn from_env() -> Self {
        load_dotenv(None);
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let sepolia = NetworkConfig {
            url: lookup(RPC_URL_ENV_VAR),
            accounts: vec![lookup(PRIVATE_KEY_ENV_VAR)],
        };

        ToolchainConfig {
            solidity: SolidityConfig {
                version: Some(SOLIDITY_VERSION.to_string()),
            },
            networks: BTreeMap::from([(SEPOLIA_NETWORK.to_string(), sepolia)]),
            etherscan: EtherscanConfig {
                api_key: lookup(ETHERSCAN_API_KEY_ENV_VAR),
            },
        }
    }

    /// The configured compiler version
    pub fn solidity_version(&self) -> Result<&str, ScriptError> {
        self.solidity
            .version
            .as_deref()
            .ok_or_else(|| ScriptError::MissingConfig("solidity compiler version".to_string()))
    }

    /// The configured Etherscan API key
    pub fn etherscan_api_key(&self) -> Result<&str, ScriptError> {
        self.etherscan.api_key.as_deref().ok_or_else(|| {
            ScriptError::MissingConfig(format!(
                "etherscan API key (set {ETHERSCAN_API_KEY_ENV_VAR})"
            ))
        })
    }

    /// Look up a network by name, requiring its URL and first account to be set
    pub fn resolve_network(&self, name: &str) -> Result<ResolvedNetwork, ScriptError> {
        let network = self
            .networks
            .get(name)
            .ok_or_else(|| ScriptError::MissingConfig(format!("network `{name}`")))?;

        let rpc_url = network
            .url
            .clone()
            .ok_or_else(|| ScriptError::MissingConfig(format!("RPC URL for network `{name}`")))?;

        let priv_key = network
            .accounts
            .first()
            .cloned()
            .flatten()
            .ok_or_else(|| {
                ScriptError::MissingConfig(format!("deployer account for network `{name}`"))
            })?;

        Ok(ResolvedNetwork {
            name: name.to_string(),
            rpc_url,
            priv_key,
        })
    }

    /// A copy of the configuration with credentials masked, for display
    pub fn redacted(&self) -> Self {
        let mask = |secret: &Option<String>| secret.as_ref().map(|_| REDACTED.to_string());

        let networks = self
            .networks
            .iter()
            .map(|(name, network)| {
                let redacted = NetworkConfig {
                    url: network.url.as_deref().map(redact_url),
                    accounts: network.accounts.iter().map(mask).collect(),
                };
                (name.clone(), redacted)
            })
            .collect();

        ToolchainConfig {
            solidity: self.solidity.clone(),
            networks,
            etherscan: EtherscanConfig {
                api_key: mask(&self.etherscan.api_key),
            },
        }
    }
}

/// Mask the parts of an RPC URL that can carry credentials: the user info,
/// the query, and the last path segment (where providers put project keys)
fn redact_url(raw: &str) -> String {
    let Ok(url) = Url::parse(raw) else {
        return REDACTED.to_string();
    };
    let Some(host) = url.host_str() else {
        return REDACTED.to_string();
    };

    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    let mut segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    if let Some(last) = segments.last_mut() {
        *last = REDACTED;
    }
    let path: String = segments.iter().map(|s| format!("/{s}")).collect();

    format!("{}://{host}{port}{path}", url.scheme())
}
