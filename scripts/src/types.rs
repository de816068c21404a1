//! Type definitions used throughout the scripts

use std::path::PathBuf;

use alloy_primitives::{Address, TxHash};

/// The filesystem locations a command reads from and writes to
#[derive(Clone, Debug)]
pub struct ProjectPaths {
    /// The directory holding Solidity sources
    pub sources: PathBuf,
    /// The directory holding compilation artifacts
    pub artifacts: PathBuf,
    /// The deployments ledger file
    pub deployments: PathBuf,
}

/// A contract published by a deployment transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeployedContract {
    /// The address assigned to the contract
    pub address: Address,
    /// The hash of the deployment transaction
    pub tx_hash: TxHash,
}

/// The outcome of a single run of the deploy command
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentResult {
    /// The name of the deployed contract
    pub contract_name: String,
    /// The network the contract was deployed to
    pub network: String,
    /// The deployed contract
    pub contract: DeployedContract,
}
