//! Publishing contract bytecode to a network

use std::{future::Future, str::FromStr};

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::{Address, Bytes, TxHash};
use tracing::info;

use crate::{config::ResolvedNetwork, errors::ScriptError, types::DeployedContract};

/// Something that can publish creation bytecode and report where it landed
pub trait ContractDeployer {
    /// Send a deployment transaction and wait for it to be confirmed
    fn deploy(
        &self,
        creation_code: Bytes,
    ) -> impl Future<Output = Result<DeployedContract, ScriptError>> + Send;
}

/// Sets up a signing client for the given network.
///
/// The chain ID is fetched lazily, so this does not touch the network.
pub fn setup_client(network: &ResolvedNetwork) -> Result<DynProvider, ScriptError> {
    let signer = PrivateKeySigner::from_str(&network.priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let url = Url::parse(&network.rpc_url)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .on_http(url);

    Ok(DynProvider::new(provider))
}

/// Deploys contracts through a JSON-RPC provider with an attached wallet
pub struct RpcDeployer {
    /// The signing provider
    provider: DynProvider,
    /// The number of confirmations to wait for
    confirmations: u64,
}

impl RpcDeployer {
    /// Constructor
    pub fn new(provider: DynProvider, confirmations: u64) -> Self {
        Self {
            provider,
            confirmations,
        }
    }
}

impl ContractDeployer for RpcDeployer {
    async fn deploy(&self, creation_code: Bytes) -> Result<DeployedContract, ScriptError> {
        let tx = TransactionRequest::default().with_deploy_code(creation_code);

        let pending_tx = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        let tx_hash = *pending_tx.tx_hash();
        info!("Sent deployment transaction {tx_hash:#x}");

        let receipt = pending_tx
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        deployed_contract(tx_hash, receipt.status(), receipt.contract_address)
    }
}

/// Interpret a deployment receipt, rejecting reverted transactions and
/// receipts without a created contract
pub fn deployed_contract(
    tx_hash: TxHash,
    succeeded: bool,
    contract_address: Option<Address>,
) -> Result<DeployedContract, ScriptError> {
    if !succeeded {
        return Err(ScriptError::ContractDeployment(format!(
            "transaction {tx_hash:#x} reverted"
        )));
    }

    let address = contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment(format!(
            "receipt for {tx_hash:#x} has no contract address"
        ))
    })?;

    Ok(DeployedContract { address, tx_hash })
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, b256, Address, TxHash};

    use super::{deployed_contract, setup_client};
    use crate::{config::ResolvedNetwork, errors::ScriptError};

    const TX_HASH: TxHash =
        b256!("9b7bb827c2e5e3c1a0a44dc53e573aa0b3af3bd1f9f5ed03071b100bb039eaff");
    const ADDR: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");

    fn network(rpc_url: &str, priv_key: &str) -> ResolvedNetwork {
        ResolvedNetwork {
            name: "sepolia".to_string(),
            rpc_url: rpc_url.to_string(),
            priv_key: priv_key.to_string(),
        }
    }

    #[test]
    fn test_setup_client() {
        let res = setup_client(&network(
            "http://localhost:8545",
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        ));
        assert!(res.is_ok());
    }

    #[test]
    fn test_setup_client_bad_key() {
        let res = setup_client(&network("http://localhost:8545", "not-a-key"));
        assert!(matches!(res, Err(ScriptError::ClientInitialization(_))));
    }

    #[test]
    fn test_setup_client_bad_url() {
        let res = setup_client(&network(
            "not a url",
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        ));
        assert!(matches!(res, Err(ScriptError::ClientInitialization(_))));
    }

    #[test]
    fn test_reverted_deployment() {
        let res = deployed_contract(TX_HASH, false, Some(ADDR));
        match res {
            Err(ScriptError::ContractDeployment(msg)) => assert!(msg.contains("reverted")),
            _ => panic!("expected a deployment error"),
        }
    }

    #[test]
    fn test_receipt_without_contract_address() {
        let res = deployed_contract(TX_HASH, true, None);
        match res {
            Err(ScriptError::ContractDeployment(msg)) => {
                assert!(msg.contains("no contract address"))
            }
            _ => panic!("expected a deployment error"),
        }
    }

    #[test]
    fn test_successful_deployment() {
        let contract = deployed_contract(TX_HASH, true, Some(ADDR)).unwrap();
        assert_eq!(contract.address, ADDR);
        assert_eq!(contract.tx_hash, TX_HASH);
    }
}
