//! Source verification with the Etherscan API

use std::time::Duration;

use alloy::transports::http::reqwest::Client;
use alloy_primitives::Address;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    constants::{
        ETHERSCAN_ALREADY_VERIFIED, ETHERSCAN_API_URL, ETHERSCAN_CODE_FORMAT,
        ETHERSCAN_PENDING_RESULT, ETHERSCAN_STATUS_OK, VERIFICATION_MAX_POLLS,
        VERIFICATION_POLL_INTERVAL_MS,
    },
    errors::ScriptError,
};

/// Everything Etherscan needs to match a deployed contract with its source
#[derive(Clone, Debug)]
pub struct VerificationRequest {
    /// The chain the contract is deployed on
    pub chain_id: u64,
    /// The deployed contract's address
    pub address: Address,
    /// The name of the contract within the source file
    pub contract_name: String,
    /// The full Solidity source
    pub source_code: String,
    /// The compiler build, e.g. `v0.8.18+commit.87f61d96`
    pub compiler_version: String,
}

/// The envelope every Etherscan API response comes in
#[derive(Clone, Debug, Deserialize)]
pub struct EtherscanResponse {
    /// `"1"` on success, `"0"` otherwise
    pub status: String,
    /// A short description of the status
    pub message: String,
    /// The payload: a GUID, a status string, or an error
    pub result: String,
}

/// The state of a verification as reported by Etherscan
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationStatus {
    /// The submission has been accepted and is tracked by this GUID
    Submitted(String),
    /// Still waiting in Etherscan's queue
    Pending,
    /// The source was matched
    Verified,
    /// The contract was verified before this request
    AlreadyVerified,
}

impl EtherscanResponse {
    /// Interpret the response to a `verifysourcecode` request
    pub fn submission_status(self) -> Result<VerificationStatus, ScriptError> {
        if self.status == ETHERSCAN_STATUS_OK {
            return Ok(VerificationStatus::Submitted(self.result));
        }

        if is_already_verified(&self.result) {
            Ok(VerificationStatus::AlreadyVerified)
        } else {
            Err(ScriptError::ContractVerification(format!(
                "{}: {}",
                self.message, self.result
            )))
        }
    }

    /// Interpret the response to a `checkverifystatus` request
    pub fn check_status(self) -> Result<VerificationStatus, ScriptError> {
        if self.status == ETHERSCAN_STATUS_OK {
            Ok(VerificationStatus::Verified)
        } else if self.result == ETHERSCAN_PENDING_RESULT {
            Ok(VerificationStatus::Pending)
        } else if is_already_verified(&self.result) {
            Ok(VerificationStatus::AlreadyVerified)
        } else {
            Err(ScriptError::ContractVerification(self.result))
        }
    }
}

/// Whether an Etherscan result string reports a prior verification
fn is_already_verified(result: &str) -> bool {
    result.to_lowercase().contains(ETHERSCAN_ALREADY_VERIFIED)
}

/// A minimal client for the contract verification endpoints
pub struct EtherscanClient {
    /// The HTTP client
    http: Client,
    /// The API base URL
    api_url: String,
    /// The API key
    api_key: String,
}

impl EtherscanClient {
    /// Constructor
    pub fn new(api_key: &str) -> Self {
        Self::with_url(ETHERSCAN_API_URL, api_key)
    }

    /// Construct a client against a non-default API URL
    pub fn with_url(api_url: &str, api_key: &str) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Submit the source for verification and poll until Etherscan reaches a verdict
    pub async fn verify(&self, req: &VerificationRequest) -> Result<(), ScriptError> {
        let guid = match self.submit(req).await? {
            VerificationStatus::Submitted(guid) => guid,
            VerificationStatus::AlreadyVerified => {
                info!("Contract {:#x} is already verified", req.address);
                return Ok(());
            }
            status => {
                return Err(ScriptError::ContractVerification(format!(
                    "unexpected submission status {status:?}"
                )))
            }
        };
        info!("Submitted verification request {guid}");

        for _ in 0..VERIFICATION_MAX_POLLS {
            tokio::time::sleep(Duration::from_millis(VERIFICATION_POLL_INTERVAL_MS)).await;

            match self.check(req.chain_id, &guid).await? {
                VerificationStatus::Pending => continue,
                VerificationStatus::Verified | VerificationStatus::AlreadyVerified => {
                    info!("Contract {:#x} verified", req.address);
                    return Ok(());
                }
                status => {
                    warn!("Unexpected verification status {status:?}");
                }
            }
        }

        Err(ScriptError::ContractVerification(format!(
            "no verdict for {guid} after {VERIFICATION_MAX_POLLS} polls"
        )))
    }

    /// Send the `verifysourcecode` request
    async fn submit(&self, req: &VerificationRequest) -> Result<VerificationStatus, ScriptError> {
        let params = [
            ("apikey", self.api_key.clone()),
            ("module", "contract".to_string()),
            ("action", "verifysourcecode".to_string()),
            ("contractaddress", format!("{:#x}", req.address)),
            ("sourceCode", req.source_code.clone()),
            ("codeformat", ETHERSCAN_CODE_FORMAT.to_string()),
            ("contractname", req.contract_name.clone()),
            ("compilerversion", req.compiler_version.clone()),
            // Sources are compiled without the optimizer
            ("optimizationUsed", "0".to_string()),
            ("runs", "200".to_string()),
            ("constructorArguements", String::new()),
        ];

        let body = self
            .http
            .post(&self.api_url)
            .query(&[("chainid", req.chain_id.to_string())])
            .form(&params)
            .send()
            .await
            .map_err(|e| ScriptError::ContractVerification(e.to_string()))?
            .text()
            .await
            .map_err(|e| ScriptError::ContractVerification(e.to_string()))?;

        parse_response(&body)?.submission_status()
    }

    /// Send the `checkverifystatus` request
    async fn check(&self, chain_id: u64, guid: &str) -> Result<VerificationStatus, ScriptError> {
        let body = self
            .http
            .get(&self.api_url)
            .query(&[
                ("chainid", chain_id.to_string()),
                ("apikey", self.api_key.clone()),
                ("module", "contract".to_string()),
                ("action", "checkverifystatus".to_string()),
                ("guid", guid.to_string()),
            ])
            .send()
            .await
            .map_err(|e| ScriptError::ContractVerification(e.to_string()))?
            .text()
            .await
            .map_err(|e| ScriptError::ContractVerification(e.to_string()))?;

        parse_response(&body)?.check_status()
    }
}

/// Parse the body of an Etherscan API response
pub fn parse_response(body: &str) -> Result<EtherscanResponse, ScriptError> {
    serde_json::from_str(body).map_err(|e| ScriptError::Serde(e.to_string()))
}
