//! Reading and writing compilation artifacts.
//!
//! Artifacts live at `<artifacts>/contracts/<Name>.sol/<Name>.json`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy_primitives::{hex, Bytes};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    constants::{ARTIFACT_CONTRACTS_SEGMENT, ARTIFACT_FORMAT, JSON_EXTENSION, SOLIDITY_EXTENSION},
    errors::ScriptError,
};

/// The compiled form of a single contract
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    /// The artifact format tag
    #[serde(rename = "_format")]
    pub format: String,
    /// The name of the contract
    pub contract_name: String,
    /// The path of the source file the contract was compiled from
    pub source_name: String,
    /// The contract ABI
    pub abi: Value,
    /// The creation bytecode, `0x`-prefixed hex
    pub bytecode: String,
    /// The runtime bytecode, `0x`-prefixed hex
    pub deployed_bytecode: String,
}

impl ContractArtifact {
    /// Construct an artifact from compiler output
    pub fn new(
        contract_name: &str,
        source_name: &str,
        abi: Value,
        bytecode: &[u8],
        deployed_bytecode: &[u8],
    ) -> Self {
        ContractArtifact {
            format: ARTIFACT_FORMAT.to_string(),
            contract_name: contract_name.to_string(),
            source_name: source_name.to_string(),
            abi,
            bytecode: hex::encode_prefixed(bytecode),
            deployed_bytecode: hex::encode_prefixed(deployed_bytecode),
        }
    }

    /// Decode the creation bytecode, rejecting unlinked or empty code
    pub fn creation_code(&self) -> Result<Bytes, ScriptError> {
        let code = hex::decode(&self.bytecode)
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

        if code.is_empty() {
            // Abstract contracts and interfaces compile to empty bytecode
            return Err(ScriptError::ArtifactParsing(format!(
                "`{}` has no creation bytecode",
                self.contract_name
            )));
        }

        Ok(Bytes::from(code))
    }
}

/// The path of the artifact for the given contract
pub fn artifact_path(artifacts_dir: &Path, contract_name: &str) -> PathBuf {
    artifacts_dir
        .join(ARTIFACT_CONTRACTS_SEGMENT)
        .join(format!("{contract_name}.{SOLIDITY_EXTENSION}"))
        .join(format!("{contract_name}.{JSON_EXTENSION}"))
}

/// Read the artifact for the given contract
pub fn read_artifact(
    artifacts_dir: &Path,
    contract_name: &str,
) -> Result<ContractArtifact, ScriptError> {
    let path = artifact_path(artifacts_dir, contract_name);
    let contents = fs::read_to_string(&path)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))?;

    serde_json::from_str(&contents).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))
}

/// Write an artifact, creating its parent directories, and return its path
pub fn write_artifact(
    artifacts_dir: &Path,
    artifact: &ContractArtifact,
) -> Result<PathBuf, ScriptError> {
    let path = artifact_path(artifacts_dir, &artifact.contract_name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ScriptError::ArtifactWriting(e.to_string()))?;
    }

    let contents =
        serde_json::to_string_pretty(artifact).map_err(|e| ScriptError::Serde(e.to_string()))?;
    fs::write(&path, contents).map_err(|e| ScriptError::ArtifactWriting(e.to_string()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{artifact_path, read_artifact, write_artifact, ContractArtifact};
    use crate::errors::ScriptError;

    #[test]
    fn test_artifact_path_layout() {
        let path = artifact_path("artifacts".as_ref(), "MultiCrowdfunding");
        assert_eq!(
            path,
            std::path::PathBuf::from(
                "artifacts/contracts/MultiCrowdfunding.sol/MultiCrowdfunding.json"
            )
        );
    }

    #[test]
    fn test_artifact_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ContractArtifact::new(
            "MultiCrowdfunding",
            "contracts/MultiCrowdfunding.sol",
            json!([{ "type": "constructor", "inputs": [] }]),
            &[0x60, 0x80, 0x60, 0x40],
            &[0x60, 0x80],
        );

        write_artifact(dir.path(), &artifact).unwrap();
        let read = read_artifact(dir.path(), "MultiCrowdfunding").unwrap();

        assert_eq!(read, artifact);
        assert_eq!(read.bytecode, "0x60806040");
        assert_eq!(read.creation_code().unwrap().to_vec(), vec![0x60, 0x80, 0x60, 0x40]);

        // Field names follow the camelCase artifact layout
        let raw = std::fs::read_to_string(artifact_path(dir.path(), "MultiCrowdfunding")).unwrap();
        assert!(raw.contains("\"_format\": \"hh-sol-artifact-1\""));
        assert!(raw.contains("\"deployedBytecode\""));
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_artifact(dir.path(), "Nope"),
            Err(ScriptError::ArtifactParsing(_))
        ));
    }

    #[test]
    fn test_empty_bytecode_rejected() {
        let artifact = ContractArtifact::new("IFoo", "contracts/IFoo.sol", json!([]), &[], &[]);
        assert!(matches!(
            artifact.creation_code(),
            Err(ScriptError::ArtifactParsing(_))
        ));
    }
}
