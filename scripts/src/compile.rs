//! Compilation of Solidity sources via the `solc` binary

use std::{
    env,
    path::{Path, PathBuf},
    process::Command,
};

use alloy_primitives::hex;
use serde_json::Value;
use tracing::info;

use crate::{
    artifacts::{write_artifact, ContractArtifact},
    config::ToolchainConfig,
    constants::{
        COMBINED_JSON_OUTPUTS, SOLC_COMMAND, SOLC_ENV_VAR, SOLC_VERSION_PREFIX, SOLIDITY_EXTENSION,
    },
    errors::ScriptError,
};

/// The version reported by a `solc` binary
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolcVersion {
    /// The semantic version, e.g. `0.8.18`
    pub version: String,
    /// The full build identifier in block explorer form, e.g. `v0.8.18+commit.87f61d96`
    pub long_version: String,
}

/// The `solc` binary to invoke, honoring the `SOLC` override
pub fn solc_command() -> String {
    env::var(SOLC_ENV_VAR).unwrap_or_else(|_| SOLC_COMMAND.to_string())
}

/// Run the given command, returning its stdout if it exits successfully
fn command_output_or(mut cmd: Command, err_msg: &str) -> Result<String, ScriptError> {
    let output = cmd
        .output()
        .map_err(|e| ScriptError::ContractCompilation(format!("{err_msg}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ScriptError::ContractCompilation(format!(
            "{err_msg}: {}",
            stderr.trim()
        )));
    }

    String::from_utf8(output.stdout).map_err(|e| ScriptError::ContractCompilation(e.to_string()))
}

/// Parse the output of `solc --version`
pub fn parse_solc_version(output: &str) -> Result<SolcVersion, ScriptError> {
    let full = output
        .lines()
        .find_map(|line| line.trim().strip_prefix(SOLC_VERSION_PREFIX))
        .ok_or_else(|| {
            ScriptError::ContractCompilation("could not find solc version line".to_string())
        })?;

    let (version, build) = full.split_once('+').unwrap_or((full, ""));
    let long_version = match build.strip_prefix("commit.") {
        Some(rest) => {
            let commit = rest.split('.').next().unwrap_or_default();
            format!("v{version}+commit.{commit}")
        }
        None => format!("v{version}"),
    };

    Ok(SolcVersion {
        version: version.to_string(),
        long_version,
    })
}

/// Query the version of the `solc` binary on this machine
pub fn installed_solc_version() -> Result<SolcVersion, ScriptError> {
    let mut cmd = Command::new(solc_command());
    cmd.arg("--version");

    let output = command_output_or(cmd, "Failed to query solc version")?;
    parse_solc_version(&output)
}

/// Extract a single contract's artifact from `solc --combined-json` output
pub fn parse_combined_json(
    output: &str,
    source_name: &str,
    contract_name: &str,
) -> Result<ContractArtifact, ScriptError> {
    let parsed: Value =
        serde_json::from_str(output).map_err(|e| ScriptError::Serde(e.to_string()))?;

    let suffix = format!(":{contract_name}");
    let contract = parsed["contracts"]
        .as_object()
        .and_then(|contracts| {
            contracts
                .iter()
                .find(|(key, _)| key.ends_with(&suffix))
                .map(|(_, v)| v)
        })
        .ok_or_else(|| {
            ScriptError::ContractCompilation(format!(
                "`{contract_name}` not found in compiler output"
            ))
        })?;

    // Older compilers emit the ABI as a JSON-encoded string
    let abi = match &contract["abi"] {
        Value::String(s) => serde_json::from_str(s).map_err(|e| ScriptError::Serde(e.to_string()))?,
        Value::Null => {
            return Err(ScriptError::ContractCompilation(
                "compiler output has no ABI".to_string(),
            ))
        }
        abi => abi.clone(),
    };

    let decode_field = |field: &str| -> Result<Vec<u8>, ScriptError> {
        let encoded = contract[field].as_str().ok_or_else(|| {
            ScriptError::ContractCompilation(format!("compiler output has no `{field}`"))
        })?;
        hex::decode(encoded).map_err(|e| ScriptError::ContractCompilation(e.to_string()))
    };

    Ok(ContractArtifact::new(
        contract_name,
        source_name,
        abi,
        &decode_field("bin")?,
        &decode_field("bin-runtime")?,
    ))
}

/// Compiles `<sources>/<Name>.sol` with the configured compiler version and
/// writes its artifact, returning the artifact path.
///
/// Assumes a `solc` binary of the configured version is available.
pub fn compile_contract(
    config: &ToolchainConfig,
    sources_dir: &Path,
    artifacts_dir: &Path,
    contract_name: &str,
) -> Result<PathBuf, ScriptError> {
    let expected_version = config.solidity_version()?;

    let solc_version = installed_solc_version()?;
    if solc_version.version != expected_version {
        return Err(ScriptError::ContractCompilation(format!(
            "configured solc {expected_version}, found {}",
            solc_version.version
        )));
    }

    let source_path = sources_dir.join(format!("{contract_name}.{SOLIDITY_EXTENSION}"));
    let source_name = source_path.to_string_lossy().to_string();
    info!("Compiling {source_name} with solc {}", solc_version.long_version);

    let mut build_cmd = Command::new(solc_command());
    build_cmd.arg("--combined-json");
    build_cmd.arg(COMBINED_JSON_OUTPUTS);
    build_cmd.arg(&source_path);

    let output = command_output_or(build_cmd, "Failed to compile contract")?;
    let artifact = parse_combined_json(&output, &source_name, contract_name)?;

    write_artifact(artifacts_dir, &artifact)
}
