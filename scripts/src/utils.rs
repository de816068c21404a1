//! Utilities for the deploy scripts.

use std::{fmt::Display, fs, io::Write, path::Path, str::FromStr};

use alloy_primitives::Address;
use serde_json::{Map, Value};

use crate::{constants::DEPLOYMENTS_KEY, errors::ScriptError};

/// Parse a JSON file into a `serde_json` value
pub fn get_json_from_file(file_path: &Path) -> Result<Value, ScriptError> {
    let file_contents =
        fs::read_to_string(file_path).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;

    serde_json::from_str(&file_contents).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

/// Read a contract's address on the given network from the deployments file
pub fn parse_addr_from_deployments_file(
    file_path: &Path,
    network: &str,
    contract_name: &str,
) -> Result<Address, ScriptError> {
    let parsed_json = get_json_from_file(file_path)?;

    Address::from_str(
        parsed_json[DEPLOYMENTS_KEY][network][contract_name]
            .as_str()
            .ok_or_else(|| {
                ScriptError::ReadDeployments(format!(
                    "no address for `{contract_name}` on `{network}`"
                ))
            })?,
    )
    .map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

/// Load the deployments file, treating a missing file as empty.
///
/// The top level must be a JSON object.
pub fn load_deployments(file_path: &Path) -> Result<Value, ScriptError> {
    if !file_path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let parsed_json = get_json_from_file(file_path)?;
    if !parsed_json.is_object() {
        return Err(ScriptError::ReadDeployments(format!(
            "{} is not a JSON object",
            file_path.display()
        )));
    }

    Ok(parsed_json)
}

/// The entries for the given network, created if absent
pub fn network_deployments<'a>(
    deployments: &'a mut Value,
    network: &str,
) -> Result<&'a mut Map<String, Value>, ScriptError> {
    let not_an_object =
        |key: &str| ScriptError::WriteDeployments(format!("`{key}` is not an object"));

    deployments
        .as_object_mut()
        .ok_or_else(|| not_an_object("deployments file"))?
        .entry(DEPLOYMENTS_KEY)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| not_an_object(DEPLOYMENTS_KEY))?
        .entry(network)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| not_an_object(network))
}

/// Write the deployments file
pub fn save_deployments(file_path: &Path, deployments: &Value) -> Result<(), ScriptError> {
    let contents = serde_json::to_string_pretty(deployments)
        .map_err(|e| ScriptError::Serde(e.to_string()))?;

    fs::write(file_path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
}

/// Record a contract's address on the given network in the deployments file,
/// leaving all other entries untouched
pub fn write_deployed_address(
    file_path: &Path,
    network: &str,
    contract_name: &str,
    address: Address,
) -> Result<(), ScriptError> {
    let mut deployments = load_deployments(file_path)?;
    network_deployments(&mut deployments, network)?.insert(
        contract_name.to_string(),
        Value::String(format!("{address:#x}")),
    );

    save_deployments(file_path, &deployments)
}

/// Map the outcome of a command to a process exit status, writing any error
/// to the given stream
pub fn exit_status<T, E: Display>(res: Result<T, E>, err_out: &mut impl Write) -> u8 {
    match res {
        Ok(_) => 0,
        Err(e) => {
            // Nothing sensible to do if stderr itself is gone
            let _ = writeln!(err_out, "{e}");
            1
        }
    }
}
