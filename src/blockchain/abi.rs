use ethers::abi::Abi;
use std::path::Path;

use crate::core::errors::PolicyApiError;

/// Contract methods the lookup pipeline calls.
pub const REQUIRED_FUNCTIONS: [&str; 3] = ["ViewPolicyByPlate", "balanceOf", "decimals"];

/// Loads a contract interface from disk.
///
/// Accepts either a bare ABI array or a compiler artifact (Hardhat, Foundry)
/// carrying the ABI under an `abi` key.
pub fn load_abi(path: &Path) -> Result<Abi, PolicyApiError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PolicyApiError::Config(format!("cannot read contract ABI {}: {}", path.display(), e))
    })?;
    let abi = parse_abi(&content)
        .map_err(|e| PolicyApiError::Config(format!("{}: {}", path.display(), e)))?;
    tracing::info!(
        functions = abi.functions.len(),
        "Loaded contract ABI from {}",
        path.display()
    );
    Ok(abi)
}

pub fn parse_abi(content: &str) -> Result<Abi, PolicyApiError> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| PolicyApiError::Config(format!("malformed ABI JSON: {}", e)))?;

    let abi_value = match value {
        serde_json::Value::Object(mut artifact) => artifact
            .remove("abi")
            .ok_or_else(|| PolicyApiError::Config("artifact has no 'abi' field".to_string()))?,
        other => other,
    };

    let abi: Abi = serde_json::from_value(abi_value)
        .map_err(|e| PolicyApiError::Config(format!("invalid ABI: {}", e)))?;
    ensure_required_functions(&abi)?;
    Ok(abi)
}

fn ensure_required_functions(abi: &Abi) -> Result<(), PolicyApiError> {
    let missing: Vec<&str> = REQUIRED_FUNCTIONS
        .iter()
        .copied()
        .filter(|name| abi.function(name).is_err())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PolicyApiError::Config(format!("ABI lacks required functions: {}", missing.join(", "))))
    }
}
