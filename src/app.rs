//! Wiring of configuration, contract binding and startup checks.

use std::sync::Arc;
use tracing::{info, warn};

use crate::blockchain::abi::load_abi;
use crate::blockchain::ethereum::PolicyContractClient;
use crate::blockchain::traits::PolicyReader;
use crate::core::config::AppConfig;
use crate::core::errors::PolicyApiError;
use crate::core::validation::{checksummed, normalize_address};

/// Builds the contract binding described by `config`.
///
/// Fails on a missing or malformed ABI file and on a contract address that is
/// not a 20-byte hex value. Does not contact the node.
pub fn build_contract_client(config: &AppConfig) -> Result<PolicyContractClient, PolicyApiError> {
    let raw_address = config.contract_address()?;
    let address = normalize_address(raw_address).map_err(|e| {
        PolicyApiError::Config(format!("contract address '{}' is unusable: {}", raw_address, e))
    })?;
    let abi = load_abi(&config.contract.abi_path)?;

    info!(contract = %checksummed(&address), "Binding insurance contract");
    PolicyContractClient::connect(
        &config.network.rpc_url,
        config.network.rpc_timeout(),
        &config.network.name,
        address,
        abi,
    )
}

/// Outcome of [`startup_check`]. `None` means the probe itself failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityReport {
    pub chain_id: Option<u64>,
    pub contract_deployed: Option<bool>,
}

impl ConnectivityReport {
    pub fn is_connected(&self) -> bool {
        self.chain_id.is_some()
    }
}

/// Probes the node once at startup and logs the result. Never fails: a
/// service that cannot reach its node still starts and reports errors per
/// request.
pub async fn startup_check(
    reader: &dyn PolicyReader,
    expected_chain_id: Option<u64>,
) -> ConnectivityReport {
    let chain_id = match reader.chain_id().await {
        Ok(id) => {
            info!("Connected to {} (Chain ID: {})", reader.network_name(), id);
            if let Some(expected) = expected_chain_id.filter(|e| *e != id) {
                warn!(expected, actual = id, "Node chain ID differs from configuration");
            }
            Some(id)
        }
        Err(e) => {
            warn!("Failed to connect to {}: {}", reader.network_name(), e);
            None
        }
    };

    let contract_deployed = if chain_id.is_some() {
        match reader.is_deployed().await {
            Ok(true) => Some(true),
            Ok(false) => {
                warn!(
                    contract = %checksummed(&reader.contract_address()),
                    "No contract code at configured address; lookups will fail"
                );
                Some(false)
            }
            Err(e) => {
                warn!("Could not verify contract deployment: {}", e);
                None
            }
        }
    } else {
        None
    };

    ConnectivityReport { chain_id, contract_deployed }
}

/// Builds the reader and runs the startup probe.
pub async fn bootstrap(config: &AppConfig) -> Result<Arc<dyn PolicyReader>, PolicyApiError> {
    let client = build_contract_client(config)?;
    let report = startup_check(&client, config.network.chain_id).await;
    if !report.is_connected() {
        warn!("Continuing without a confirmed node connection");
    }
    Ok(Arc::new(client))
}
