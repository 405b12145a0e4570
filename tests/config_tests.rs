//! Config loading: file lookup, env overrides and validation.

use serial_test::serial;
use std::io::Write;
use std::path::{Path, PathBuf};
use traffic_insurance_api::core::config::AppConfig;
use traffic_insurance_api::core::errors::PolicyApiError;

const ENV_KEYS: [&str; 7] = [
    "CONFIG_PATH",
    "POLICY_API_HOST",
    "POLICY_API_PORT",
    "POLICY_API_RPC_URL",
    "POLICY_API_CHAIN_ID",
    "POLICY_API_CONTRACT_ADDRESS",
    "POLICY_API_ABI_PATH",
];

/// Clears the service env vars for the duration of a test and restores them after.
struct EnvGuard(Vec<(&'static str, Option<String>)>);

impl EnvGuard {
    fn clean() -> Self {
        let saved = ENV_KEYS.iter().map(|k| (*k, std::env::var(k).ok())).collect();
        for k in ENV_KEYS {
            std::env::remove_var(k);
        }
        EnvGuard(saved)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (k, v) in &self.0 {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }
    }
}

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_load_from_explicit_file() {
    let _env = EnvGuard::clean();
    let file = write_config(
        r#"
        [network]
        rpc_url = "http://127.0.0.1:8545"
        chain_id = 31337

        [contract]
        address = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        abi_path = "abi/TrafficInsurance.json"
        "#,
    );

    let config = AppConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.network.rpc_url, "http://127.0.0.1:8545");
    assert_eq!(config.network.chain_id, Some(31337));
    assert_eq!(config.contract.abi_path, PathBuf::from("abi/TrafficInsurance.json"));
    assert_eq!(config.server.port, 5000);
}

#[test]
#[serial]
fn test_explicit_missing_file_is_an_error() {
    let _env = EnvGuard::clean();
    let err = AppConfig::load(Some(Path::new("/nonexistent/policy-api.toml"))).unwrap_err();
    assert!(matches!(err, PolicyApiError::Config(_)));
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let _env = EnvGuard::clean();
    let file = write_config(
        r#"
        [server]
        port = 7000

        [contract]
        address = "0x1111111111111111111111111111111111111111"
        "#,
    );
    std::env::set_var("POLICY_API_PORT", "9000");
    std::env::set_var("POLICY_API_HOST", "0.0.0.0");
    std::env::set_var("POLICY_API_RPC_URL", "https://rpc.example.org");
    std::env::set_var("POLICY_API_CONTRACT_ADDRESS", "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
    std::env::set_var("POLICY_API_ABI_PATH", "/etc/policy/abi.json");

    let config = AppConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.bind_addr(), "0.0.0.0:9000");
    assert_eq!(config.network.rpc_url, "https://rpc.example.org");
    assert_eq!(
        config.contract.address.as_deref(),
        Some("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed")
    );
    assert_eq!(config.contract.abi_path, PathBuf::from("/etc/policy/abi.json"));
}

#[test]
#[serial]
fn test_config_path_env_and_env_only_setup() {
    let _env = EnvGuard::clean();
    std::env::set_var("CONFIG_PATH", "/nonexistent/default-config.toml");
    std::env::set_var("POLICY_API_CONTRACT_ADDRESS", "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");

    // A missing default file falls back to defaults + env.
    let config = AppConfig::load(None).unwrap();
    assert_eq!(config.network.rpc_url, "https://sepolia-rpc.scroll.io/");

    let file = write_config("[server]\nport = 6123\n");
    std::env::set_var("CONFIG_PATH", file.path());
    let config = AppConfig::load(None).unwrap();
    assert_eq!(config.server.port, 6123);
}

#[test]
#[serial]
fn test_unparseable_env_number_is_rejected() {
    let _env = EnvGuard::clean();
    std::env::set_var("CONFIG_PATH", "/nonexistent/default-config.toml");
    std::env::set_var("POLICY_API_CONTRACT_ADDRESS", "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
    std::env::set_var("POLICY_API_PORT", "eighty");

    let err = AppConfig::load(None).unwrap_err();
    assert!(err.to_string().contains("POLICY_API_PORT"));
}

#[test]
#[serial]
fn test_missing_contract_address_is_rejected() {
    let _env = EnvGuard::clean();
    std::env::set_var("CONFIG_PATH", "/nonexistent/default-config.toml");
    let err = AppConfig::load(None).unwrap_err();
    assert!(err.to_string().contains("contract.address"));
}
