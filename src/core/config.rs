use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::errors::PolicyApiError;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,

    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,

    /// Upper bound for a single HTTP request, RPC calls included (seconds)
    #[serde(default = "ServerConfig::default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    fn default_host() -> String { "127.0.0.1".to_string() }
    fn default_port() -> u16 { 5000 }
    fn default_request_timeout() -> u64 { 30 }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_secs: Self::default_request_timeout(),
        }
    }
}

/// Blockchain network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "NetworkConfig::default_name")]
    pub name: String,

    #[serde(default = "NetworkConfig::default_rpc_url")]
    pub rpc_url: String,

    /// Expected chain id; only compared against the node at startup.
    #[serde(default = "NetworkConfig::default_chain_id")]
    pub chain_id: Option<u64>,

    #[serde(default = "NetworkConfig::default_rpc_timeout")]
    pub rpc_timeout_secs: u64,
}

impl NetworkConfig {
    fn default_name() -> String { "scroll-sepolia".to_string() }
    fn default_rpc_url() -> String { "https://sepolia-rpc.scroll.io/".to_string() }
    fn default_chain_id() -> Option<u64> { Some(534_351) }
    fn default_rpc_timeout() -> u64 { 10 }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            rpc_url: Self::default_rpc_url(),
            chain_id: Self::default_chain_id(),
            rpc_timeout_secs: Self::default_rpc_timeout(),
        }
    }
}

/// Insurance contract binding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Deployed contract address; required.
    #[serde(default)]
    pub address: Option<String>,

    #[serde(default = "ContractConfig::default_abi_path")]
    pub abi_path: PathBuf,
}

impl ContractConfig {
    fn default_abi_path() -> PathBuf { PathBuf::from("contract_abi.json") }
}

/// Service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub contract: ContractConfig,
}

impl AppConfig {
    /// Loads defaults, then the TOML file, then `POLICY_API_*` env overrides.
    ///
    /// With `path == None` the file is taken from `CONFIG_PATH` or
    /// [`DEFAULT_CONFIG_PATH`] and may be absent. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, PolicyApiError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = std::env::var("CONFIG_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    tracing::info!(
                        "No config file at {}, using defaults and environment",
                        default_path.display()
                    );
                    Self::default()
                }
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, PolicyApiError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PolicyApiError::Config(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, PolicyApiError> {
        toml::from_str(content).map_err(|e| PolicyApiError::Config(format!("invalid config: {}", e)))
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), PolicyApiError> {
        if let Ok(host) = std::env::var("POLICY_API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_number::<u16>("POLICY_API_PORT")? {
            self.server.port = port;
        }
        if let Ok(rpc_url) = std::env::var("POLICY_API_RPC_URL") {
            self.network.rpc_url = rpc_url;
        }
        if let Some(chain_id) = env_number::<u64>("POLICY_API_CHAIN_ID")? {
            self.network.chain_id = Some(chain_id);
        }
        if let Ok(address) = std::env::var("POLICY_API_CONTRACT_ADDRESS") {
            self.contract.address = Some(address);
        }
        if let Ok(abi_path) = std::env::var("POLICY_API_ABI_PATH") {
            self.contract.abi_path = PathBuf::from(abi_path);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), PolicyApiError> {
        let url = reqwest::Url::parse(self.network.rpc_url.trim()).map_err(|e| {
            PolicyApiError::Config(format!("invalid RPC URL '{}': {}", self.network.rpc_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PolicyApiError::Config(format!(
                "RPC URL must be http(s), got '{}'",
                url.scheme()
            )));
        }
        if self.contract_address().is_err() {
            return Err(PolicyApiError::Config(
                "contract.address is not set (POLICY_API_CONTRACT_ADDRESS)".to_string(),
            ));
        }
        Ok(())
    }

    pub fn contract_address(&self) -> Result<&str, PolicyApiError> {
        self.contract
            .address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| PolicyApiError::Config("contract address missing".to_string()))
    }
}

fn env_number<T>(key: &str) -> Result<Option<T>, PolicyApiError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| PolicyApiError::Config(format!("{}='{}': {}", key, raw, e))),
        Err(_) => Ok(None),
    }
}
