use async_trait::async_trait;
use ethers::{
    abi::{Abi, Token},
    contract::{Contract, ContractError},
    providers::{Http, JsonRpcClient, Middleware, Provider},
    types::{Address, U256},
};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

use super::traits::PolicyReader;
use crate::core::domain::RawPolicy;
use crate::core::errors::PolicyApiError;

/// Binding of the insurance contract on a JSON-RPC node.
pub struct PolicyContractClient<P: JsonRpcClient + 'static = Http> {
    provider: Arc<Provider<P>>,
    contract: Contract<Provider<P>>,
    network_name: String,
}

impl PolicyContractClient<Http> {
    /// Builds an HTTP provider for `rpc_url`. Does not contact the node.
    pub fn connect(
        rpc_url: &str,
        timeout: Duration,
        network_name: &str,
        address: Address,
        abi: Abi,
    ) -> Result<Self, PolicyApiError> {
        let rpc_url_clean = rpc_url.trim();
        let parsed_url = reqwest::Url::parse(rpc_url_clean).map_err(|e| {
            PolicyApiError::Config(format!("Invalid RPC URL '{}': {}", rpc_url_clean, e))
        })?;

        // Allow proxy environment vars.
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if let Ok(proxy) = std::env::var("HTTPS_PROXY").or_else(|_| std::env::var("HTTP_PROXY")) {
            if let Ok(p) = reqwest::Proxy::all(proxy) {
                builder = builder.proxy(p);
            }
        }
        let client = builder
            .build()
            .map_err(|e| PolicyApiError::Config(format!("Failed to build HTTP client: {}", e)))?;

        info!("Using {} RPC endpoint {}", network_name, parsed_url);
        let provider = Provider::new(Http::new_with_client(parsed_url, client));
        Ok(Self::new_with_provider(provider, network_name, address, abi))
    }
}

impl<P> PolicyContractClient<P>
where
    P: JsonRpcClient + 'static,
{
    /// Binds an existing provider, e.g. a `MockProvider` in tests.
    pub fn new_with_provider(
        provider: Provider<P>,
        network_name: &str,
        address: Address,
        abi: Abi,
    ) -> Self {
        let provider = Arc::new(provider);
        let contract = Contract::new(address, abi, provider.clone());
        Self { provider, contract, network_name: network_name.to_string() }
    }
}

/// Sorts a failed contract call into the service error taxonomy.
fn classify<M: Middleware>(method: &str, err: ContractError<M>) -> PolicyApiError {
    if let Some(reason) = err.decode_revert::<String>() {
        return PolicyApiError::ContractReverted(reason);
    }
    if err.is_revert() {
        return PolicyApiError::ContractReverted(format!("{} reverted without a reason", method));
    }
    let text = err.to_string();
    match err {
        ContractError::DecodingError(_)
        | ContractError::AbiError(_)
        | ContractError::DetokenizationError(_)
        | ContractError::ContractNotDeployed => {
            PolicyApiError::InvalidPolicyData(format!("{}: {}", method, text))
        }
        _ if text.contains("revert") => PolicyApiError::ContractReverted(text),
        _ => PolicyApiError::UpstreamUnavailable(format!("{}: {}", method, text)),
    }
}

fn abi_misuse(method: &str, err: impl std::fmt::Display) -> PolicyApiError {
    PolicyApiError::Config(format!("cannot encode {} call: {}", method, err))
}

#[async_trait]
impl<P> PolicyReader for PolicyContractClient<P>
where
    P: JsonRpcClient + 'static,
{
    async fn view_policy_by_plate(
        &self,
        caller: Address,
        plate: &str,
    ) -> Result<RawPolicy, PolicyApiError> {
        debug!(caller = ?caller, plate, "ViewPolicyByPlate");
        let token = self
            .contract
            .method::<_, Token>("ViewPolicyByPlate", plate.to_string())
            .map_err(|e| abi_misuse("ViewPolicyByPlate", e))?
            .from(caller)
            .call()
            .await
            .map_err(|e| classify("ViewPolicyByPlate", e))?;
        RawPolicy::from_token(token)
    }

    async fn balance_of(&self, account: Address) -> Result<U256, PolicyApiError> {
        debug!(account = ?account, "balanceOf");
        let balance = self
            .contract
            .method::<_, U256>("balanceOf", account)
            .map_err(|e| abi_misuse("balanceOf", e))?
            .call()
            .await
            .map_err(|e| classify("balanceOf", e))?;
        Ok(balance)
    }

    async fn decimals(&self) -> Result<u8, PolicyApiError> {
        let decimals = self
            .contract
            .method::<_, u8>("decimals", ())
            .map_err(|e| abi_misuse("decimals", e))?
            .call()
            .await
            .map_err(|e| classify("decimals", e))?;
        debug!(decimals, "decimals");
        Ok(decimals)
    }

    async fn chain_id(&self) -> Result<u64, PolicyApiError> {
        let id = self.provider.get_chainid().await.map_err(|e| {
            PolicyApiError::UpstreamUnavailable(format!("Failed to get chain ID: {}", e))
        })?;
        u64::try_from(id)
            .map_err(|_| PolicyApiError::UpstreamUnavailable(format!("chain ID {} out of range", id)))
    }

    async fn is_deployed(&self) -> Result<bool, PolicyApiError> {
        let code = self
            .provider
            .get_code(self.contract.address(), None)
            .await
            .map_err(|e| PolicyApiError::UpstreamUnavailable(format!("Failed to get code: {}", e)))?;
        Ok(!code.as_ref().is_empty())
    }

    fn network_name(&self) -> &str {
        &self.network_name
    }

    fn contract_address(&self) -> Address {
        self.contract.address()
    }
}
