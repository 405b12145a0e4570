use async_trait::async_trait;
use ethers::types::{Address, U256};

use crate::core::domain::RawPolicy;
use crate::core::errors::PolicyApiError;

/// Read-only view of the insurance contract.
#[async_trait]
pub trait PolicyReader: Send + Sync {
    /// Simulates `ViewPolicyByPlate(plate)` with `caller` as the sender.
    async fn view_policy_by_plate(
        &self,
        caller: Address,
        plate: &str,
    ) -> Result<RawPolicy, PolicyApiError>;

    /// Token balance of `account` in raw units.
    async fn balance_of(&self, account: Address) -> Result<U256, PolicyApiError>;

    /// Token decimal exponent.
    async fn decimals(&self) -> Result<u8, PolicyApiError>;

    /// Chain id reported by the node.
    async fn chain_id(&self) -> Result<u64, PolicyApiError>;

    /// Whether any bytecode is deployed at the bound contract address.
    async fn is_deployed(&self) -> Result<bool, PolicyApiError>;

    fn network_name(&self) -> &str;

    fn contract_address(&self) -> Address;
}
