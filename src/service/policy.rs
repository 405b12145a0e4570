use std::sync::Arc;
use tracing::{debug, info};

use crate::blockchain::traits::PolicyReader;
use crate::core::domain::{PolicyAndBalance, TokenBalance};
use crate::core::errors::PolicyApiError;
use crate::core::validation::{checksummed, normalize_address};

/// Reads a policy by license plate together with the caller's token balance.
#[derive(Clone)]
pub struct PolicyLookupService {
    reader: Arc<dyn PolicyReader>,
}

impl PolicyLookupService {
    pub fn new(reader: Arc<dyn PolicyReader>) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &Arc<dyn PolicyReader> {
        &self.reader
    }

    /// Runs the lookup pipeline: normalize the address, read the policy with
    /// the address as sender, read balance and decimals, then format.
    ///
    /// The balance belongs to `address`, not to the policy owner.
    pub async fn policy_and_balance(
        &self,
        address: &str,
        plate: &str,
    ) -> Result<PolicyAndBalance, PolicyApiError> {
        let caller = normalize_address(address)?;
        debug!(caller = %checksummed(&caller), plate, "looking up policy");

        let policy = self.reader.view_policy_by_plate(caller, plate).await?;

        let raw_balance = self.reader.balance_of(caller).await?;
        let decimals = self.reader.decimals().await?;

        let doc = PolicyAndBalance::build(&policy, plate, TokenBalance::new(raw_balance, decimals))?;
        info!(policy_id = doc.policy_id, plate, "policy lookup served");
        Ok(doc)
    }
}
