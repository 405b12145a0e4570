//! In-memory [`PolicyReader`] for tests and offline runs.

use async_trait::async_trait;
use ethers::types::{Address, H160, U256};
use std::sync::Mutex;

use super::traits::PolicyReader;
use crate::core::domain::RawPolicy;
use crate::core::errors::PolicyApiError;

/// A call observed by [`MockPolicyReader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderCall {
    ViewPolicyByPlate { caller: Address, plate: String },
    BalanceOf(Address),
    Decimals,
}

/// Serves fixed answers and records every contract call it receives.
pub struct MockPolicyReader {
    policy: Result<RawPolicy, PolicyApiError>,
    balance: U256,
    decimals: u8,
    calls: Mutex<Vec<ReaderCall>>,
}

impl MockPolicyReader {
    pub fn new(policy: RawPolicy, balance: U256, decimals: u8) -> Self {
        Self { policy: Ok(policy), balance, decimals, calls: Mutex::new(Vec::new()) }
    }

    /// Mimics a contract that returns a defaulted struct for unknown plates.
    pub fn empty_policy() -> Self {
        let zeroed = RawPolicy {
            id: U256::zero(),
            owner: Address::zero(),
            guarantee_amount: U256::zero(),
            start_date: U256::zero(),
            end_date: U256::zero(),
            payment_amount: U256::zero(),
            car_engine_volume: U256::zero(),
            car_age: U256::zero(),
            is_valid: false,
        };
        Self::new(zeroed, U256::zero(), 18)
    }

    /// Every policy lookup fails with `err`.
    pub fn failing(err: PolicyApiError) -> Self {
        Self { policy: Err(err), balance: U256::zero(), decimals: 18, calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<ReaderCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: ReaderCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl PolicyReader for MockPolicyReader {
    async fn view_policy_by_plate(
        &self,
        caller: Address,
        plate: &str,
    ) -> Result<RawPolicy, PolicyApiError> {
        self.record(ReaderCall::ViewPolicyByPlate { caller, plate: plate.to_string() });
        self.policy.clone()
    }

    async fn balance_of(&self, account: Address) -> Result<U256, PolicyApiError> {
        self.record(ReaderCall::BalanceOf(account));
        Ok(self.balance)
    }

    async fn decimals(&self) -> Result<u8, PolicyApiError> {
        self.record(ReaderCall::Decimals);
        Ok(self.decimals)
    }

    async fn chain_id(&self) -> Result<u64, PolicyApiError> {
        Ok(534_351)
    }

    async fn is_deployed(&self) -> Result<bool, PolicyApiError> {
        Ok(true)
    }

    fn network_name(&self) -> &str {
        "mock"
    }

    fn contract_address(&self) -> Address {
        Address::zero()
    }
}

const SAMPLE_OWNER: Address = H160([
    0x5a, 0xae, 0xb6, 0x05, 0x3f, 0x3e, 0x94, 0xc9, 0xb9, 0xa0, 0x9f, 0x33, 0x66, 0x94, 0x35, 0xe7,
    0xef, 0x1b, 0xea, 0xed,
]);

/// A valid policy owned by the EIP-55 reference address
/// `0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed`.
pub fn sample_policy() -> RawPolicy {
    RawPolicy {
        id: U256::from(7u64),
        owner: SAMPLE_OWNER,
        guarantee_amount: U256::from(5_000u64) * U256::exp10(18),
        start_date: U256::from(1_700_000_000u64),
        end_date: U256::from(1_731_536_000u64),
        payment_amount: U256::from(250u64) * U256::exp10(18),
        car_engine_volume: U256::from(1600u64),
        car_age: U256::from(4u64),
        is_valid: true,
    }
}
