pub mod abi;
pub mod ethereum;
pub mod mock;
pub mod traits;

pub use ethereum::PolicyContractClient;
pub use traits::PolicyReader;
