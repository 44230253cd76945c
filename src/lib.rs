pub mod abi;
pub mod config;
pub mod contracts;
pub mod deploy;
pub mod eligibility;
pub mod error;
pub mod ico;
pub mod notify;
pub mod rpc;
pub mod types;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;
