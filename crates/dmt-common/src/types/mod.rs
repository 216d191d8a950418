//! Core data types for the DMT economics engine

pub mod address;
pub mod agent;
pub mod balance;
pub mod ledger_entry;
pub mod staking;
pub mod token;
