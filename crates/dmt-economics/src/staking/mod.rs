//! Staking module
//!
//! Position bookkeeping for the `NONE → STAKED → NONE` lifecycle. Chain
//! transfers and reward issuance live in [`crate::engine`].

pub mod book;

pub use book::{InFlightGuard, StakingBook, StakingInfo, StakingStats};
