//! Reward ledger
//!
//! Append-only record of every reward and penalty. Appends are idempotent on
//! entry id so an entry parked in the [`outbox::LedgerOutbox`] can be retried
//! without double-recording.

pub mod outbox;
pub mod store;

pub use outbox::LedgerOutbox;
pub use store::{AppendOutcome, InMemoryLedger, LedgerStore, LedgerSummary};
