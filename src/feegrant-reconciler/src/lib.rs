//! Fee grant reconciliation.
//!
//! Merges the desired grant state of relayer operators listed under several grouping keys,
//! decides per operator whether a grant, renewal or revoke is required, and batches the
//! resulting `tx feegrant` messages into one unsigned transaction for offline multisig signing.

pub mod batcher;
pub mod command;
pub mod decision;
pub mod driver;
pub mod errors;
pub mod merger;
pub mod mock;


pub use batcher::{BatchOutcome, FinalTransaction, TransactionBatch, TxMetadata};
pub use command::{CallKind, CommandSynthesizer, GasSchedule, GrantTerms};
pub use decision::{decide, Decision, GrantAction};
pub use driver::{Invocation, OperatorOutcome, ReconcileReport, Reconciler};
pub use errors::{BatchError, InvocationError};
pub use merger::merge_operator_groups;
