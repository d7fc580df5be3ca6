use serde_json::Value;

use crate::{command::FeegrantCommand, errors::SourceError};

/// Account number and sequence of the granter, as reported by the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountData {
    pub account_number: u64,
    pub sequence: u64,
}

/// Produces unsigned transaction fragments for fee grant commands.
///
/// The production implementation runs the chain daemon with `--generate-only`; tests use canned
/// fragments.
pub trait MessageSource {
    /// Run one command and return its parsed JSON transaction document.
    fn execute(&mut self, command: &FeegrantCommand) -> Result<Value, SourceError>;
}

/// Looks up account number and sequence for an address.
pub trait AccountSource {
    fn account(&self, address: &str) -> Result<AccountData, SourceError>;
}
