//! Shared types for operator records, fee grant commands and the collaborators that execute them.

pub mod command;
pub mod errors;
pub mod operators;
pub mod source;

pub use command::{FeegrantAction, FeegrantCommand, TxFlags};
pub use errors::{ModelError, SourceError};
pub use operators::{Expiration, GrantDesiredState, OperatorGroup, OperatorRecord, OperatorSet};
pub use source::{AccountData, AccountSource, MessageSource};
