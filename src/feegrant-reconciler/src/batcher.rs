use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::BatchError;

/// Everything but the messages of the most recent command output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TxMetadata {
    /// Body fields other than `messages` (memo, timeout height, extension options).
    pub body: Map<String, Value>,
    pub auth_info: Value,
    pub signatures: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TxBody {
    pub messages: Vec<Value>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// The batched, unsigned multi-message transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalTransaction {
    pub body: TxBody,
    pub auth_info: Value,
    pub signatures: Value,
}

/// Result of a run: either one transaction or an explicit "nothing to do".
#[derive(Clone, Debug, PartialEq)]
pub enum BatchOutcome {
    Transaction(FinalTransaction),
    NothingToDo,
}

impl BatchOutcome {
    pub fn transaction(&self) -> Option<&FinalTransaction> {
        match self {
            BatchOutcome::Transaction(tx) => Some(tx),
            BatchOutcome::NothingToDo => None,
        }
    }
}

/// Run-wide accumulator of messages plus the latest metadata snapshot.
#[derive(Debug, Default)]
pub struct TransactionBatch {
    messages: Vec<Value>,
    metadata: Option<TxMetadata>,
}

impl TransactionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn metadata(&self) -> Option<&TxMetadata> {
        self.metadata.as_ref()
    }

    /// Fold one command's output into the batch and return how many messages it added.
    ///
    /// Output without a `body` adds nothing and leaves the metadata snapshot alone. Malformed
    /// output is rejected before any state changes.
    pub fn absorb(&mut self, output: Value) -> Result<usize, BatchError> {
        let Value::Object(mut tx) = output else {
            return Err(BatchError::NotAnObject);
        };
        let mut body = match tx.shift_remove("body") {
            None => return Ok(0),
            Some(Value::Object(body)) => body,
            Some(_) => return Err(BatchError::BodyNotAnObject),
        };
        let messages = match body.shift_remove("messages") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(messages)) => messages,
            Some(_) => return Err(BatchError::MessagesNotAnArray),
        };

        let added = messages.len();
        self.messages.extend(messages);
        self.metadata = Some(TxMetadata {
            body,
            auth_info: tx.shift_remove("auth_info").unwrap_or(Value::Null),
            signatures: tx
                .shift_remove("signatures")
                .unwrap_or_else(|| Value::Array(Vec::new())),
        });
        Ok(added)
    }

    pub fn finish(self) -> BatchOutcome {
        if self.messages.is_empty() {
            return BatchOutcome::NothingToDo;
        }
        let metadata = self.metadata.unwrap_or_default();
        BatchOutcome::Transaction(FinalTransaction {
            body: TxBody {
                messages: self.messages,
                rest: metadata.body,
            },
            auth_info: metadata.auth_info,
            signatures: metadata.signatures,
        })
    }
}
