use feegrant_types::SourceError;
use thiserror::Error;

/// Errors while folding a command's output into the batch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("transaction output is not a JSON object")]
    NotAnObject,
    #[error("transaction body is not a JSON object")]
    BodyNotAnObject,
    #[error("`body.messages` is not an array")]
    MessagesNotAnArray,
}

/// Why a single invocation contributed no messages. Never fatal to the run.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Batch(#[from] BatchError),
}
