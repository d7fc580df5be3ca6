//! In-memory message source for exercising the reconciler without a chain daemon.

use feegrant_types::{FeegrantAction, FeegrantCommand, MessageSource, SourceError};
use serde_json::{json, Value};

/// How a scripted command should misbehave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MockFailure {
    /// Behave like a non-zero exit.
    Exit,
    /// Return output that is JSON but not a transaction.
    Malformed,
}

/// Returns a canned single-message transaction per command and records every command it saw.
#[derive(Debug, Default)]
pub struct MockMessageSource {
    pub executed: Vec<FeegrantCommand>,
    failures: Vec<(String, &'static str, MockFailure)>,
}

impl MockMessageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `action` ("grant" or "revoke") command for `grantee` fail.
    pub fn fail_on(mut self, grantee: &str, action: &'static str, failure: MockFailure) -> Self {
        self.failures.push((grantee.to_string(), action, failure));
        self
    }

    fn failure_for(&self, command: &FeegrantCommand) -> Option<MockFailure> {
        self.failures
            .iter()
            .find(|(grantee, action, _)| {
                *grantee == command.grantee && *action == command.action.name()
            })
            .map(|(_, _, failure)| *failure)
    }
}

/// The document `tx feegrant ... --generate-only --output json` prints for one command.
pub fn canned_tx(command: &FeegrantCommand) -> Value {
    let message = match &command.action {
        FeegrantAction::Revoke => json!({
            "@type": "/cosmos.feegrant.v1beta1.MsgRevokeAllowance",
            "granter": command.granter,
            "grantee": command.grantee,
        }),
        FeegrantAction::Grant { period_limit, denom, .. } => json!({
            "@type": "/cosmos.feegrant.v1beta1.MsgGrantAllowance",
            "granter": command.granter,
            "grantee": command.grantee,
            "allowance": {
                "@type": "/cosmos.feegrant.v1beta1.PeriodicAllowance",
                "period_spend_limit": [{
                    "denom": denom,
                    "amount": period_limit.unwrap_or_default().to_string(),
                }],
            },
        }),
    };

    json!({
        "body": {
            "messages": [message],
            "memo": "",
            "timeout_height": "0",
            "extension_options": [],
            "non_critical_extension_options": [],
        },
        "auth_info": {
            "signer_infos": [],
            "fee": {
                "amount": [],
                "gas_limit": command.flags.gas.to_string(),
                "payer": "",
                "granter": "",
            },
        },
        "signatures": [],
    })
}

impl MessageSource for MockMessageSource {
    fn execute(&mut self, command: &FeegrantCommand) -> Result<Value, SourceError> {
        self.executed.push(command.clone());
        match self.failure_for(command) {
            Some(MockFailure::Exit) => Err(SourceError::CommandFailed {
                status: "exit status: 1".to_string(),
                stderr: "account sequence mismatch".to_string(),
            }),
            Some(MockFailure::Malformed) => Ok(json!(["not", "a", "transaction"])),
            None => Ok(canned_tx(command)),
        }
    }
}
