use std::time::Duration;

use feegrant_types::{AccountData, AccountSource, SourceError};
use reqwest::{blocking::Client, StatusCode};
use serde_json::Value;

/// Reads account number and sequence from the Cosmos SDK REST (LCD) API.
#[derive(Debug, Clone)]
pub struct RestAccountSource {
    base_url: String,
    client: Client,
}

impl RestAccountSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::HttpClient(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url_for(&self, address: &str) -> String {
        format!("{}/cosmos/auth/v1beta1/accounts/{address}", self.base_url)
    }
}

impl AccountSource for RestAccountSource {
    fn account(&self, address: &str) -> Result<AccountData, SourceError> {
        let lookup_error = |reason: String| SourceError::AccountLookup {
            address: address.to_string(),
            reason,
        };

        let response = self
            .client
            .get(self.url_for(address))
            .send()
            .map_err(|e| lookup_error(format!("request failed: {e}")))?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(lookup_error(format!("HTTP {status}")));
        }
        let body = response
            .text()
            .map_err(|e| lookup_error(format!("failed reading response: {e}")))?;
        parse_account_response(address, &body)
    }
}

/// Extract account number and sequence from an `/cosmos/auth/v1beta1/accounts/{address}` body.
///
/// Vesting accounts nest the base account one or two levels down.
pub fn parse_account_response(address: &str, body: &str) -> Result<AccountData, SourceError> {
    let malformed = |reason: &str| SourceError::AccountLookup {
        address: address.to_string(),
        reason: reason.to_string(),
    };

    let root: Value =
        serde_json::from_str(body).map_err(|_| malformed("response is not JSON"))?;
    let account = root
        .get("account")
        .ok_or_else(|| malformed("response has no `account`"))?;
    let base = [
        Some(account),
        account.get("base_account"),
        account
            .get("base_vesting_account")
            .and_then(|v| v.get("base_account")),
    ]
    .into_iter()
    .flatten()
    .find(|candidate| candidate.get("account_number").is_some())
    .ok_or_else(|| malformed("account has no `account_number`"))?;

    let account_number = base
        .get("account_number")
        .and_then(as_u64)
        .ok_or_else(|| malformed("`account_number` is not an integer"))?;
    // Fresh accounts may omit the sequence entirely.
    let sequence = match base.get("sequence") {
        None | Some(Value::Null) => 0,
        Some(v) => as_u64(v).ok_or_else(|| malformed("`sequence` is not an integer"))?,
    };

    Ok(AccountData {
        account_number,
        sequence,
    })
}

fn as_u64(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}
