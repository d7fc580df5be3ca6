use std::fmt;

use feegrant_types::GrantDesiredState;
use time::OffsetDateTime;

/// What has to happen on-chain for one operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrantAction {
    None,
    Grant,
    /// Revoke followed by a fresh grant.
    Renew,
    Revoke,
}

/// The individual predicates behind a [`GrantAction`], kept for reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub grant_needed: bool,
    pub renew_needed: bool,
    pub revoke_needed: bool,
    pub expired: bool,
}

impl Decision {
    pub fn action(&self) -> GrantAction {
        if self.renew_needed {
            GrantAction::Renew
        } else if self.grant_needed {
            GrantAction::Grant
        } else if self.revoke_needed {
            GrantAction::Revoke
        } else {
            GrantAction::None
        }
    }

    pub fn update_needed(&self) -> bool {
        self.action() != GrantAction::None
    }

    /// Human readable list of the predicates that fired, e.g. `"renew needed, revoke needed"`.
    pub fn reasons(&self) -> String {
        let mut reasons = Vec::new();
        if self.grant_needed {
            reasons.push("grant needed");
        }
        if self.renew_needed {
            reasons.push("renew needed");
        }
        if self.revoke_needed {
            reasons.push("revoke needed");
        }
        reasons.join(", ")
    }
}

impl fmt::Display for GrantAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GrantAction::None => "none",
            GrantAction::Grant => "grant",
            GrantAction::Renew => "renew",
            GrantAction::Revoke => "revoke",
        };
        f.write_str(s)
    }
}

/// Classify the work needed for one operator.
///
/// `state.period_spend_limit` is the merged desired limit and `state.active_period_spend_limit`
/// the limit currently granted on-chain. A limit mismatch against a live grant always renews,
/// even if nothing else changed.
pub fn decide(state: &GrantDesiredState, now: OffsetDateTime) -> Decision {
    let enabled = state.enabled;
    let current = state.period_spend_limit;
    let active = state.active_period_spend_limit;
    let expired = state
        .expiration
        .as_ref()
        .map_or(false, |expiration| expiration.is_past(now));

    let grant_needed = enabled && current > 0 && active == 0;
    let renew_needed = enabled && (expired || (current != active && active != 0));
    let revoke_needed =
        (!enabled && active != 0) || (current == 0 && active != 0) || renew_needed;

    Decision {
        grant_needed,
        renew_needed,
        revoke_needed,
        expired,
    }
}
