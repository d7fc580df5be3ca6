use feegrant_types::{FeegrantAction, FeegrantCommand, GrantDesiredState, TxFlags};

use crate::decision::GrantAction;

pub const DEFAULT_BASE_GAS: u64 = 80_000;
pub const DEFAULT_GAS_STEP: u64 = 40_000;
/// One day.
pub const DEFAULT_PERIOD_SECONDS: u64 = 86_400;

/// Advisory gas estimate: a base cost plus a fixed step per message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasSchedule {
    pub base: u64,
    pub step: u64,
}

impl Default for GasSchedule {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_GAS,
            step: DEFAULT_GAS_STEP,
        }
    }
}

impl GasSchedule {
    pub fn estimate(&self, messages_so_far: usize) -> u64 {
        self.base
            .saturating_add(self.step.saturating_mul(messages_so_far as u64 + 1))
    }
}

/// Grant parameters that are the same for every grantee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrantTerms {
    pub period_seconds: u64,
    pub denom: String,
    pub allowed_messages: Vec<String>,
}

impl Default for GrantTerms {
    fn default() -> Self {
        Self {
            period_seconds: DEFAULT_PERIOD_SECONDS,
            denom: "uatom".to_string(),
            allowed_messages: Vec::new(),
        }
    }
}

/// A single daemon call an action expands to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    Revoke,
    Grant,
}

impl GrantAction {
    /// Calls in execution order; a renewal always revokes before granting.
    pub fn calls(self) -> &'static [CallKind] {
        match self {
            GrantAction::None => &[],
            GrantAction::Grant => &[CallKind::Grant],
            GrantAction::Renew => &[CallKind::Revoke, CallKind::Grant],
            GrantAction::Revoke => &[CallKind::Revoke],
        }
    }
}

/// Turns actions into structured `tx feegrant` commands.
///
/// The sequence number in `flags` is reused unchanged for every command of the run; only the gas
/// limit moves.
#[derive(Clone, Debug)]
pub struct CommandSynthesizer {
    granter: String,
    flags: TxFlags,
    terms: GrantTerms,
    gas: GasSchedule,
    issued: usize,
}

impl CommandSynthesizer {
    /// `flags.gas` is overwritten with the schedule's base cost.
    pub fn new(granter: String, mut flags: TxFlags, terms: GrantTerms, gas: GasSchedule) -> Self {
        flags.gas = gas.base;
        Self {
            granter,
            flags,
            terms,
            gas,
            issued: 0,
        }
    }

    /// Number of commands synthesized so far in this run.
    pub fn issued(&self) -> usize {
        self.issued
    }

    pub fn current_gas(&self) -> u64 {
        self.flags.gas
    }

    pub fn command(
        &mut self,
        kind: CallKind,
        grantee: &str,
        state: &GrantDesiredState,
        messages_so_far: usize,
    ) -> FeegrantCommand {
        match kind {
            CallKind::Revoke => self.revoke(grantee, messages_so_far),
            CallKind::Grant => self.grant(grantee, state, messages_so_far),
        }
    }

    pub fn revoke(&mut self, grantee: &str, messages_so_far: usize) -> FeegrantCommand {
        let flags = self.next_flags(messages_so_far);
        FeegrantCommand {
            granter: self.granter.clone(),
            grantee: grantee.to_string(),
            action: FeegrantAction::Revoke,
            flags,
        }
    }

    pub fn grant(
        &mut self,
        grantee: &str,
        state: &GrantDesiredState,
        messages_so_far: usize,
    ) -> FeegrantCommand {
        let flags = self.next_flags(messages_so_far);
        FeegrantCommand {
            granter: self.granter.clone(),
            grantee: grantee.to_string(),
            action: FeegrantAction::Grant {
                expiration: state.expiration.as_ref().map(|e| e.as_str().to_string()),
                period: Some(self.terms.period_seconds),
                period_limit: Some(state.period_spend_limit),
                denom: self.terms.denom.clone(),
                allowed_messages: self.terms.allowed_messages.clone(),
            },
            flags,
        }
    }

    fn next_flags(&mut self, messages_so_far: usize) -> TxFlags {
        if self.issued > 0 {
            self.flags.gas = self.gas.estimate(messages_so_far);
        }
        self.issued += 1;
        self.flags.clone()
    }
}
