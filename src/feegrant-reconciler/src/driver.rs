use std::{collections::HashSet, fmt};

use feegrant_types::{GrantDesiredState, MessageSource, OperatorRecord, OperatorSet};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::{
    batcher::{BatchOutcome, TransactionBatch},
    command::{CallKind, CommandSynthesizer},
    decision::{decide, Decision, GrantAction},
    errors::InvocationError,
    merger::merge_operator_groups,
};

/// Result of one daemon call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invocation {
    Applied { kind: CallKind, messages: usize },
    Failed { kind: CallKind, error: String },
}

/// What happened for one distinct operator address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorOutcome {
    pub address: String,
    pub name: String,
    pub state: GrantDesiredState,
    pub decision: Decision,
    pub invocations: Vec<Invocation>,
}

impl OperatorOutcome {
    pub fn action(&self) -> GrantAction {
        self.decision.action()
    }

    pub fn failures(&self) -> usize {
        self.invocations
            .iter()
            .filter(|i| matches!(i, Invocation::Failed { .. }))
            .count()
    }
}

impl fmt::Display for OperatorOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.decision;
        if !d.update_needed() {
            return write!(
                f,
                "No update needed for operator {} with address {}",
                self.name, self.address
            );
        }

        write!(
            f,
            "Update needed for operator {} with address {}: {}",
            self.name,
            self.address,
            d.reasons()
        )?;
        if d.grant_needed || d.renew_needed {
            let expiration = self
                .state
                .expiration
                .as_ref()
                .map_or("none", |e| e.as_str());
            write!(
                f,
                "\n  - Current period limit: {}\n  - Active period limit: {}\n  - Expiration: {}",
                self.state.period_spend_limit, self.state.active_period_spend_limit, expiration
            )?;
        }
        if d.revoke_needed {
            f.write_str("\n  - Revocation due to either disabled status or renewal requirement.")?;
        }
        for invocation in &self.invocations {
            if let Invocation::Failed { kind, error } = invocation {
                write!(f, "\n  - {kind:?} command failed: {error}")?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReconcileReport {
    /// One entry per distinct address, in first-seen order.
    pub operators: Vec<OperatorOutcome>,
    /// Records rewritten by the merge step.
    pub merged_records: usize,
    pub outcome: BatchOutcome,
}

/// Drives a single reconciliation run over an operator set.
pub struct Reconciler<'a, S> {
    synthesizer: CommandSynthesizer,
    source: &'a mut S,
    now: OffsetDateTime,
}

impl<'a, S: MessageSource> Reconciler<'a, S> {
    pub fn new(synthesizer: CommandSynthesizer, source: &'a mut S, now: OffsetDateTime) -> Self {
        Self {
            synthesizer,
            source,
            now,
        }
    }

    /// Merge duplicate addresses, then decide and synthesize commands for each distinct address.
    ///
    /// Command failures are recorded on the operator's outcome and do not stop the run.
    pub fn run(mut self, operators: &mut OperatorSet) -> ReconcileReport {
        let merged_records = merge_operator_groups(operators);
        info!(
            records = operators.len(),
            groups = operators.groups.len(),
            merged_records,
            "reconciling fee grants"
        );

        let mut batch = TransactionBatch::new();
        let mut seen = HashSet::new();
        let mut outcomes = Vec::new();
        for op in operators.iter() {
            if !seen.insert(op.address.as_str()) {
                debug!(address = %op.address, "address already processed, skipping");
                continue;
            }
            outcomes.push(self.reconcile_operator(op, &mut batch));
        }

        let outcome = batch.finish();
        match &outcome {
            BatchOutcome::Transaction(tx) => info!(
                operators = outcomes.len(),
                messages = tx.body.messages.len(),
                "batched fee grant transaction"
            ),
            BatchOutcome::NothingToDo => info!(operators = outcomes.len(), "nothing to do"),
        }

        ReconcileReport {
            operators: outcomes,
            merged_records,
            outcome,
        }
    }

    fn reconcile_operator(
        &mut self,
        op: &OperatorRecord,
        batch: &mut TransactionBatch,
    ) -> OperatorOutcome {
        let decision = decide(&op.feegrant, self.now);
        let action = decision.action();
        debug!(address = %op.address, %action, ?decision, "decided");

        let mut invocations = Vec::new();
        for &kind in action.calls() {
            let command =
                self.synthesizer
                    .command(kind, &op.address, &op.feegrant, batch.message_count());
            debug!(
                address = %op.address,
                action = command.action.name(),
                gas = command.flags.gas,
                "running feegrant command"
            );

            let result: Result<usize, InvocationError> = self
                .source
                .execute(&command)
                .map_err(InvocationError::from)
                .and_then(|output| batch.absorb(output).map_err(InvocationError::from));

            invocations.push(match result {
                Ok(messages) => Invocation::Applied { kind, messages },
                Err(err) => {
                    warn!(
                        address = %op.address,
                        action = command.action.name(),
                        error = %err,
                        "feegrant command failed, continuing without its messages"
                    );
                    Invocation::Failed {
                        kind,
                        error: err.to_string(),
                    }
                }
            });
        }

        OperatorOutcome {
            address: op.address.clone(),
            name: op.name.clone(),
            state: op.feegrant.clone(),
            decision,
            invocations,
        }
    }
}
