use std::collections::HashMap;

use feegrant_types::OperatorSet;

/// Agreed desired state for an address listed under several grouping keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergedGrant {
    pub period_spend_limit: u64,
    pub enabled: bool,
}

/// Merge every occurrence of the same address so all copies carry the highest limit and are
/// enabled if any copy is enabled.
///
/// Returns the number of records that were rewritten.
pub fn merge_operator_groups(set: &mut OperatorSet) -> usize {
    let mut merged: HashMap<String, MergedGrant> = HashMap::new();
    for op in set.iter() {
        let entry = merged.entry(op.address.clone()).or_default();
        entry.period_spend_limit = entry.period_spend_limit.max(op.feegrant.period_spend_limit);
        entry.enabled |= op.feegrant.enabled;
    }

    let mut rewritten = 0;
    for op in set.iter_mut() {
        let Some(agreed) = merged.get(&op.address) else {
            continue;
        };
        let grant = &mut op.feegrant;
        if grant.period_spend_limit != agreed.period_spend_limit || grant.enabled != agreed.enabled {
            tracing::debug!(
                address = %op.address,
                from_limit = grant.period_spend_limit,
                to_limit = agreed.period_spend_limit,
                from_enabled = grant.enabled,
                to_enabled = agreed.enabled,
                "merging divergent operator entry"
            );
            grant.period_spend_limit = agreed.period_spend_limit;
            grant.enabled = agreed.enabled;
            rewritten += 1;
        }
    }
    rewritten
}
