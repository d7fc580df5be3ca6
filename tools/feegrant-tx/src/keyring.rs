use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::daemon::DaemonCli;

/// Read `SIGNER_1_PUBKEY` .. `SIGNER_<total>_PUBKEY` through `lookup`.
pub fn signer_pubkeys<F>(total: usize, lookup: F) -> Result<Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = Vec::new();
    let mut pubkeys = Vec::with_capacity(total);
    for i in 1..=total {
        let var = format!("SIGNER_{i}_PUBKEY");
        match lookup(&var).filter(|v| !v.trim().is_empty()) {
            Some(pubkey) => pubkeys.push(pubkey.trim().to_string()),
            None => missing.push(var),
        }
    }
    if !missing.is_empty() {
        return Err(anyhow!(
            "not all signer public keys are provided (missing {})",
            missing.join(", ")
        ));
    }
    Ok(pubkeys)
}

/// Signer key names in the local keyring, `ms1`..`msN`.
pub fn signer_key_names(total: usize) -> Vec<String> {
    (1..=total).map(|i| format!("ms{i}")).collect()
}

/// Make sure the multisig key the transaction is generated `--from` exists locally.
///
/// Returns `true` when the key had to be created.
pub fn ensure_multisig_key(
    daemon: &DaemonCli,
    key_name: &str,
    pubkeys: &[String],
    threshold: usize,
) -> Result<bool> {
    match daemon.key_names() {
        Ok(names) if names.iter().any(|n| n == key_name) => {
            info!(key = key_name, "multisig key already present");
            return Ok(false);
        }
        Ok(_) => {}
        Err(err) => warn!(error = %err, "could not list keys, recreating multisig key"),
    }

    let members = signer_key_names(pubkeys.len());
    for (name, pubkey) in members.iter().zip(pubkeys) {
        daemon
            .add_pubkey(name, pubkey)
            .with_context(|| format!("failed adding signer key {name}"))?;
    }
    daemon
        .add_multisig(key_name, &members, threshold)
        .with_context(|| format!("failed adding multisig key {key_name}"))?;
    info!(key = key_name, signers = members.len(), threshold, "created multisig key");
    Ok(true)
}
