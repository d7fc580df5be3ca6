use std::process::{Command, Stdio};

use feegrant_types::{FeegrantCommand, MessageSource, SourceError};
use serde_json::Value;
use tracing::debug;

/// The chain daemon binary (eg `gaiad`), invoked with an explicit argument vector.
#[derive(Clone, Debug)]
pub struct DaemonCli {
    program: String,
    home: String,
    keyring_backend: String,
}

impl DaemonCli {
    pub fn new(program: String, home: String, keyring_backend: String) -> Self {
        Self {
            program,
            home,
            keyring_backend,
        }
    }

    fn run(&self, args: &[String]) -> Result<String, SourceError> {
        debug!(program = %self.program, ?args, "running daemon command");
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| SourceError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SourceError::CommandFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn keys_args(&self, sub: &[&str]) -> Vec<String> {
        let mut args = vec!["--home".to_string(), self.home.clone(), "keys".to_string()];
        args.extend(sub.iter().map(|s| s.to_string()));
        args.extend([
            "--keyring-backend".to_string(),
            self.keyring_backend.clone(),
            "--keyring-dir".to_string(),
            self.home.clone(),
        ]);
        args
    }

    /// Names of the keys in the local keyring.
    pub fn key_names(&self) -> Result<Vec<String>, SourceError> {
        let mut args = self.keys_args(&["list"]);
        args.extend(["--output".to_string(), "json".to_string()]);
        parse_key_names(&self.run(&args)?)
    }

    /// Import a signer's secp256k1 public key (base64) under `name`.
    pub fn add_pubkey(&self, name: &str, pubkey_b64: &str) -> Result<(), SourceError> {
        let pubkey = serde_json::json!({
            "@type": "/cosmos.crypto.secp256k1.PubKey",
            "key": pubkey_b64,
        })
        .to_string();
        let args = self.keys_args(&["add", name, "--pubkey", &pubkey]);
        self.run(&args).map(|_| ())
    }

    pub fn add_multisig(
        &self,
        name: &str,
        members: &[String],
        threshold: usize,
    ) -> Result<(), SourceError> {
        let members = members.join(",");
        let threshold = threshold.to_string();
        let args = self.keys_args(&[
            "add",
            name,
            "--multisig",
            &members,
            "--multisig-threshold",
            &threshold,
        ]);
        self.run(&args).map(|_| ())
    }
}

impl MessageSource for DaemonCli {
    fn execute(&mut self, command: &FeegrantCommand) -> Result<Value, SourceError> {
        let stdout = self.run(&command.args())?;
        parse_tx_output(&stdout)
    }
}

/// Parse the JSON document printed by `tx ... --generate-only --output json`.
pub fn parse_tx_output(stdout: &str) -> Result<Value, SourceError> {
    serde_json::from_str(stdout.trim())
        .map_err(|e| SourceError::MalformedOutput(format!("transaction is not JSON: {e}")))
}

/// Parse `keys list --output json`.
pub fn parse_key_names(stdout: &str) -> Result<Vec<String>, SourceError> {
    let keys: Value = serde_json::from_str(stdout.trim())
        .map_err(|e| SourceError::MalformedOutput(format!("key list is not JSON: {e}")))?;
    let Value::Array(keys) = keys else {
        return Err(SourceError::MalformedOutput(
            "key list is not an array".to_string(),
        ));
    };
    Ok(keys
        .iter()
        .filter_map(|key| key.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}
