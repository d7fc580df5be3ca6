use std::{fs, path::PathBuf, time::Duration};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use feegrant_reconciler::{GasSchedule, GrantTerms};
use feegrant_types::{AccountData, OperatorSet, TxFlags};
use regex::Regex;
use tracing::warn;

/// Reconcile relayer fee grants and print one unsigned multisig transaction with every
/// required grant/revoke message.
///
/// Messages are generated offline with the chain daemon (`tx feegrant ... --generate-only`); the
/// resulting transaction still has to be signed by the multisig signers and broadcast.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Operator file: an array of operators, or an object of IBC path -> operators.
    #[arg(long, env = "OPERATORS_FILE_PATH", default_value = "operators.json")]
    pub operators_file: PathBuf,

    /// Account paying the fees (the multisig address).
    #[arg(long, env = "GRANTER_ACCOUNT")]
    pub granter: String,

    #[arg(long, env = "DAEMON_NAME", default_value = "gaiad")]
    pub daemon_name: String,

    /// Daemon home; also used as the keyring directory.
    #[arg(long, env = "DAEMON_HOME", default_value = "../utils/.gaia")]
    pub daemon_home: String,

    #[arg(long, env = "KEYRING_BACKEND", default_value = "test")]
    pub keyring_backend: String,

    #[arg(long, env = "CHAIN_ID", default_value = "cosmoshub-4")]
    pub chain_id: String,

    #[arg(long, env = "GAS_PRICES", default_value = "0.005uatom")]
    pub gas_prices: String,

    /// Message type URLs the grant is restricted to (comma separated). Empty allows all.
    #[arg(long, env = "ALLOWED_MESSAGES", value_delimiter = ',', default_value = "")]
    pub allowed_messages: Vec<String>,

    #[arg(long, env = "RPC_URL", default_value = "https://rpc.cosmos.directory:443/cosmoshub")]
    pub rpc_url: String,

    #[arg(long, env = "REST_URL", default_value = "https://rest.cosmos.directory:443/cosmoshub")]
    pub rest_url: String,

    /// Timeout for the account lookup, in seconds.
    #[arg(long, env = "REST_TIMEOUT_SECS", default_value_t = 10)]
    pub rest_timeout_secs: u64,

    /// Length of one spend period, in seconds.
    #[arg(long, env = "PERIOD_DURATION", default_value_t = 86_400)]
    pub period_duration: u64,

    /// Denomination appended to period spend limits.
    #[arg(long, env = "DENOM", default_value = "uatom")]
    pub denom: String,

    #[arg(long, env = "TOTAL_SIGNERS", default_value_t = 5)]
    pub total_signers: usize,

    #[arg(long, env = "MULTISIG_THRESHOLD", default_value_t = 3)]
    pub multisig_threshold: usize,

    /// Local keyring name of the multisig key.
    #[arg(long, env = "MULTISIG_KEY_NAME", default_value = "multisig-relayer-feegrant")]
    pub key_name: String,

    #[arg(long, env = "BASE_GAS", default_value_t = 80_000)]
    pub base_gas: u64,

    /// Extra gas per message already in the batch.
    #[arg(long, env = "GAS_STEP", default_value_t = 40_000)]
    pub gas_step: u64,

    /// Added to the fetched account sequence.
    #[arg(long, env = "SEQUENCE_OFFSET", default_value_t = 1)]
    pub sequence_offset: u64,

    /// Also write the transaction JSON here.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Do not check or create the local multisig key.
    #[arg(long)]
    pub skip_keyring: bool,
}

impl Cli {
    pub fn validate(&self) -> Result<()> {
        if self.granter.trim().is_empty() {
            return Err(anyhow!("GRANTER_ACCOUNT / --granter is not set or empty"));
        }
        if self.multisig_threshold == 0 || self.multisig_threshold > self.total_signers {
            return Err(anyhow!(
                "invalid multisig threshold {} for {} signers",
                self.multisig_threshold,
                self.total_signers
            ));
        }
        Ok(())
    }

    pub fn allowed_messages(&self) -> Vec<String> {
        self.allowed_messages
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn grant_terms(&self) -> GrantTerms {
        GrantTerms {
            period_seconds: self.period_duration,
            denom: self.denom.clone(),
            allowed_messages: self.allowed_messages(),
        }
    }

    pub fn gas_schedule(&self) -> GasSchedule {
        GasSchedule {
            base: self.base_gas,
            step: self.gas_step,
        }
    }

    pub fn rest_timeout(&self) -> Duration {
        Duration::from_secs(self.rest_timeout_secs)
    }

    /// Flags for every command of the run. The gas field is set by the synthesizer.
    pub fn tx_flags(&self, account: AccountData) -> TxFlags {
        TxFlags {
            home: self.daemon_home.clone(),
            from: self.key_name.clone(),
            keyring_backend: self.keyring_backend.clone(),
            chain_id: self.chain_id.clone(),
            gas: self.base_gas,
            gas_prices: self.gas_prices.clone(),
            node: self.rpc_url.clone(),
            account_number: account.account_number,
            sequence: account.sequence.saturating_add(self.sequence_offset),
        }
    }
}

pub fn load_operators(cli: &Cli) -> Result<OperatorSet> {
    let path = &cli.operators_file;
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    let operators = OperatorSet::from_json_str(&raw)
        .with_context(|| format!("failed parsing operators in {}", path.display()))?;
    for address in unusual_addresses(&cli.granter, &operators)? {
        warn!(%address, "address does not look like a bech32 account address");
    }
    Ok(operators)
}

/// Addresses that are not shaped like a bech32 account address (single-case, `1` separator,
/// bech32 data charset), prefixed with their grouping key.
///
/// Addresses are opaque to the reconciler, so these only warrant a warning.
pub fn unusual_addresses(granter: &str, operators: &OperatorSet) -> Result<Vec<String>> {
    let re = Regex::new(
        r"^(?:[a-z][a-z0-9]*1[02-9ac-hj-np-z]{38,58}|[A-Z][A-Z0-9]*1[02-9AC-HJ-NP-Z]{38,58})$",
    )?;
    let mut unusual = Vec::new();
    if !re.is_match(granter) {
        unusual.push(format!("granter: `{granter}`"));
    }
    for group in &operators.groups {
        for op in &group.operators {
            if !re.is_match(&op.address) {
                unusual.push(format!("{}: `{}`", group.key, op.address));
            }
        }
    }
    Ok(unusual)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRANTER: &str = "cosmos1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5lzv7xu";
    const OPERATOR: &str = "cosmos1zg69v7ys40x77y352eufp27daufrg4ncnjqz7q";

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["feegrant-tx", "--granter", GRANTER];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_cosmoshub() {
        let cli = cli(&[]);
        cli.validate().unwrap();
        assert_eq!(cli.daemon_name, "gaiad");
        assert_eq!(cli.chain_id, "cosmoshub-4");
        assert_eq!(cli.period_duration, 86_400);
        assert_eq!(cli.gas_schedule(), GasSchedule::default());
        assert!(cli.allowed_messages().is_empty());
    }

    #[test]
    fn sequence_offset_is_applied_once() {
        let cli = cli(&["--sequence-offset", "2"]);
        let flags = cli.tx_flags(AccountData {
            account_number: 3,
            sequence: 10,
        });
        assert_eq!(flags.sequence, 12);
        assert_eq!(flags.account_number, 3);
        assert_eq!(flags.from, "multisig-relayer-feegrant");
    }

    #[test]
    fn allowed_messages_are_split_and_trimmed() {
        let cli = cli(&[
            "--allowed-messages",
            "/ibc.core.client.v1.MsgUpdateClient, /ibc.core.channel.v1.MsgRecvPacket",
        ]);
        assert_eq!(
            cli.grant_terms().allowed_messages,
            [
                "/ibc.core.client.v1.MsgUpdateClient",
                "/ibc.core.channel.v1.MsgRecvPacket"
            ]
        );
    }

    #[test]
    fn threshold_must_fit_signers() {
        assert!(cli(&["--multisig-threshold", "0"]).validate().is_err());
        assert!(cli(&["--total-signers", "2", "--multisig-threshold", "3"])
            .validate()
            .is_err());
        let blank = Cli::try_parse_from(["feegrant-tx", "--granter", " "]).unwrap();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn unusual_addresses_are_reported_not_rejected() {
        let ok = OperatorSet::from_json_str(&format!(r#"[{{"address":"{OPERATOR}"}}]"#)).unwrap();
        assert!(unusual_addresses(GRANTER, &ok).unwrap().is_empty());
        assert!(unusual_addresses(&GRANTER.to_uppercase(), &ok).unwrap().is_empty());
        assert_eq!(
            unusual_addresses("not-an-address", &ok).unwrap(),
            ["granter: `not-an-address`"]
        );

        let odd = OperatorSet::from_json_str(
            r#"{"transfer/channel-141": [{"address": "cosmos1INVALID"}]}"#,
        )
        .unwrap();
        let unusual = unusual_addresses(GRANTER, &odd).unwrap();
        assert_eq!(unusual, ["transfer/channel-141: `cosmos1INVALID`"]);
    }

    #[test]
    fn unusual_address_does_not_abort_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("operators.json");
        fs::write(&path, r#"[{"address":"relayer-without-bech32"}]"#).unwrap();
        let args = cli(&["--operators-file", path.to_str().unwrap()]);

        let set = load_operators(&args).unwrap();
        assert_eq!(set.groups[0].operators[0].address, "relayer-without-bech32");
    }

    #[test]
    fn operators_are_loaded_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("operators.json");
        fs::write(
            &path,
            format!(r#"[{{"address":"{OPERATOR}","name":"relayer","feegrant":{{"enabled":true,"period_spend_limit":5}}}}]"#),
        )
        .unwrap();
        let args = cli(&["--operators-file", path.to_str().unwrap()]);

        let set = load_operators(&args).unwrap();
        assert_eq!(set.len(), 1);

        let missing = cli(&["--operators-file", "/nonexistent/operators.json"]);
        assert!(load_operators(&missing).is_err());
    }
}
