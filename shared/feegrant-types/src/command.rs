/// Flags shared by every `tx feegrant` invocation of one run.
///
/// Offline signing context: commands are generated with `--offline --generate-only`, so the
/// account number and sequence must be supplied explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxFlags {
    pub home: String,
    pub from: String,
    pub keyring_backend: String,
    pub chain_id: String,
    /// Advisory gas limit, recomputed by the synthesizer before each invocation.
    pub gas: u64,
    pub gas_prices: String,
    pub node: String,
    pub account_number: u64,
    pub sequence: u64,
}

impl TxFlags {
    fn push_args(&self, args: &mut Vec<String>) {
        args.extend([
            "--home".to_string(),
            self.home.clone(),
            "--from".to_string(),
            self.from.clone(),
            "--keyring-backend".to_string(),
            self.keyring_backend.clone(),
            "--keyring-dir".to_string(),
            self.home.clone(),
            "--chain-id".to_string(),
            self.chain_id.clone(),
            "--gas".to_string(),
            self.gas.to_string(),
            "--gas-prices".to_string(),
            self.gas_prices.clone(),
            "--node".to_string(),
            self.node.clone(),
            "--offline".to_string(),
            "--output".to_string(),
            "json".to_string(),
            "--yes".to_string(),
            "--generate-only".to_string(),
            "--sequence".to_string(),
            self.sequence.to_string(),
            "--account-number".to_string(),
            self.account_number.to_string(),
        ]);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeegrantAction {
    Revoke,
    Grant {
        expiration: Option<String>,
        /// Period length in seconds.
        period: Option<u64>,
        period_limit: Option<u64>,
        denom: String,
        allowed_messages: Vec<String>,
    },
}

impl FeegrantAction {
    pub fn name(&self) -> &'static str {
        match self {
            FeegrantAction::Revoke => "revoke",
            FeegrantAction::Grant { .. } => "grant",
        }
    }
}

/// Structured description of one `tx feegrant` invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeegrantCommand {
    pub granter: String,
    pub grantee: String,
    pub action: FeegrantAction,
    pub flags: TxFlags,
}

impl FeegrantCommand {
    /// Argument vector for the chain daemon, without the program name.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "tx".to_string(),
            "feegrant".to_string(),
            self.action.name().to_string(),
            self.granter.clone(),
            self.grantee.clone(),
        ];

        if let FeegrantAction::Grant {
            expiration,
            period,
            period_limit,
            denom,
            allowed_messages,
        } = &self.action
        {
            if let Some(expiration) = expiration {
                args.push("--expiration".to_string());
                args.push(expiration.clone());
            }
            match (period, period_limit) {
                (Some(period), Some(limit)) if *period > 0 && *limit > 0 => {
                    args.push("--period".to_string());
                    args.push(period.to_string());
                    args.push("--period-limit".to_string());
                    args.push(format!("{limit}{denom}"));
                }
                _ => {}
            }
            if !allowed_messages.is_empty() {
                args.push("--allowed-messages".to_string());
                args.push(allowed_messages.join(","));
            }
        }

        self.flags.push_args(&mut args);
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags() -> TxFlags {
        TxFlags {
            home: "/keys".to_string(),
            from: "multisig".to_string(),
            keyring_backend: "test".to_string(),
            chain_id: "cosmoshub-4".to_string(),
            gas: 80_000,
            gas_prices: "0.005uatom".to_string(),
            node: "https://rpc.example:443".to_string(),
            account_number: 7,
            sequence: 42,
        }
    }

    fn position(args: &[String], flag: &str) -> Option<usize> {
        args.iter().position(|a| a == flag)
    }

    #[test]
    fn revoke_carries_no_grant_flags() {
        let cmd = FeegrantCommand {
            granter: "cosmos1granter".to_string(),
            grantee: "cosmos1grantee".to_string(),
            action: FeegrantAction::Revoke,
            flags: flags(),
        };
        let args = cmd.args();

        assert_eq!(
            &args[..5],
            ["tx", "feegrant", "revoke", "cosmos1granter", "cosmos1grantee"]
        );
        assert!(position(&args, "--expiration").is_none());
        assert!(position(&args, "--period").is_none());
        assert!(position(&args, "--period-limit").is_none());
        let seq = position(&args, "--sequence").unwrap();
        assert_eq!(args[seq + 1], "42");
        let acc = position(&args, "--account-number").unwrap();
        assert_eq!(args[acc + 1], "7");
        assert!(position(&args, "--generate-only").is_some());
    }

    #[test]
    fn grant_renders_period_limit_with_denom() {
        let cmd = FeegrantCommand {
            granter: "cosmos1granter".to_string(),
            grantee: "cosmos1grantee".to_string(),
            action: FeegrantAction::Grant {
                expiration: Some("2030-01-01T00:00:00Z".to_string()),
                period: Some(86_400),
                period_limit: Some(1_000),
                denom: "uatom".to_string(),
                allowed_messages: vec![
                    "/ibc.core.channel.v1.MsgRecvPacket".to_string(),
                    "/ibc.core.client.v1.MsgUpdateClient".to_string(),
                ],
            },
            flags: flags(),
        };
        let args = cmd.args();

        assert_eq!(args[2], "grant");
        let exp = position(&args, "--expiration").unwrap();
        assert_eq!(args[exp + 1], "2030-01-01T00:00:00Z");
        let period = position(&args, "--period").unwrap();
        assert_eq!(args[period + 1], "86400");
        let limit = position(&args, "--period-limit").unwrap();
        assert_eq!(args[limit + 1], "1000uatom");
        let allowed = position(&args, "--allowed-messages").unwrap();
        assert_eq!(
            args[allowed + 1],
            "/ibc.core.channel.v1.MsgRecvPacket,/ibc.core.client.v1.MsgUpdateClient"
        );
    }

    #[test]
    fn grant_with_zero_limit_omits_period_flags() {
        let cmd = FeegrantCommand {
            granter: "cosmos1granter".to_string(),
            grantee: "cosmos1grantee".to_string(),
            action: FeegrantAction::Grant {
                expiration: None,
                period: Some(86_400),
                period_limit: Some(0),
                denom: "uatom".to_string(),
                allowed_messages: Vec::new(),
            },
            flags: flags(),
        };
        let args = cmd.args();

        assert!(position(&args, "--expiration").is_none());
        assert!(position(&args, "--period").is_none());
        assert!(position(&args, "--period-limit").is_none());
        assert!(position(&args, "--allowed-messages").is_none());
    }
}
