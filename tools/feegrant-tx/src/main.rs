use anyhow::{Context, Result};
use clap::Parser;
use feegrant_reconciler::{BatchOutcome, CommandSynthesizer, Reconciler};
use feegrant_types::AccountSource;
use time::OffsetDateTime;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod account;
mod config;
mod daemon;
mod keyring;
mod output;

use account::RestAccountSource;
use config::{load_operators, Cli};
use daemon::DaemonCli;
use output::Published;

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    cli.validate()?;
    let mut operators = load_operators(&cli)?;

    let mut daemon = DaemonCli::new(
        cli.daemon_name.clone(),
        cli.daemon_home.clone(),
        cli.keyring_backend.clone(),
    );
    if !cli.skip_keyring {
        let pubkeys = keyring::signer_pubkeys(cli.total_signers, |var| std::env::var(var).ok())?;
        keyring::ensure_multisig_key(&daemon, &cli.key_name, &pubkeys, cli.multisig_threshold)?;
    }

    let accounts = RestAccountSource::new(&cli.rest_url, cli.rest_timeout())?;
    let account = accounts
        .account(&cli.granter)
        .with_context(|| format!("failed to fetch account data for {}", cli.granter))?;
    info!(
        granter = %cli.granter,
        account_number = account.account_number,
        sequence = account.sequence,
        "fetched granter account"
    );

    let synthesizer = CommandSynthesizer::new(
        cli.granter.clone(),
        cli.tx_flags(account),
        cli.grant_terms(),
        cli.gas_schedule(),
    );
    let report =
        Reconciler::new(synthesizer, &mut daemon, OffsetDateTime::now_utc()).run(&mut operators);

    for operator in &report.operators {
        println!("{operator}");
    }

    match &report.outcome {
        BatchOutcome::Transaction(tx) => {
            println!("Batched tx messages:");
            println!(
                "{}",
                serde_json::to_string_pretty(tx).context("failed serialising transaction")?
            );
        }
        BatchOutcome::NothingToDo => println!("No final transaction generated."),
    }

    if let Some(path) = &cli.output {
        match output::publish_outcome(path, &report.outcome)? {
            Published::Written => info!(path = %path.display(), "wrote unsigned transaction"),
            Published::RemovedStale => warn!(
                path = %path.display(),
                "nothing to do, removed unsigned transaction left by an earlier run"
            ),
            Published::NothingToDo => {}
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
