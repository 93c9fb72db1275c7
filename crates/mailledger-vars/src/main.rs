//! `mailledger-vars` - Inspect the `MailLedger` option catalogue
//!
//! Loads every option, applies `--set` overrides and prints the result as
//! config lines or JSON.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use anyhow::{Context, Result, bail};
use clap::Parser;
use mailledger_config::{Account, ConfigSet, DumpFlags, dump_config, dump_entries};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mailledger-vars", about = "Dump the MailLedger option catalogue")]
struct Cli {
    /// Create an account scope with this name
    #[arg(short, long)]
    account: Option<String>,

    /// Set an option before dumping (`name=value`, repeatable)
    #[arg(short, long = "set", value_name = "NAME=VALUE")]
    set: Vec<String>,

    /// Print sensitive values instead of hiding them
    #[arg(long)]
    show_sensitive: bool,

    /// Only options that differ from their default
    #[arg(short, long)]
    changed: bool,

    /// Show each option's default
    #[arg(short, long)]
    defaults: bool,

    /// Include account overlays
    #[arg(short, long)]
    overlays: bool,

    /// Print JSON instead of config lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn dump_flags(&self) -> DumpFlags {
        let mut flags = DumpFlags::empty();
        flags.set(DumpFlags::HIDE_SENSITIVE, !self.show_sensitive);
        flags.set(DumpFlags::ONLY_CHANGED, self.changed);
        flags.set(DumpFlags::SHOW_DEFAULTS, self.defaults);
        flags.set(DumpFlags::SHOW_OVERLAYS, self.overlays || self.account.is_some());
        flags
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailledger_vars=info,mailledger_config=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut cs = mailledger_vars::config_set("main").context("Failed to load options")?;

    let account = match &cli.account {
        Some(name) => {
            let account = Account::new(&mut cs, name, mailledger_vars::ACCOUNT_VARS)
                .with_context(|| format!("Failed to create account {name}"))?;
            info!(account = %name, "Created account scope");
            Some(account)
        }
        None => None,
    };

    let result = apply_and_dump(&mut cs, &cli);

    if let Some(account) = account {
        account
            .free(&mut cs)
            .context("Failed to release account scope")?;
    }
    result
}

fn apply_and_dump(cs: &mut ConfigSet, cli: &Cli) -> Result<()> {
    for assignment in &cli.set {
        let Some((name, value)) = assignment.split_once('=') else {
            bail!("Expected NAME=VALUE, got {assignment}");
        };
        let outcome = cs
            .set_string(name.trim(), value)
            .with_context(|| format!("Failed to set {}", name.trim()))?;
        if let Some(message) = outcome.message {
            warn!(variable = %name.trim(), "{message}");
        }
    }

    let flags = cli.dump_flags();
    if cli.json {
        let entries = dump_entries(cs, flags)?;
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", dump_config(cs, flags)?);
    }
    Ok(())
}
