mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fmdb_config::{ConfigError, Profile};
use fmdb_core::{Facility, StoreConfig};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a store connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        cmd => {
            let facility = Facility::new(build_store_config(&cli.global)?)?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &facility, &cli.global).await
        }
    }
}

/// Build a `StoreConfig` from the config file, profile, and CLI overrides.
fn build_store_config(global: &GlobalOpts) -> Result<StoreConfig, CliError> {
    let cfg = fmdb_config::load_config()?;

    let (name, mut profile) = match fmdb_config::select_profile(&cfg, global.profile.as_deref()) {
        Ok(found) => found,
        // --address alone is enough to talk to a store
        Err(ConfigError::ProfileNotFound { name }) if global.address.is_some() => {
            (name, Profile::default())
        }
        Err(ConfigError::ProfileNotFound { name }) => {
            if cfg.profiles.is_empty() {
                return Err(CliError::NoConfig {
                    path: fmdb_config::config_path().display().to_string(),
                });
            }
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name,
                available: available.join(", "),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(ref address) = global.address {
        profile.address.clone_from(address);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    Ok(fmdb_config::profile_to_store_config(&profile, &name, &cfg.defaults)?)
}
