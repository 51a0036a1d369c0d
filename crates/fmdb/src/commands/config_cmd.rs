//! Config subcommand handlers. None of these touch the document store.

use std::fmt::Write as _;

use fmdb_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Format config for display, masking the password.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let d = &cfg.defaults;
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", d.output);
    let _ = writeln!(out, "insecure = {}", d.insecure);
    let _ = writeln!(out, "timeout = {}", d.timeout);
    let _ = writeln!(out, "find_limit = {}", d.find_limit);
    let _ = writeln!(out, "bulk_limit = {}", d.bulk_limit);
    let _ = writeln!(out, "cascade_concurrency = {}", d.cascade_concurrency);
    let _ = writeln!(out, "id_delimiter = \"{}\"", d.id_delimiter);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "address = \"{}\"", p.address);
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&fmdb_config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = fmdb_config::load_config()?;
            output::print_output(format_config_redacted(&cfg).trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword { profile } => {
            let cfg = fmdb_config::load_config()?;
            let name = profile
                .or_else(|| global.profile.clone())
                .or(cfg.default_profile)
                .unwrap_or_else(|| "default".into());

            let password = dialoguer::Password::new()
                .with_prompt(format!("Password for profile '{name}'"))
                .interact()
                .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
            fmdb_config::store_password(&name, &password)?;
            if !global.quiet {
                eprintln!("Password stored in system keyring for profile '{name}'");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmdb_config::Profile;

    #[test]
    fn test_password_is_masked() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "campus".into(),
            Profile {
                address: "https://couch.example.edu:6984".into(),
                username: Some("fmdb".into()),
                password: Some("hunter22".into()),
                ..Profile::default()
            },
        );

        let shown = format_config_redacted(&cfg);
        assert!(shown.contains("[profiles.campus]"));
        assert!(shown.contains("password = \"****\""));
        assert!(!shown.contains("hunter22"));
    }
}
