//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crmdesk_core::DEFAULT_BASE_URL;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile, TokenStorage};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display as TOML, with each profile's session file.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;

    let mut out = toml::to_string_pretty(cfg)
        .unwrap_or_else(|e| format!("# failed to render config: {e}\n"));

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    if !names.is_empty() {
        let _ = writeln!(out);
        for name in names {
            let _ = writeln!(
                out,
                "# session[{name}] = {}",
                config::session_path(name).display()
            );
        }
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("crmdesk configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_url: String = Input::new()
                .with_prompt("API URL")
                .default(DEFAULT_BASE_URL.into())
                .interact_text()
                .map_err(prompt_err)?;
            url::Url::parse(&api_url).map_err(|e| CliError::Validation {
                field: "api_url".into(),
                reason: e.to_string(),
            })?;

            let email: String = Input::new()
                .with_prompt("Login email (optional)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let storage_choices = &[
                "Session file (default)",
                "System keyring",
            ];
            let token_storage = match Select::new()
                .with_prompt("Where to keep the login token?")
                .items(storage_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?
            {
                0 => TokenStorage::File,
                _ => TokenStorage::Keyring,
            };

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    api_url,
                    email: (!email.trim().is_empty()).then(|| email.trim().to_owned()),
                    token_storage,
                    ..Profile::default()
                },
            );
            if cfg.profiles.len() == 1 {
                cfg.default_profile = Some(profile_name.clone());
            }
            config::save_config(&cfg)?;

            eprintln!("\n   Profile '{profile_name}' saved to {}", config_path.display());
            eprintln!("   Next: crmdesk --profile {profile_name} login");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(global.output(), &cfg, format_config, |c| {
                c.default_profile.clone().unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Use: switch default profile ─────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            cfg.profile(&name)?;
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::print_status(&format!("Default profile set to '{name}'"), global);
            Ok(())
        }
    }
}
