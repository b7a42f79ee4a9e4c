use std::env;

use paydash_core::config::normalize_text_option;
use serde::Serialize;

use crate::cli::ConfigCommands;
use crate::config_profiles::{CliProfilesConfig, API_URL_ENV};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            api_base_url,
            no_activate,
        } => run_config_init(global_profile, api_base_url, no_activate),
        ConfigCommands::Show { json } => run_config_show(global_profile, json),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    api_base_url: Option<String>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    apply_profile_init(&mut config, &profile_name, api_base_url, no_activate)?;

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    if config
        .profile(&profile_name)
        .and_then(|profile| profile.api_base_url.as_deref())
        .is_some()
    {
        println!("Run `paydash auth login --email <email>` to sign in.");
    } else {
        println!("Profile '{profile_name}' is missing: api_base_url");
    }
    Ok(())
}

/// Merges the explicit URL, then `PAYDASH_API_URL`, over the existing profile.
pub fn apply_profile_init(
    config: &mut CliProfilesConfig,
    profile_name: &str,
    api_base_url: Option<String>,
    no_activate: bool,
) -> Result<(), CliError> {
    let merged_api_base_url = normalize_text_option(api_base_url)
        .or_else(|| normalize_text_option(env::var(API_URL_ENV).ok()));

    let profile = config.profile_mut_or_default(profile_name);
    if let Some(url) = merged_api_base_url {
        profile
            .set_api_base_url(&url)
            .map_err(CliError::Config)?;
    }

    if !no_activate {
        config.active_profile = Some(profile_name.to_string());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ProfileView<'a> {
    profile: &'a str,
    active: bool,
    api_base_url: Option<&'a str>,
}

fn run_config_show(global_profile: Option<&str>, as_json: bool) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global_profile);
    let view = ProfileView {
        profile: &profile_name,
        active: config.active_profile.as_deref() == Some(profile_name.as_str()),
        api_base_url: config
            .profile(&profile_name)
            .and_then(|profile| profile.api_base_url.as_deref()),
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!(
            "profile:      {}{}",
            view.profile,
            if view.active { " (active)" } else { "" }
        );
        println!("api_base_url: {}", view.api_base_url.unwrap_or("(not set)"));
        for name in config.profiles.keys().filter(|name| **name != profile_name) {
            println!("other:        {name}");
        }
    }
    Ok(())
}
