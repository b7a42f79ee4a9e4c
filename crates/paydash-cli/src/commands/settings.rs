use paydash_core::dashboard::SettingsPage;
use paydash_core::models::{Settings, SettingsUpdate};

use crate::cli::SettingsCommands;
use crate::commands::common::Context;
use crate::error::CliError;

pub async fn run_settings(
    command: Option<SettingsCommands>,
    context: Context,
) -> Result<(), CliError> {
    context.require_session()?;
    let page = SettingsPage::new(context.guard, context.api);

    match command.unwrap_or(SettingsCommands::Show { json: false }) {
        SettingsCommands::Show { json } => {
            let settings = page.load().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                for line in format_settings_lines(&settings) {
                    println!("{line}");
                }
            }
        }
        SettingsCommands::Update {
            company_name,
            email,
            website,
        } => {
            let current = page.load().await?;
            let update = merge_update(&current, company_name, email, website);
            let saved = page.save(update).await?;
            println!("Settings saved");
            for line in format_settings_lines(&saved) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

/// Starts from the stored record so omitted flags keep their value.
pub fn merge_update(
    current: &Settings,
    company_name: Option<String>,
    email: Option<String>,
    website: Option<String>,
) -> SettingsUpdate {
    let mut update = SettingsUpdate::from(current);
    if let Some(company_name) = company_name {
        update.company_name = company_name;
    }
    if let Some(email) = email {
        update.email = email;
    }
    if let Some(website) = website {
        update.website = website;
    }
    update
}

pub fn format_settings_lines(settings: &Settings) -> Vec<String> {
    vec![
        format!("company:      {}", settings.company_name),
        format!("email:        {}", settings.email),
        format!(
            "website:      {}",
            if settings.website.is_empty() {
                "-"
            } else {
                &settings.website
            }
        ),
        format!(
            "registration: {}",
            settings.registration_number.as_deref().unwrap_or("-")
        ),
        format!("kyc:          {}", settings.kyc_status.as_str()),
    ]
}
