use chrono::DateTime;

use crate::auth::open_session_store;
use crate::cli::AuthCommands;
use crate::commands::common::{read_password, Context};
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub async fn run_auth(
    command: AuthCommands,
    global_profile: Option<&str>,
    api_url: Option<String>,
) -> Result<(), CliError> {
    match command {
        AuthCommands::Login { email, password } => {
            let context = Context::load(global_profile, api_url)?;
            let password = read_password(password)?;
            let session = context
                .guard
                .sign_in(&context.api, &email, &password)
                .await?;
            let email_label = session.profile.email.as_deref().unwrap_or("(no email)");
            println!(
                "Signed in profile '{}' as {email_label}",
                context.profile_name
            );
            Ok(())
        }
        AuthCommands::Status => {
            let config = CliProfilesConfig::load().map_err(CliError::Config)?;
            let profile_name = config.resolve_profile_name(global_profile);
            let store = open_session_store(&profile_name)?;

            if let Some(session) = store.current() {
                let email_label = session.profile.email.as_deref().unwrap_or("(no email)");
                let since = DateTime::from_timestamp(session.established_at, 0).map_or_else(
                    || session.established_at.to_string(),
                    |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                );
                println!("Profile '{profile_name}' is signed in as {email_label} (since {since})");
                if let Some(company) = session.profile.company_name.as_deref() {
                    println!("Company: {company}");
                }
            } else {
                println!("Profile '{profile_name}' is not signed in.");
            }
            Ok(())
        }
        AuthCommands::Logout => {
            let context = Context::load(global_profile, api_url)?;
            if context.guard.sign_out(&context.api).await? {
                println!("Signed out profile '{}'", context.profile_name);
            } else {
                println!("Profile '{}' was not signed in.", context.profile_name);
            }
            Ok(())
        }
    }
}
