use paydash_core::dashboard::ApiKeysPage;
use paydash_core::mutation::{AssumeYes, Feedback};

use crate::cli::KeysCommands;
use crate::commands::common::{format_key_lines, now_ms, resolve_key, Context, StdinConfirm};
use crate::error::CliError;

pub async fn run_keys(command: Option<KeysCommands>, context: Context) -> Result<(), CliError> {
    context.require_session()?;
    let mut page = ApiKeysPage::new(context.guard, context.api);

    match command.unwrap_or(KeysCommands::List { json: false }) {
        KeysCommands::List { json } => {
            page.refresh().await?;
            let keys = page.keys().items();
            if json {
                println!("{}", serde_json::to_string_pretty(&keys)?);
            } else if keys.is_empty() {
                println!("No API keys yet. Create one with `paydash keys create <name>`.");
            } else {
                for line in format_key_lines(&keys, now_ms()) {
                    println!("{line}");
                }
            }
        }
        KeysCommands::Create { name } => {
            page.create(&name).await?;
            if let Some((key, secret)) = page.creation().revealed() {
                println!("Created API key '{}' ({})", key.name, key.id);
                println!();
                println!("    {}", secret.expose());
                println!();
                println!("Store this secret now. It will not be shown again.");
            }
            if let Err(error) = page.close_reveal().await {
                tracing::warn!("Failed to reload API keys: {}", error);
            }
        }
        KeysCommands::Revoke { key, yes } => {
            page.refresh().await?;
            let target = resolve_key(&page.keys().items(), &key)?;
            let result = if yes {
                page.revoke(&target, &AssumeYes).await
            } else {
                page.revoke(&target, &StdinConfirm).await
            };
            match Feedback::from_result(&result, format!("Revoked API key {}", target.key_prefix)) {
                Some(Feedback::Success(message)) => println!("{message}"),
                None => println!("Cancelled"),
                Some(Feedback::Failure(_)) => {}
            }
            result?;
        }
    }
    Ok(())
}
