use std::io::{self, BufRead, IsTerminal, Write};

use chrono::{DateTime, NaiveDateTime, Utc};
use paydash_core::models::{ApiKey, Transaction, TreasuryPosition};
use paydash_core::mutation::Confirm;
use paydash_core::{ClientConfig, HttpDashboardApi, SessionGuard};
use zeroize::Zeroizing;

use crate::auth::open_session_store;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

/// Everything a dashboard command needs: the resolved profile, an API
/// client, and the profile's session guard.
pub struct Context {
    pub profile_name: String,
    pub api: HttpDashboardApi,
    pub guard: SessionGuard,
    pub config: ClientConfig,
}

impl Context {
    pub fn load(global_profile: Option<&str>, api_url: Option<String>) -> Result<Self, CliError> {
        let config = CliProfilesConfig::load().map_err(CliError::Config)?;
        let profile_name = config.resolve_profile_name(global_profile);
        let base_url = config
            .resolve_api_base_url(&profile_name, api_url)
            .ok_or_else(|| CliError::NotConfigured(profile_name.clone()))?;
        let config = ClientConfig::new(base_url)?;
        let api = HttpDashboardApi::new(config.clone())?;
        let guard = SessionGuard::new(open_session_store(&profile_name)?);
        tracing::debug!("Using profile '{}' against {}", profile_name, api.base_url());

        Ok(Self {
            profile_name,
            api,
            guard,
            config,
        })
    }

    /// Rows per page: `limit` clamped to what the server accepts, or the
    /// configured default.
    pub fn page_size(&self, limit: Option<usize>) -> usize {
        limit.map_or(self.config.page_size, |limit| {
            self.config.clone().with_page_size(limit).page_size
        })
    }

    /// Fails early with a sign-in hint instead of a generic session error.
    pub fn require_session(&self) -> Result<(), CliError> {
        if self.guard.is_authenticated() {
            Ok(())
        } else {
            Err(CliError::NotSignedIn(self.profile_name.clone()))
        }
    }
}

/// Asks on stderr and reads the answer from stdin; anything but yes declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => parse_confirmation(&answer),
            Err(_) => false,
        }
    }
}

pub fn parse_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub fn read_password(explicit: Option<String>) -> Result<Zeroizing<String>, CliError> {
    if let Some(password) = explicit {
        return Ok(Zeroizing::new(password));
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprint!("Password: ");
        io::stderr().flush()?;
    }
    let mut line = Zeroizing::new(String::new());
    stdin.lock().read_line(&mut line)?;
    let password = Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_string());
    if password.is_empty() {
        return Err(CliError::EmptyPassword);
    }
    Ok(password)
}

/// Finds a key by exact id or by a unique id/prefix match.
pub fn resolve_key(keys: &[ApiKey], query: &str) -> Result<ApiKey, CliError> {
    let query = query.trim();
    if let Some(key) = keys.iter().find(|key| key.id == query) {
        return Ok(key.clone());
    }

    let matching = keys
        .iter()
        .filter(|key| key.id.starts_with(query) || key.key_prefix.starts_with(query))
        .collect::<Vec<_>>();
    match matching.as_slice() {
        [] => Err(CliError::KeyNotFound(query.to_string())),
        [key] => Ok((*key).clone()),
        many => {
            let options = many
                .iter()
                .take(3)
                .map(|key| key.key_prefix.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousKey(format!(
                "Key '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn format_key_lines(keys: &[ApiKey], now_ms: i64) -> Vec<String> {
    keys.iter()
        .map(|key| {
            let created = relative_label(&key.created_at, now_ms);
            let last_used = key
                .last_used
                .as_deref()
                .map_or_else(|| "never".to_string(), |raw| relative_label(raw, now_ms));
            format!(
                "{:<10}  {:<24}  {:<16}  {:<7}  created {:<10}  used {}",
                key.id,
                truncate(&key.name, 24),
                key.key_prefix,
                key.status.as_str(),
                created,
                last_used
            )
        })
        .collect()
}

pub fn format_position_lines(positions: &[TreasuryPosition]) -> Vec<String> {
    positions
        .iter()
        .map(|position| {
            format!(
                "{:<24}  {:<12}  {:>16}  {:>14.2}  {:>8}",
                truncate(&position.name, 24),
                truncate(&position.protocol, 12),
                position.balance,
                position.value,
                position.apy.trim()
            )
        })
        .collect()
}

pub fn format_transaction_lines(transactions: &[Transaction], now_ms: i64) -> Vec<String> {
    transactions
        .iter()
        .map(|tx| {
            let short_id = tx.id.chars().take(13).collect::<String>();
            let email = tx.customer_email.as_deref().unwrap_or("-");
            format!(
                "{short_id:<13}  {:<10}  {:>14}  {:<8}  {:<28}  {}",
                truncate(&tx.tx_type, 10),
                format!("{} {}", tx.amount, tx.currency),
                tx.status.as_str(),
                truncate(email, 28),
                relative_label(&tx.created_at, now_ms)
            )
        })
        .collect()
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

/// Parses RFC 3339 or `YYYY-MM-DD HH:MM:SS` (assumed UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|date_time| date_time.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Relative age of a server timestamp, or the raw text when unparseable.
pub fn relative_label(raw: &str, now_ms: i64) -> String {
    parse_timestamp(raw).map_or_else(
        || raw.trim().to_string(),
        |date_time| format_relative_time(date_time.timestamp_millis(), now_ms),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
