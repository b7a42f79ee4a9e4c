use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "paydash")]
#[command(about = "Manage payments settings, API keys, treasury and transactions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// CLI profile name (defaults to PAYDASH_PROFILE, then the active profile)
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Override the API base URL for this invocation
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in, check, or end the session for a profile
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Show or update company settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },
    /// Manage API keys
    Keys {
        #[command(subcommand)]
        command: Option<KeysCommands>,
    },
    /// Show treasury positions and aggregates
    Treasury {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Browse transaction history
    #[command(alias = "tx")]
    Transactions {
        #[command(subcommand)]
        command: Option<TransactionCommands>,
    },
    /// Request or look up payments
    Payments {
        #[command(subcommand)]
        command: PaymentCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in with email/password and store the session in the keychain
    Login {
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password (read from stdin when omitted)
        #[arg(long, value_name = "PASSWORD")]
        password: Option<String>,
    },
    /// Show whether the profile has a stored session
    Status,
    /// End the session and clear it from the keychain
    Logout,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update a profile
    Init {
        /// API base URL, e.g. https://pay.example.com
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved profile configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show company settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update editable settings; omitted fields keep their current value
    Update {
        #[arg(long, value_name = "NAME")]
        company_name: Option<String>,
        #[arg(long, value_name = "EMAIL")]
        email: Option<String>,
        #[arg(long, value_name = "URL")]
        website: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum KeysCommands {
    /// List API keys
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a key and print its secret once
    Create {
        /// Display name for the key
        name: String,
    },
    /// Revoke a key by id or key prefix
    Revoke {
        /// Key id or key prefix
        key: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum TransactionCommands {
    /// List one page of transactions
    List {
        #[command(flatten)]
        query: TransactionListArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one transaction with its metadata
    Show {
        /// Transaction id (UUID)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Page through transactions interactively
    Browse {
        #[command(flatten)]
        query: TransactionListArgs,
    },
}

#[derive(Subcommand)]
pub enum PaymentCommands {
    /// Request a payment from a customer
    Create {
        /// Amount in major units, e.g. 12.50
        #[arg(long)]
        amount: f64,
        /// Three-letter currency code
        #[arg(long, default_value = "USD")]
        currency: String,
        /// Customer email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Free-form JSON metadata
        #[arg(long, value_name = "JSON")]
        metadata: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one payment
    Show {
        /// Payment id (UUID)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Clone, Debug, Default)]
pub struct TransactionListArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Match customer email or status
    #[arg(short, long)]
    pub search: Option<String>,
    /// Only show this status (pending, settled, failed)
    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,
    /// Rows per page (at most 100)
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,
}
