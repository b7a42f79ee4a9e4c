//! Domain models for the dashboard pages

mod api_key;
mod payment;
mod settings;
mod transaction;
mod treasury;

pub use api_key::{ApiKey, ApiKeyStatus, CreatedApiKey, OneTimeSecret};
pub use payment::{NewPayment, Payment};
pub use settings::{KycStatus, Settings, SettingsUpdate};
pub use transaction::{
    Transaction, TransactionDetail, TransactionId, TransactionPage, TransactionQuery,
    TransactionStatus,
};
pub use treasury::{
    average_apy, format_percentage, parse_percentage, BusLockBalance, PortfolioSummary,
    TreasuryPosition,
};
