//! Page-level controllers for the dashboard.
//!
//! Each page binds the generic list machinery to one remote collection and
//! adds the page's own actions (save, create, revoke, detail lookup).

mod api_keys;
mod settings;
mod transactions;
mod treasury;

pub use api_keys::{ApiKeySource, ApiKeysPage};
pub use settings::SettingsPage;
pub use transactions::{TransactionSource, TransactionsPage};
pub use treasury::{PositionSource, TreasuryPage, TreasurySummary};
