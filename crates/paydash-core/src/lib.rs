//! paydash-core - Client library for the payments dashboard
//!
//! This crate holds the session-guarded data layer shared by every paydash
//! front end: the remote API boundary, the session store and guard, the
//! list view controller, and the page controllers built on top of them.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod list_view;
pub mod models;
pub mod mutation;
pub mod reveal;
pub mod session;

#[cfg(test)]
mod test_support;

pub use api::{ApiError, DashboardApi, HttpDashboardApi};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use list_view::{ListViewController, Phase};
pub use session::{Session, SessionGuard, SessionPersistence, SessionStore, UserProfile};
