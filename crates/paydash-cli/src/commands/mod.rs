pub mod auth_cmd;
pub mod common;
pub mod completions;
pub mod config;
pub mod keys;
pub mod payments;
pub mod settings;
pub mod transactions;
pub mod treasury;
