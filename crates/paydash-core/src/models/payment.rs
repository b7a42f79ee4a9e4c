//! Payment requests
//!
//! A created payment is stored server-side as a `payment` transaction, so it
//! shows up in the transaction history once the list is reloaded.

use serde::{Deserialize, Serialize};

use super::settings::email_pattern;
use super::TransactionStatus;
use crate::error::{Error, Result};

/// Body of `POST payments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub amount: f64,
    pub currency: String,
    pub customer_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl NewPayment {
    /// Checks the request before anything is sent.
    ///
    /// The currency is normalised to an upper-case ISO 4217 code and the
    /// email is trimmed.
    pub fn validated(self) -> Result<Self> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::Validation(
                "Amount must be a positive number".to_string(),
            ));
        }

        let currency = self.currency.trim().to_ascii_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::Validation(format!(
                "'{}' is not a three-letter currency code",
                self.currency.trim()
            )));
        }

        let customer_email = self.customer_email.trim().to_string();
        if customer_email.is_empty() {
            return Err(Error::Validation("Customer email is required".to_string()));
        }
        if !email_pattern().is_match(&customer_email) {
            return Err(Error::Validation(format!(
                "'{customer_email}' is not a valid email address"
            )));
        }

        Ok(Self {
            amount: self.amount,
            currency,
            customer_email,
            metadata: self.metadata.filter(|value| !value.is_null()),
        })
    }
}

/// A payment as returned by `POST payments` and `GET payments/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub amount: f64,
    pub currency: String,
    pub status: TransactionStatus,
    #[serde(default)]
    pub customer_email: String,
    pub created_at: String,
}
