//! Transaction history models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Settlement state of a transaction, also the list's hard filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Settled,
    Failed,
}

impl TransactionStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::Settled, Self::Failed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Settled => "settled",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| {
                Error::Validation(format!(
                    "Unknown status '{}'; expected pending, settled or failed",
                    s.trim()
                ))
            })
    }
}

/// A transaction row. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub tx_type: String,
    /// Amount as a decimal string
    pub amount: String,
    pub currency: String,
    pub status: TransactionStatus,
    pub created_at: String,
    #[serde(default)]
    pub customer_email: Option<String>,
}

/// One page of `GET transactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPage {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub total: u64,
    /// Page number echoed back by the server
    #[serde(default)]
    pub page: Option<u32>,
}

/// `GET transactions/{id}`: the row plus free-form metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetail {
    #[serde(flatten)]
    pub transaction: Transaction,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Transaction identifier, checked client-side before any lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(Uuid);

impl FromStr for TransactionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| Error::Validation(format!("'{}' is not a valid transaction id", s.trim())))
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Query string for `GET transactions`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionQuery {
    pub page: u32,
    pub limit: usize,
    pub search: Option<String>,
    pub status: Option<TransactionStatus>,
}

impl TransactionQuery {
    /// Key/value pairs in wire order; absent filters are omitted.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(search) = self.search.as_deref() {
            pairs.push(("search", search.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("filter", status.as_str().to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(
            " Settled ".parse::<TransactionStatus>().unwrap(),
            TransactionStatus::Settled
        );
        assert!("refunded".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn query_pairs_include_only_present_filters() {
        let query = TransactionQuery {
            page: 2,
            limit: 10,
            search: Some("alice@example.com".to_string()),
            status: Some(TransactionStatus::Settled),
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("page", "2".to_string()),
                ("limit", "10".to_string()),
                ("search", "alice@example.com".to_string()),
                ("filter", "settled".to_string()),
            ]
        );

        let bare = TransactionQuery {
            page: 0,
            limit: 10,
            ..Default::default()
        };
        assert_eq!(
            bare.to_pairs(),
            vec![("page", "1".to_string()), ("limit", "10".to_string())]
        );
    }

    #[test]
    fn transaction_id_requires_uuid() {
        assert!("not-a-uuid".parse::<TransactionId>().is_err());
        let id: TransactionId = "5f0c6d1e-8a53-4c4e-9b0e-0f6c3e2a9d11".parse().unwrap();
        assert_eq!(id.to_string(), "5f0c6d1e-8a53-4c4e-9b0e-0f6c3e2a9d11");
    }

    #[test]
    fn detail_flattens_transaction_fields() {
        let detail: TransactionDetail = serde_json::from_str(
            r#"{
                "id": "5f0c6d1e-8a53-4c4e-9b0e-0f6c3e2a9d11",
                "tx_type": "payment",
                "amount": "12.50",
                "currency": "USD",
                "status": "pending",
                "created_at": "2026-10-18 09:12:00",
                "customer_email": null,
                "metadata": {"order": "A-17"}
            }"#,
        )
        .unwrap();
        assert_eq!(detail.transaction.status, TransactionStatus::Pending);
        assert_eq!(
            detail.metadata,
            Some(serde_json::json!({"order": "A-17"}))
        );
    }

    #[test]
    fn page_without_echo_defaults() {
        let page: TransactionPage =
            serde_json::from_str(r#"{"transactions":[],"total":0}"#).unwrap();
        assert_eq!(page.page, None);
        assert!(page.transactions.is_empty());
    }
}
