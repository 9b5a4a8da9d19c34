//! Loosely typed records as delivered by statement import and receipt extraction.
//! Conversion into the typed records is where malformed fields turn into `None`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::currency::Currency;
use crate::error::RecordError;
use crate::money::Money;
use crate::parse::{try_parse_amount, try_parse_date};
use crate::record::{ReceiptId, ReceiptRecord, TransactionId, TransactionRecord, TransactionStatus};

/// An amount that arrived either as a JSON number or as formatted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(serde_json::Number),
    Text(String),
}

impl RawAmount {
    pub fn to_money(&self) -> Option<Money> {
        match self {
            RawAmount::Number(n) => {
                let s = n.to_string();
                Decimal::from_str(&s)
                    .or_else(|_| Decimal::from_scientific(&s))
                    .ok()
                    .map(Money::from_decimal)
            }
            RawAmount::Text(s) => try_parse_amount(s),
        }
    }
}

impl fmt::Display for RawAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawAmount::Number(n) => write!(f, "{n}"),
            RawAmount::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    pub id: i64,
    pub amount: RawAmount,
    #[serde(default)]
    pub amount_eur: Option<RawAmount>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub status: TransactionStatus,
}

impl TryFrom<RawTransaction> for TransactionRecord {
    type Error = RecordError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        let id = TransactionId(raw.id);
        let amount = raw.amount.to_money().ok_or_else(|| RecordError::InvalidAmount {
            id,
            value: raw.amount.to_string(),
        })?;

        let date = raw.date.as_deref().and_then(try_parse_date);
        if date.is_none() {
            tracing::debug!("Transaction {id}: date {:?} unreadable, matching without it", raw.date);
        }

        Ok(TransactionRecord {
            id,
            amount,
            amount_eur: raw.amount_eur.as_ref().and_then(RawAmount::to_money),
            currency: raw.currency,
            date,
            description: raw.description.unwrap_or_default(),
            merchant: raw.merchant,
            position: raw.position,
            status: raw.status,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReceipt {
    pub id: i64,
    #[serde(default)]
    pub amount: Option<RawAmount>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default, alias = "ocr_text")]
    pub raw_text: Option<String>,
}

impl From<RawReceipt> for ReceiptRecord {
    fn from(raw: RawReceipt) -> Self {
        ReceiptRecord {
            id: ReceiptId(raw.id),
            amount: raw.amount.as_ref().and_then(RawAmount::to_money),
            currency: raw.currency,
            date: raw.date.as_deref().and_then(try_parse_date),
            merchant: raw.merchant,
            raw_text: raw.raw_text,
        }
    }
}
