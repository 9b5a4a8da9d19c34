use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::Currency;
use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(pub i64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReceiptId(pub i64);

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Open,
    Assigned,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Open => write!(f, "open"),
            TransactionStatus::Assigned => write!(f, "assigned"),
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TransactionStatus::Open),
            "assigned" => Ok(TransactionStatus::Assigned),
            other => Err(format!("Unknown transaction status: '{other}'")),
        }
    }
}

/// One line of an imported card statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    /// Amount in the transaction's own currency.
    pub amount: Money,
    /// Booked EUR equivalent for foreign-currency lines, when the statement carries one.
    #[serde(default)]
    pub amount_eur: Option<Money>,
    #[serde(default)]
    pub currency: Currency,
    /// `None` when the statement date could not be read.
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub status: TransactionStatus,
}

impl TransactionRecord {
    pub fn new(id: i64, amount: Money, date: NaiveDate, description: &str) -> Self {
        TransactionRecord {
            id: TransactionId(id),
            amount,
            amount_eur: None,
            currency: Currency::eur(),
            date: Some(date),
            description: description.to_string(),
            merchant: None,
            position: None,
            status: TransactionStatus::Open,
        }
    }

    pub fn with_currency(mut self, code: &str) -> Self {
        self.currency = Currency::new(code);
        self
    }

    pub fn with_amount_eur(mut self, amount_eur: Money) -> Self {
        self.amount_eur = Some(amount_eur);
        self
    }

    pub fn with_merchant(mut self, merchant: &str) -> Self {
        self.merchant = Some(merchant.to_string());
        self
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    /// The amount compared against receipts: the booked EUR figure if present,
    /// else the raw amount. Zero counts as unknown.
    pub fn matching_amount(&self) -> Option<Money> {
        self.amount_eur
            .filter(|a| !a.is_zero())
            .or(Some(self.amount))
            .filter(|a| !a.is_zero())
    }

    /// The merchant name if one was assigned, otherwise the statement description.
    pub fn name_for_matching(&self) -> &str {
        self.merchant
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.description)
    }

    pub fn is_open(&self) -> bool {
        self.status == TransactionStatus::Open
    }
}

/// Best-effort fields extracted from one receipt. Everything but the id may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub id: ReceiptId,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default)]
    pub raw_text: Option<String>,
}

impl ReceiptRecord {
    pub fn new(id: i64) -> Self {
        ReceiptRecord {
            id: ReceiptId(id),
            ..Default::default()
        }
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_currency(mut self, code: &str) -> Self {
        self.currency = Currency::new(code);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_merchant(mut self, merchant: &str) -> Self {
        self.merchant = Some(merchant.to_string());
        self
    }

    pub fn with_raw_text(mut self, raw_text: &str) -> Self {
        self.raw_text = Some(raw_text.to_string());
        self
    }

    /// Extracted amount, with zero treated as unknown.
    pub fn matching_amount(&self) -> Option<Money> {
        self.amount.filter(|a| !a.is_zero())
    }

    pub fn raw_text(&self) -> &str {
        self.raw_text.as_deref().unwrap_or_default()
    }
}

/// The engine's only output: receipt `receipt_id` belongs to transaction `transaction_id`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssignmentDecision {
    pub transaction_id: TransactionId,
    pub receipt_id: ReceiptId,
    pub confidence: f64,
}
