use thiserror::Error;

use crate::record::TransactionId;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecordError {
    #[error("Transaction {id}: unusable amount '{value}'")]
    InvalidAmount { id: TransactionId, value: String },
}
