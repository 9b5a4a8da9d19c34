pub mod currency;
pub mod error;
pub mod money;
pub mod parse;
pub mod raw;
pub mod record;

pub use currency::Currency;
pub use error::RecordError;
pub use money::Money;
pub use parse::{try_parse_amount, try_parse_date};
pub use raw::{RawAmount, RawReceipt, RawTransaction};
pub use record::{
    AssignmentDecision, ReceiptId, ReceiptRecord, TransactionId, TransactionRecord,
    TransactionStatus,
};
