use std::path::Path;

use anyhow::{Context, Result};
use belegmatch_core::{
    AssignmentDecision, RawReceipt, RawTransaction, ReceiptId, ReceiptRecord, TransactionId,
    TransactionRecord,
};
use belegmatch_engine::{
    CategoryRuleEngine, MatchConfig, MatchExplanation, ReceiptMatcher, ReconciliationReport,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SuggestionOutput {
    pub receipt_id: ReceiptId,
    pub score: f64,
    pub explanation: MatchExplanation,
}

#[derive(Debug, Serialize)]
pub struct CategoryOutput {
    pub transaction_id: TransactionId,
    pub category: String,
    pub label: Option<&'static str>,
    pub rule: Option<String>,
    pub confidence: f64,
}

pub fn load_config(path: Option<&Path>) -> Result<MatchConfig> {
    match path {
        Some(path) => MatchConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(MatchConfig::default()),
    }
}

pub fn load_transactions(path: &Path) -> Result<Vec<TransactionRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let raw: Vec<RawTransaction> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse transactions in {}", path.display()))?;
    let records = raw
        .into_iter()
        .map(TransactionRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!("Loaded {} transactions from {}", records.len(), path.display());
    Ok(records)
}

pub fn load_receipts(path: &Path) -> Result<Vec<ReceiptRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let raw: Vec<RawReceipt> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse receipts in {}", path.display()))?;
    let records: Vec<ReceiptRecord> = raw.into_iter().map(ReceiptRecord::from).collect();
    tracing::debug!("Loaded {} receipts from {}", records.len(), path.display());
    Ok(records)
}

pub fn assign(
    matcher: &ReceiptMatcher,
    transactions: &Path,
    receipts: &Path,
) -> Result<Vec<AssignmentDecision>> {
    let transactions = load_transactions(transactions)?;
    let receipts = load_receipts(receipts)?;
    Ok(matcher.assign(&transactions, &receipts))
}

pub fn suggest(
    matcher: &ReceiptMatcher,
    transactions: &Path,
    receipts: &Path,
    transaction_id: i64,
) -> Result<Vec<SuggestionOutput>> {
    let transactions = load_transactions(transactions)?;
    let receipts = load_receipts(receipts)?;
    let transaction = transactions
        .iter()
        .find(|t| t.id == TransactionId(transaction_id))
        .with_context(|| format!("Transaction {transaction_id} not found"))?;

    Ok(matcher
        .suggest_matches(transaction, &receipts)
        .into_iter()
        .map(|m| SuggestionOutput {
            receipt_id: m.receipt.id,
            score: m.score,
            explanation: m.explanation,
        })
        .collect())
}

pub fn reconcile(
    matcher: &ReceiptMatcher,
    transactions: &Path,
    receipts: &Path,
) -> Result<ReconciliationReport> {
    let transactions = load_transactions(transactions)?;
    let receipts = load_receipts(receipts)?;
    Ok(matcher.reconcile(&transactions, &receipts))
}

pub fn categorize(transactions: &Path, rules: &Path) -> Result<Vec<CategoryOutput>> {
    let transactions = load_transactions(transactions)?;
    let engine = CategoryRuleEngine::load(rules)
        .with_context(|| format!("Failed to load rules from {}", rules.display()))?;
    tracing::debug!("{} active category rules", engine.len());

    Ok(transactions
        .iter()
        .zip(engine.categorize_all(&transactions))
        .map(|(tx, c)| CategoryOutput {
            transaction_id: tx.id,
            label: belegmatch_engine::category_label(&c.category),
            category: c.category,
            rule: c.rule,
            confidence: c.confidence,
        })
        .collect())
}
