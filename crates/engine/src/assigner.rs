use std::collections::HashSet;

use belegmatch_core::{AssignmentDecision, ReceiptId, ReceiptRecord, TransactionId, TransactionRecord};
use serde::Serialize;

use crate::config::{CANDIDATE_LIMIT, SUGGESTION_THRESHOLD};
use crate::scorer::{score, MatchExplanation};

/// A scored transaction/receipt pair. Lives only as long as the input slices.
#[derive(Debug, Clone, Serialize)]
pub struct MatchCandidate<'a> {
    pub transaction: &'a TransactionRecord,
    pub receipt: &'a ReceiptRecord,
    pub score: f64,
    pub explanation: MatchExplanation,
}

impl MatchCandidate<'_> {
    pub fn decision(&self) -> AssignmentDecision {
        AssignmentDecision {
            transaction_id: self.transaction.id,
            receipt_id: self.receipt.id,
            confidence: self.score,
        }
    }
}

/// Greedy receipt-major assignment.
///
/// Receipts are visited in input order. Each one takes the open, not yet
/// claimed transaction with the strictly highest positive score (the earliest
/// on ties) if that score reaches `threshold`; the transaction is then claimed.
/// A receipt that finds nothing is skipped for good. Order-dependent: earlier
/// receipts win contested transactions.
pub fn assign(
    transactions: &[TransactionRecord],
    receipts: &[ReceiptRecord],
    threshold: f64,
) -> Vec<AssignmentDecision> {
    let mut claimed: HashSet<TransactionId> = HashSet::new();
    let mut decisions = Vec::new();

    for receipt in receipts {
        let mut best: Option<(&TransactionRecord, f64)> = None;
        let mut best_score = 0.0;

        for transaction in transactions
            .iter()
            .filter(|t| t.is_open() && !claimed.contains(&t.id))
        {
            let s = score(transaction, receipt).score;
            if s > best_score {
                best_score = s;
                best = Some((transaction, s));
            }
        }

        match best {
            Some((transaction, confidence)) if confidence >= threshold => {
                tracing::debug!(
                    "Receipt {} → transaction {} ({confidence:.3})",
                    receipt.id,
                    transaction.id
                );
                claimed.insert(transaction.id);
                decisions.push(AssignmentDecision {
                    transaction_id: transaction.id,
                    receipt_id: receipt.id,
                    confidence,
                });
            }
            _ => {
                tracing::debug!(
                    "Receipt {}: best score {best_score:.3} below {threshold}, left unassigned",
                    receipt.id
                );
            }
        }
    }

    tracing::info!(
        "Assigned {} of {} receipts against {} transactions",
        decisions.len(),
        receipts.len(),
        transactions.len()
    );
    decisions
}

/// All receipts scoring at least `threshold` against `transaction`, best first.
/// Equal scores keep input order.
pub fn find_matches<'a>(
    transaction: &'a TransactionRecord,
    receipts: &'a [ReceiptRecord],
    threshold: f64,
) -> Vec<MatchCandidate<'a>> {
    let mut candidates: Vec<MatchCandidate<'a>> = receipts
        .iter()
        .filter_map(|receipt| {
            let scored = score(transaction, receipt);
            (scored.score >= threshold).then(|| MatchCandidate {
                transaction,
                receipt,
                score: scored.score,
                explanation: scored.explanation,
            })
        })
        .collect();
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates
}

/// The `limit` best receipts scoring at least the suggestion threshold.
pub fn suggest_matches<'a>(
    transaction: &'a TransactionRecord,
    receipts: &'a [ReceiptRecord],
    limit: usize,
) -> Vec<MatchCandidate<'a>> {
    let mut candidates = find_matches(transaction, receipts, SUGGESTION_THRESHOLD);
    candidates.truncate(limit);
    candidates
}

/// How a single transaction fares against the full receipt set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    /// Exactly one receipt reached the threshold.
    Matched(AssignmentDecision),
    /// Several did; the best ones, highest first.
    Ambiguous { candidates: Vec<ReceiptId> },
    Unmatched,
}

pub fn classify(
    transaction: &TransactionRecord,
    receipts: &[ReceiptRecord],
    threshold: f64,
    candidate_limit: usize,
) -> Classification {
    let matches = find_matches(transaction, receipts, threshold);
    match matches.as_slice() {
        [] => Classification::Unmatched,
        [only] => Classification::Matched(only.decision()),
        many => Classification::Ambiguous {
            candidates: many
                .iter()
                .take(candidate_limit)
                .map(|m| m.receipt.id)
                .collect(),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmbiguousMatch {
    pub transaction_id: TransactionId,
    pub candidates: Vec<ReceiptId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciliationReport {
    pub matched: Vec<AssignmentDecision>,
    pub ambiguous: Vec<AmbiguousMatch>,
    pub unmatched_transactions: Vec<TransactionId>,
    /// Receipts no transaction matched uniquely, in input order.
    pub unmatched_receipts: Vec<ReceiptId>,
}

/// Classifies every transaction independently. Unlike [`assign`] nothing is
/// claimed, so one receipt may show up under several transactions.
pub fn reconcile(
    transactions: &[TransactionRecord],
    receipts: &[ReceiptRecord],
    threshold: f64,
) -> ReconciliationReport {
    reconcile_with_limit(transactions, receipts, threshold, CANDIDATE_LIMIT)
}

pub fn reconcile_with_limit(
    transactions: &[TransactionRecord],
    receipts: &[ReceiptRecord],
    threshold: f64,
    candidate_limit: usize,
) -> ReconciliationReport {
    let mut report = ReconciliationReport::default();
    let mut matched_receipts: HashSet<ReceiptId> = HashSet::new();

    for transaction in transactions {
        match classify(transaction, receipts, threshold, candidate_limit) {
            Classification::Matched(decision) => {
                matched_receipts.insert(decision.receipt_id);
                report.matched.push(decision);
            }
            Classification::Ambiguous { candidates } => report.ambiguous.push(AmbiguousMatch {
                transaction_id: transaction.id,
                candidates,
            }),
            Classification::Unmatched => report.unmatched_transactions.push(transaction.id),
        }
    }

    report.unmatched_receipts = receipts
        .iter()
        .map(|r| r.id)
        .filter(|id| !matched_receipts.contains(id))
        .collect();

    tracing::info!(
        "Reconciled {} transactions: {} matched, {} ambiguous, {} unmatched; {} receipts left",
        transactions.len(),
        report.matched.len(),
        report.ambiguous.len(),
        report.unmatched_transactions.len(),
        report.unmatched_receipts.len()
    );
    report
}
