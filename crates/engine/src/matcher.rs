use belegmatch_core::{AssignmentDecision, ReceiptRecord, TransactionRecord};

use crate::assigner::{self, Classification, MatchCandidate, ReconciliationReport};
use crate::config::MatchConfig;
use crate::scorer::{self, ScoredMatch};

/// The matching operations with thresholds and limits taken from a [`MatchConfig`].
#[derive(Debug, Clone, Default)]
pub struct ReceiptMatcher {
    pub config: MatchConfig,
}

impl ReceiptMatcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, transaction: &TransactionRecord, receipt: &ReceiptRecord) -> ScoredMatch {
        scorer::score(transaction, receipt)
    }

    /// Greedy assignment at the automatic threshold.
    pub fn assign(
        &self,
        transactions: &[TransactionRecord],
        receipts: &[ReceiptRecord],
    ) -> Vec<AssignmentDecision> {
        assigner::assign(transactions, receipts, self.config.auto_threshold)
    }

    /// Manual-assist candidates at the match threshold.
    pub fn find_matches<'a>(
        &self,
        transaction: &'a TransactionRecord,
        receipts: &'a [ReceiptRecord],
    ) -> Vec<MatchCandidate<'a>> {
        assigner::find_matches(transaction, receipts, self.config.match_threshold)
    }

    pub fn suggest_matches<'a>(
        &self,
        transaction: &'a TransactionRecord,
        receipts: &'a [ReceiptRecord],
    ) -> Vec<MatchCandidate<'a>> {
        let mut candidates =
            assigner::find_matches(transaction, receipts, self.config.suggestion_threshold);
        candidates.truncate(self.config.suggestion_limit);
        candidates
    }

    pub fn classify(
        &self,
        transaction: &TransactionRecord,
        receipts: &[ReceiptRecord],
    ) -> Classification {
        assigner::classify(
            transaction,
            receipts,
            self.config.auto_threshold,
            self.config.candidate_limit,
        )
    }

    pub fn reconcile(
        &self,
        transactions: &[TransactionRecord],
        receipts: &[ReceiptRecord],
    ) -> ReconciliationReport {
        assigner::reconcile_with_limit(
            transactions,
            receipts,
            self.config.auto_threshold,
            self.config.candidate_limit,
        )
    }
}
