use belegmatch_core::{Currency, Money, ReceiptRecord, TransactionRecord};
use serde::Serialize;

use crate::normalize::{normalize_merchant, shared_word_count};
use crate::similarity::sequence_ratio;

/// Amount difference (exclusive upper bound, cents) → share of the amount weight.
const AMOUNT_TIERS: [(i64, f64); 4] = [(1, 1.0), (10, 0.9), (100, 0.6), (500, 0.2)];

/// Days apart (inclusive) → fixed points. Independent of the currency regime.
const DATE_TIERS: [(i64, f64); 5] = [(0, 0.30), (1, 0.25), (3, 0.20), (7, 0.10), (14, 0.05)];

/// Name similarity (exclusive lower bound) → share of the merchant weight.
const SIMILARITY_TIERS: [(f64, f64); 4] = [(0.9, 1.0), (0.7, 0.75), (0.5, 0.5), (0.3, 0.25)];

/// Share of description words found in the raw text (inclusive) → share of the merchant weight.
const TEXT_TIERS: [(f64, f64); 4] = [(0.8, 1.0), (0.6, 0.75), (0.4, 0.5), (0.2, 0.25)];

const WORD_BONUS: f64 = 0.05;
const WORD_BONUS_CAP_SHARE: f64 = 0.5;
const TEXT_AMOUNT_BONUS: f64 = 0.10;
const TEXT_ESTIMATE_CAP: f64 = 0.2;
const TEXT_MATCH_RATIO: f64 = 0.6;
const MIN_DESCRIPTION_WORD_LEN: usize = 3;

/// How the two currency codes relate, which decides how much the amount is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyRegime {
    /// Both EUR.
    Domestic,
    /// Both the same non-EUR currency; FX and rounding make amounts drift.
    SameForeign,
    /// One side EUR, the other foreign; amounts are not comparable.
    Mismatch,
    /// Two different foreign currencies; never a match.
    Incompatible,
}

impl CurrencyRegime {
    pub fn classify(transaction: &Currency, receipt: &Currency) -> Self {
        if transaction != receipt {
            if !transaction.is_eur() && !receipt.is_eur() {
                CurrencyRegime::Incompatible
            } else {
                CurrencyRegime::Mismatch
            }
        } else if transaction.is_eur() {
            CurrencyRegime::Domestic
        } else {
            CurrencyRegime::SameForeign
        }
    }

    /// `None` for pairings that are rejected outright.
    pub fn weights(self) -> Option<SignalWeights> {
        match self {
            CurrencyRegime::Domestic => Some(SignalWeights { amount: 0.5, date: 0.3, merchant: 0.2 }),
            CurrencyRegime::SameForeign => Some(SignalWeights { amount: 0.2, date: 0.3, merchant: 0.5 }),
            CurrencyRegime::Mismatch => Some(SignalWeights { amount: 0.0, date: 0.3, merchant: 0.5 }),
            CurrencyRegime::Incompatible => None,
        }
    }
}

/// Maximum contribution of each signal. Sums to 1.0 in every regime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalWeights {
    pub amount: f64,
    pub date: f64,
    pub merchant: f64,
}

/// Which signals fired for a pair, and what each contributed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchExplanation {
    pub regime: CurrencyRegime,
    pub currency_mismatch: bool,
    /// Amounts agree to the cent.
    pub amount_match: bool,
    pub amount_diff: Option<Money>,
    pub date_diff_days: Option<i64>,
    pub merchant_similarity: f64,
    pub ocr_match: bool,
    pub amount_score: f64,
    pub date_score: f64,
    pub name_score: f64,
    /// `None` when the receipt had no raw text to search.
    pub text_score: Option<f64>,
}

impl MatchExplanation {
    fn new(regime: CurrencyRegime) -> Self {
        Self {
            regime,
            currency_mismatch: matches!(
                regime,
                CurrencyRegime::Mismatch | CurrencyRegime::Incompatible
            ),
            amount_match: false,
            amount_diff: None,
            date_diff_days: None,
            merchant_similarity: 0.0,
            ocr_match: false,
            amount_score: 0.0,
            date_score: 0.0,
            name_score: 0.0,
            text_score: None,
        }
    }

    /// The pair was refused on currency grounds before any signal was computed.
    pub fn rejected(&self) -> bool {
        self.regime == CurrencyRegime::Incompatible
    }

    /// The merchant/text contribution: the better of name similarity and raw-text search.
    pub fn merchant_score(&self) -> f64 {
        self.text_score.map_or(self.name_score, |t| self.name_score.max(t))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMatch {
    /// Confidence in `[0, 1]` that both records describe the same purchase.
    pub score: f64,
    pub explanation: MatchExplanation,
}

/// Scores how likely `receipt` documents `transaction`.
///
/// Pure and total: missing receipt fields only zero out the signals that need
/// them. The comparison is anchored on the transaction (its description is what
/// gets searched for in the receipt text), so it is not symmetric.
pub fn score(transaction: &TransactionRecord, receipt: &ReceiptRecord) -> ScoredMatch {
    let regime = CurrencyRegime::classify(&transaction.currency, &receipt.currency);
    let mut explanation = MatchExplanation::new(regime);
    let Some(weights) = regime.weights() else {
        tracing::debug!(
            "Transaction {} / receipt {}: {} vs {}, rejected",
            transaction.id,
            receipt.id,
            transaction.currency,
            receipt.currency
        );
        return ScoredMatch { score: 0.0, explanation };
    };

    // ── Amount ────────────────────────────────────────────────────────────────
    let transaction_amount = transaction.matching_amount();
    if weights.amount > 0.0 {
        if let (Some(t), Some(r)) = (transaction_amount, receipt.matching_amount()) {
            let diff = t.abs_diff(r);
            explanation.amount_diff = Some(diff);
            explanation.amount_match = diff < Money::from_cents(1);
            explanation.amount_score = weights.amount * amount_share(diff);
        }
    }

    // ── Date ──────────────────────────────────────────────────────────────────
    if let (Some(t), Some(r)) = (transaction.date, receipt.date) {
        let days = (t - r).num_days().abs();
        explanation.date_diff_days = Some(days);
        explanation.date_score = date_points(days);
    }

    // ── Merchant name ─────────────────────────────────────────────────────────
    let transaction_name = normalize_merchant(transaction.name_for_matching());
    let receipt_name = normalize_merchant(receipt.merchant.as_deref().unwrap_or_default());
    if !transaction_name.is_empty() && !receipt_name.is_empty() {
        let similarity = sequence_ratio(&transaction_name, &receipt_name);
        explanation.merchant_similarity = similarity;
        explanation.name_score = weights.merchant * similarity_share(similarity)
            + word_bonus(shared_word_count(&transaction_name, &receipt_name), weights.merchant);
    }

    // ── Raw receipt text ──────────────────────────────────────────────────────
    let raw_text = receipt.raw_text();
    if !raw_text.is_empty() && !transaction_name.is_empty() {
        let (estimate, hit) = text_estimate(
            &transaction.description,
            raw_text,
            transaction_amount,
            weights.merchant,
        );
        explanation.text_score = Some(estimate);
        explanation.ocr_match = hit;
    }

    let total = explanation.amount_score + explanation.date_score + explanation.merchant_score();
    ScoredMatch { score: total.clamp(0.0, 1.0), explanation }
}

fn amount_share(diff: Money) -> f64 {
    AMOUNT_TIERS
        .iter()
        .find(|(cents, _)| diff < Money::from_cents(*cents))
        .map_or(0.0, |(_, share)| *share)
}

fn date_points(days: i64) -> f64 {
    DATE_TIERS
        .iter()
        .find(|(max_days, _)| days <= *max_days)
        .map_or(0.0, |(_, points)| *points)
}

fn similarity_share(similarity: f64) -> f64 {
    SIMILARITY_TIERS
        .iter()
        .find(|(floor, _)| similarity > *floor)
        .map_or(0.0, |(_, share)| *share)
}

// Capped relative to the regime's merchant weight.
fn word_bonus(shared_words: usize, merchant_weight: f64) -> f64 {
    if shared_words == 0 {
        return 0.0;
    }
    (WORD_BONUS * shared_words as f64).min(merchant_weight * WORD_BONUS_CAP_SHARE)
}

/// Searches the receipt's raw text for the transaction description's words and
/// for the transaction amount. Returns the estimate and whether it counts as a hit.
fn text_estimate(
    description: &str,
    raw_text: &str,
    amount: Option<Money>,
    merchant_weight: f64,
) -> (f64, bool) {
    let haystack = raw_text.to_lowercase();
    let description = description.to_lowercase();
    let words: Vec<&str> = description
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_DESCRIPTION_WORD_LEN)
        .collect();

    let mut estimate = 0.0;
    let mut hit = false;

    if !words.is_empty() {
        let found = words.iter().filter(|w| haystack.contains(**w)).count();
        let ratio = found as f64 / words.len() as f64;
        estimate = merchant_weight
            * TEXT_TIERS
                .iter()
                .find(|(floor, _)| ratio >= *floor)
                .map_or(0.0, |(_, share)| *share);
        hit = ratio >= TEXT_MATCH_RATIO;
    }

    // The printed total is a confirmation, so this is capped absolutely, not by weight.
    if let Some(amount) = amount {
        if raw_text.contains(&amount.to_plain_string(','))
            || raw_text.contains(&amount.to_plain_string('.'))
        {
            estimate = f64::min(estimate + TEXT_AMOUNT_BONUS, TEXT_ESTIMATE_CAP);
            hit = true;
        }
    }

    (estimate, hit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(cents: i64, currency: &str, desc: &str) -> TransactionRecord {
        TransactionRecord::new(1, Money::from_cents(cents), date(2024, 3, 10), desc)
            .with_currency(currency)
    }

    fn receipt(cents: i64, currency: &str) -> ReceiptRecord {
        ReceiptRecord::new(1)
            .with_amount(Money::from_cents(cents))
            .with_currency(currency)
            .with_date(date(2024, 3, 10))
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ── Regimes ───────────────────────────────────────────────────────────────

    #[test]
    fn classify_regimes() {
        let eur = Currency::eur();
        let usd = Currency::new("USD");
        let gbp = Currency::new("GBP");
        assert_eq!(CurrencyRegime::classify(&eur, &eur), CurrencyRegime::Domestic);
        assert_eq!(CurrencyRegime::classify(&usd, &usd), CurrencyRegime::SameForeign);
        assert_eq!(CurrencyRegime::classify(&eur, &usd), CurrencyRegime::Mismatch);
        assert_eq!(CurrencyRegime::classify(&usd, &eur), CurrencyRegime::Mismatch);
        assert_eq!(CurrencyRegime::classify(&usd, &gbp), CurrencyRegime::Incompatible);
    }

    #[test]
    fn weights_sum_to_one() {
        for regime in [
            CurrencyRegime::Domestic,
            CurrencyRegime::SameForeign,
            CurrencyRegime::Mismatch,
        ] {
            let w = regime.weights().unwrap();
            assert!(close(w.amount + w.date + w.merchant, 1.0), "{regime:?}");
        }
        assert!(CurrencyRegime::Incompatible.weights().is_none());
    }

    // ── Whole-pair scenarios ──────────────────────────────────────────────────

    #[test]
    fn exact_match_saturates() {
        let t = tx(4500, "EUR", "REWE MUENCHEN");
        let r = receipt(4500, "EUR").with_merchant("Rewe München");
        let m = score(&t, &r);
        assert!(close(m.score, 1.0), "score was {}", m.score);
        assert!(close(m.explanation.amount_score, 0.5));
        assert!(close(m.explanation.date_score, 0.30));
        assert!(close(m.explanation.merchant_score(), 0.2));
        assert!(close(m.explanation.merchant_similarity, 0.88));
        assert!(m.explanation.amount_match);
        assert_eq!(m.explanation.amount_diff, Some(Money::zero()));
        assert_eq!(m.explanation.date_diff_days, Some(0));
    }

    #[test]
    fn same_foreign_currency_uses_reduced_amount_weight() {
        let t = tx(12000, "USD", "X");
        let r = receipt(12005, "USD");
        let m = score(&t, &r);
        assert_eq!(m.explanation.regime, CurrencyRegime::SameForeign);
        assert!(close(m.explanation.amount_score, 0.2 * 0.9));
        assert!(close(m.score, 0.48));
        assert!(!m.explanation.amount_match);
    }

    #[test]
    fn same_foreign_currency_leans_on_merchant() {
        let t = tx(12000, "USD", "AMAZON.COM");
        let r = receipt(13250, "USD").with_merchant("Amazon.com");
        let m = score(&t, &r);
        assert_eq!(m.explanation.amount_score, 0.0);
        assert_eq!(m.explanation.amount_diff, Some(Money::from_cents(1250)));
        // full 0.5 for identical names plus 2 shared words
        assert!(close(m.explanation.name_score, 0.6));
        assert!(close(m.score, 0.9));
    }

    #[test]
    fn eur_against_foreign_ignores_amount() {
        let t = tx(4500, "EUR", "AMAZON.COM");
        let r = receipt(4500, "USD").with_merchant("Amazon.com");
        let m = score(&t, &r);
        assert_eq!(m.explanation.regime, CurrencyRegime::Mismatch);
        assert!(m.explanation.currency_mismatch);
        assert!(!m.explanation.rejected());
        assert_eq!(m.explanation.amount_diff, None);
        assert_eq!(m.explanation.amount_score, 0.0);
        assert!(close(m.score, 0.9));
    }

    #[test]
    fn two_foreign_currencies_reject_outright() {
        let t = tx(4500, "USD", "REWE MUENCHEN");
        let r = receipt(4500, "GBP").with_merchant("Rewe München").with_raw_text("REWE 45.00");
        let m = score(&t, &r);
        assert_eq!(m.score, 0.0);
        assert!(m.explanation.currency_mismatch);
        assert!(m.explanation.rejected());
        assert_eq!(m.explanation.amount_diff, None);
        assert_eq!(m.explanation.date_diff_days, None);
        assert_eq!(m.explanation.text_score, None);
    }

    #[test]
    fn empty_receipt_scores_zero() {
        let t = tx(4500, "EUR", "ARAL");
        let m = score(&t, &ReceiptRecord::new(9));
        assert_eq!(m.score, 0.0);
        assert_eq!(m.explanation.amount_diff, None);
        assert_eq!(m.explanation.date_diff_days, None);
        assert!(!m.explanation.ocr_match);
    }

    // ── Amount tiers ──────────────────────────────────────────────────────────

    #[test]
    fn amount_tiers() {
        assert_eq!(amount_share(Money::from_cents(0)), 1.0);
        assert_eq!(amount_share(Money::from_cents(1)), 0.9);
        assert_eq!(amount_share(Money::from_cents(9)), 0.9);
        assert_eq!(amount_share(Money::from_cents(10)), 0.6);
        assert_eq!(amount_share(Money::from_cents(99)), 0.6);
        assert_eq!(amount_share(Money::from_cents(499)), 0.2);
        assert_eq!(amount_share(Money::from_cents(500)), 0.0);
    }

    #[test]
    fn zero_amount_on_either_side_skips_amount() {
        let t = tx(0, "EUR", "ARAL");
        let m = score(&t, &receipt(0, "EUR"));
        assert_eq!(m.explanation.amount_diff, None);
        assert!(close(m.score, 0.30));
    }

    #[test]
    fn extreme_opposite_amounts_fall_in_lowest_tier() {
        let high = belegmatch_core::try_parse_amount("70000000000000000000000000000").unwrap();
        let low = belegmatch_core::try_parse_amount("-70000000000000000000000000000").unwrap();
        let t = TransactionRecord::new(1, high, date(2024, 3, 10), "ARAL");
        let r = ReceiptRecord::new(2).with_amount(low).with_date(date(2024, 3, 10));
        let m = score(&t, &r);
        assert_eq!(m.explanation.amount_score, 0.0);
        assert!(!m.explanation.amount_match);
        assert!(close(m.score, 0.30));
    }

    #[test]
    fn booked_eur_amount_is_compared() {
        let t = tx(13250, "EUR", "X").with_amount_eur(Money::from_cents(4500));
        let m = score(&t, &receipt(4500, "EUR"));
        assert!(m.explanation.amount_match);
    }

    // ── Date tiers ────────────────────────────────────────────────────────────

    #[test]
    fn date_tiers() {
        assert_eq!(date_points(0), 0.30);
        assert_eq!(date_points(1), 0.25);
        assert_eq!(date_points(2), 0.20);
        assert_eq!(date_points(3), 0.20);
        assert_eq!(date_points(7), 0.10);
        assert_eq!(date_points(14), 0.05);
        assert_eq!(date_points(15), 0.0);
    }

    #[test]
    fn date_difference_is_absolute() {
        let t = tx(4500, "EUR", "X");
        let r = receipt(4500, "EUR").with_date(date(2024, 3, 3));
        let m = score(&t, &r);
        assert_eq!(m.explanation.date_diff_days, Some(7));
        assert!(close(m.explanation.date_score, 0.10));
    }

    #[test]
    fn unknown_transaction_date_skips_date() {
        let mut t = tx(4500, "EUR", "X");
        t.date = None;
        let m = score(&t, &receipt(4500, "EUR"));
        assert_eq!(m.explanation.date_diff_days, None);
        assert!(close(m.score, 0.5));
    }

    // ── Merchant name ─────────────────────────────────────────────────────────

    #[test]
    fn similarity_tiers_are_exclusive() {
        assert_eq!(similarity_share(0.95), 1.0);
        assert_eq!(similarity_share(0.9), 0.75);
        assert_eq!(similarity_share(0.7), 0.5);
        assert_eq!(similarity_share(0.5), 0.25);
        assert_eq!(similarity_share(0.3), 0.0);
    }

    #[test]
    fn word_bonus_cap_follows_weight() {
        assert_eq!(word_bonus(0, 0.2), 0.0);
        assert!(close(word_bonus(1, 0.2), 0.05));
        assert!(close(word_bonus(3, 0.2), 0.1));
        assert!(close(word_bonus(3, 0.5), 0.15));
        assert!(close(word_bonus(9, 0.5), 0.25));
    }

    #[test]
    fn transaction_merchant_overrides_description() {
        let t = tx(4500, "EUR", "SQ *7731 XYZ").with_merchant("Blue Bottle");
        let r = receipt(4500, "EUR").with_merchant("Blue Bottle Coffee");
        let m = score(&t, &r);
        assert!(m.explanation.merchant_similarity > 0.7);
    }

    // ── Raw-text estimator ────────────────────────────────────────────────────

    #[test]
    fn raw_text_words_and_amount_confirm() {
        let t = tx(4500, "EUR", "SHELL 1234 BERLIN");
        let r = ReceiptRecord::new(1)
            .with_date(date(2024, 3, 11))
            .with_raw_text("Shell Station Berlin\nSumme EUR 45,00");
        let m = score(&t, &r);
        // 2 of 3 words → 0.75 × 0.2, plus the amount bonus up to the 0.2 cap
        assert!(m.explanation.ocr_match);
        assert!(close(m.explanation.text_score.unwrap(), 0.2));
        assert!(close(m.score, 0.45));
    }

    #[test]
    fn raw_text_without_words_counts_amount_only() {
        let t = tx(1999, "EUR", "PAYPAL *XY");
        let r = ReceiptRecord::new(1).with_raw_text("Rechnung\nGesamt 19.99 EUR");
        let m = score(&t, &r);
        assert!(m.explanation.ocr_match);
        assert!(close(m.explanation.text_score.unwrap(), 0.1));
    }

    #[test]
    fn amount_confirmation_caps_text_estimate_absolutely() {
        let t = tx(9990, "USD", "APPLE STORE SF");
        let r = receipt(9000, "USD").with_raw_text("Apple Store San Francisco TOTAL 99.90");
        let m = score(&t, &r);
        // all words found would be worth 0.5 here, the amount hit clamps it to 0.2
        assert!(close(m.explanation.text_score.unwrap(), 0.2));
        assert!(close(m.score, 0.5));
    }

    #[test]
    fn weak_text_match_is_not_a_hit() {
        let t = tx(4500, "EUR", "Lufthansa Flugticket Frankfurt München");
        let r = receipt(4500, "EUR").with_raw_text("LUFTHANSA");
        let m = score(&t, &r);
        assert!(!m.explanation.ocr_match);
        assert!(close(m.explanation.text_score.unwrap(), 0.05));
        assert!(close(m.score, 0.85));
    }

    #[test]
    fn better_of_name_and_text_wins() {
        let t = tx(4500, "EUR", "LUFTHANSA");
        let r = receipt(4500, "EUR")
            .with_merchant("Deutsche Bahn")
            .with_raw_text("Lufthansa Flugticket Frankfurt München");
        let m = score(&t, &r);
        assert!(m.explanation.text_score.unwrap() > m.explanation.name_score);
        assert!(close(m.score, 1.0));
    }

    #[test]
    fn explanation_serializes_for_callers() {
        let t = tx(4500, "USD", "REWE");
        let r = receipt(4500, "GBP");
        let json = serde_json::to_value(score(&t, &r)).unwrap();
        assert_eq!(json["score"], 0.0);
        assert_eq!(json["explanation"]["regime"], "incompatible");
        assert_eq!(json["explanation"]["currency_mismatch"], true);
        assert!(json["explanation"]["amount_diff"].is_null());
    }

    #[test]
    fn score_is_deterministic() {
        let t = tx(4500, "EUR", "REWE MUENCHEN");
        let r = receipt(4490, "EUR").with_merchant("Rewe City").with_raw_text("REWE 44,90");
        let a = score(&t, &r);
        let b = score(&t, &r);
        assert_eq!(a.score.to_bits(), b.score.to_bits());
        assert_eq!(a.explanation, b.explanation);
    }
}
