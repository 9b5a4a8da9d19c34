pub mod assigner;
pub mod categorize;
pub mod config;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod scorer;
pub mod similarity;

pub use assigner::{
    assign, classify, find_matches, reconcile, reconcile_with_limit, suggest_matches,
    AmbiguousMatch, Classification, MatchCandidate, ReconciliationReport,
};
pub use categorize::{
    category_label, Categorization, CategoryRule, CategoryRuleEngine, MatchType as RuleMatchType,
    DEFAULT_CATEGORIES, DEFAULT_CATEGORY,
};
pub use config::MatchConfig;
pub use error::{ConfigError, RuleError};
pub use matcher::ReceiptMatcher;
pub use normalize::normalize_merchant;
pub use scorer::{score, CurrencyRegime, MatchExplanation, ScoredMatch, SignalWeights};
pub use similarity::sequence_ratio;
