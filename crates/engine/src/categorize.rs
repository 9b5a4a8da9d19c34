use belegmatch_core::{Money, TransactionRecord};
use serde::{Deserialize, Serialize};

use crate::error::RuleError;
use crate::similarity::sequence_ratio;

/// Category assigned when no rule matches.
pub const DEFAULT_CATEGORY: &str = "other";

/// Built-in category keys and their labels.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("meals", "Restaurants, cafés, bars"),
    ("travel_hotel", "Hotels, accommodation"),
    ("travel_flight", "Flights"),
    ("travel_rail", "Rail tickets"),
    ("travel_taxi", "Taxi, ride hailing, car rental"),
    ("office", "Office supplies, stationery"),
    ("software", "Software, subscriptions, SaaS"),
    ("hardware", "Computers, devices"),
    ("phone", "Phone, mobile"),
    ("postage", "Postage, shipping"),
    ("literature", "Books, journals"),
    ("training", "Courses, conferences"),
    ("marketing", "Marketing, advertising"),
    ("insurance", "Insurance"),
    ("fees", "Bank and card fees"),
    ("private", "Private spending (not deductible)"),
    (DEFAULT_CATEGORY, "Other business expenses"),
];

pub fn category_label(key: &str) -> Option<&'static str> {
    DEFAULT_CATEGORIES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub category: String,
    pub pattern: String,
    #[serde(default)]
    pub match_type: MatchType,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub amount_min: Option<Money>,
    #[serde(default)]
    pub amount_max: Option<Money>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    #[default]
    Contains,
    Exact,
    Regex,
    Fuzzy {
        threshold: f64,
    },
}

/// Outcome of categorizing one transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Categorization {
    pub category: String,
    /// Name of the rule that fired, `None` for the default category.
    pub rule: Option<String>,
    pub confidence: f64,
}

impl Categorization {
    fn fallback() -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            rule: None,
            confidence: 0.0,
        }
    }
}

#[derive(Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<CategoryRule>,
}

/// Internal pairing of a rule with its precompiled regex (if applicable).
struct CompiledRule {
    rule: CategoryRule,
    compiled_regex: Option<regex::Regex>,
}

pub struct CategoryRuleEngine {
    rules: Vec<CompiledRule>,
}

impl CategoryRuleEngine {
    /// Inactive rules are dropped. A regex rule whose pattern does not compile never matches.
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        let mut compiled: Vec<CompiledRule> = rules
            .into_iter()
            .filter(|rule| rule.active)
            .map(|rule| {
                let compiled_regex = if let MatchType::Regex = &rule.match_type {
                    regex::RegexBuilder::new(&rule.pattern)
                        .case_insensitive(true)
                        .build()
                        .map_err(|e| tracing::warn!("Rule '{}': invalid regex: {e}", rule.name))
                        .ok()
                } else {
                    None
                };
                CompiledRule { rule, compiled_regex }
            })
            .collect();
        // Highest priority first.
        compiled.sort_by(|a, b| b.rule.priority.cmp(&a.rule.priority));
        Self { rules: compiled }
    }

    /// Parses a document of `[[rules]]` tables.
    pub fn from_toml(toml_content: &str) -> Result<Self, RuleError> {
        let file: RuleFile = toml::from_str(toml_content)?;
        Ok(Self::new(file.rules))
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, RuleError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn categorize(&self, tx: &TransactionRecord) -> Categorization {
        self.rules
            .iter()
            .find_map(|cr| {
                self.rule_confidence(cr, tx).map(|confidence| Categorization {
                    category: cr.rule.category.clone(),
                    rule: Some(cr.rule.name.clone()),
                    confidence,
                })
            })
            .unwrap_or_else(Categorization::fallback)
    }

    /// One categorization per transaction, in input order.
    pub fn categorize_all(&self, transactions: &[TransactionRecord]) -> Vec<Categorization> {
        transactions.iter().map(|tx| self.categorize(tx)).collect()
    }

    fn rule_confidence(&self, cr: &CompiledRule, tx: &TransactionRecord) -> Option<f64> {
        let rule = &cr.rule;

        // Optional amount range filter.
        if let Some(min) = rule.amount_min {
            if tx.amount < min {
                return None;
            }
        }
        if let Some(max) = rule.amount_max {
            if tx.amount > max {
                return None;
            }
        }

        let name = tx.name_for_matching();
        let text = name.to_lowercase();
        let pattern = rule.pattern.to_lowercase();

        match &rule.match_type {
            MatchType::Contains => text.contains(&pattern).then_some(1.0),
            MatchType::Exact => (text.trim() == pattern.trim()).then_some(1.0),
            MatchType::Regex => cr
                .compiled_regex
                .as_ref()
                .is_some_and(|re| re.is_match(name))
                .then_some(1.0),
            MatchType::Fuzzy { threshold } => {
                let similarity = sequence_ratio(&text, &pattern);
                (similarity >= *threshold).then_some(similarity)
            }
        }
    }
}
