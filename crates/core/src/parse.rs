//! Tolerant parsers for the loosely formatted dates and amounts that come out
//! of statement imports and receipt extraction. Failure is `None`, never an error.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::money::Money;

/// Tried in order. Every format must yield a four-digit year.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d.%m.%y", "%d/%m/%Y"];

const CURRENCY_CODES: &[&str] = &["EUR", "USD", "GBP", "CHF"];

// ── Dates ─────────────────────────────────────────────────────────────────────

pub fn try_parse_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    // chrono accepts short years for %Y, so "10.03.24" would otherwise land in year 24.
    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .find(|d| d.year() >= 1000)
}

// ── Amounts ───────────────────────────────────────────────────────────────────

/// Parses `45.00`, `45,00`, `1.234,56`, `1,234.56`, `€ 12,50`, `12.50 USD`,
/// `-3,20` and `3,20-`.
pub fn try_parse_amount(input: &str) -> Option<Money> {
    let mut s = input.trim().to_uppercase();
    for code in CURRENCY_CODES {
        s = s.replace(code, "");
    }
    let s: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '€' | '$' | '£' | '\''))
        .collect();

    let (negative, body) = if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_suffix('-') {
        (true, rest)
    } else {
        (false, s.strip_prefix('+').unwrap_or(&s))
    };
    if body.is_empty() {
        return None;
    }

    let normalized = match (body.rfind('.'), body.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => body.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => body.replace(',', ""),
        (None, Some(_)) => body.replace(',', "."),
        _ => body.to_string(),
    };
    if !normalized.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    let value = Decimal::from_str(&normalized).ok()?;
    Some(Money::from_decimal(if negative { -value } else { value }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_iso_and_german_dates() {
        assert_eq!(try_parse_date("2024-03-10"), Some(date(2024, 3, 10)));
        assert_eq!(try_parse_date(" 10.03.2024 "), Some(date(2024, 3, 10)));
        assert_eq!(try_parse_date("10/03/2024"), Some(date(2024, 3, 10)));
    }

    #[test]
    fn two_digit_year_is_expanded() {
        assert_eq!(try_parse_date("10.03.24"), Some(date(2024, 3, 10)));
    }

    #[test]
    fn malformed_dates_are_none() {
        assert_eq!(try_parse_date(""), None);
        assert_eq!(try_parse_date("gestern"), None);
        assert_eq!(try_parse_date("31.02.2024"), None);
        assert_eq!(try_parse_date("03/10/24"), None);
    }

    #[test]
    fn parses_dot_and_comma_decimals() {
        assert_eq!(try_parse_amount("45.00"), Some(Money::from_cents(4500)));
        assert_eq!(try_parse_amount("45,00"), Some(Money::from_cents(4500)));
    }

    #[test]
    fn parses_grouped_amounts() {
        assert_eq!(try_parse_amount("1.234,56"), Some(Money::from_cents(123456)));
        assert_eq!(try_parse_amount("1,234.56"), Some(Money::from_cents(123456)));
    }

    #[test]
    fn strips_symbols_and_codes() {
        assert_eq!(try_parse_amount("€ 12,50"), Some(Money::from_cents(1250)));
        assert_eq!(try_parse_amount("12.50 usd"), Some(Money::from_cents(1250)));
        assert_eq!(try_parse_amount("$7.99"), Some(Money::from_cents(799)));
    }

    #[test]
    fn handles_sign_positions() {
        assert_eq!(try_parse_amount("-3,20"), Some(Money::from_cents(-320)));
        assert_eq!(try_parse_amount("3,20-"), Some(Money::from_cents(-320)));
        assert_eq!(try_parse_amount("+3.20"), Some(Money::from_cents(320)));
    }

    #[test]
    fn garbage_amounts_are_none() {
        assert_eq!(try_parse_amount(""), None);
        assert_eq!(try_parse_amount("EUR"), None);
        assert_eq!(try_parse_amount("zwölf"), None);
        assert_eq!(try_parse_amount("1.2.3"), None);
    }
}
