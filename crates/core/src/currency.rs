use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

pub const EUR: &str = "EUR";

/// An upper-cased currency code. Absent or blank codes mean EUR.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Self {
        let code = code.trim();
        if code.is_empty() {
            Self::eur()
        } else {
            Currency(code.to_uppercase())
        }
    }

    pub fn eur() -> Self {
        Currency(EUR.to_string())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    pub fn is_eur(&self) -> bool {
        self.0 == EUR
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::eur()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Currency::new(s))
    }
}

impl From<Option<&str>> for Currency {
    fn from(code: Option<&str>) -> Self {
        code.map(Currency::new).unwrap_or_default()
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

// `null` and "" both fall back to EUR, same as a missing field.
impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = Option::<String>::deserialize(deserializer)?;
        Ok(Currency::from(code.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_code_defaults_to_eur() {
        assert!(Currency::new("").is_eur());
        assert!(Currency::new("   ").is_eur());
        assert!(Currency::from(None).is_eur());
    }

    #[test]
    fn codes_are_upper_cased() {
        assert_eq!(Currency::new(" usd ").code(), "USD");
        assert_eq!(Currency::new("eur"), Currency::eur());
    }

    #[test]
    fn deserialize_null_is_eur() {
        let c: Currency = serde_json::from_str("null").unwrap();
        assert!(c.is_eur());
        let c: Currency = serde_json::from_str("\"gbp\"").unwrap();
        assert_eq!(c.to_string(), "GBP");
    }
}
