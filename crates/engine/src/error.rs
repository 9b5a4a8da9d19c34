use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Threshold '{name}' must be within 0.0..=1.0, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
    #[error("Limit '{name}' must be at least 1")]
    InvalidLimit { name: &'static str },
}

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse rules: {0}")]
    Parse(#[from] toml::de::Error),
}
