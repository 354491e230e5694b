use crate::dialect::Dialect;
use regex::Regex;
use thiserror::Error;

/// Masks the password of a connection URL so it can be logged or shown in errors.
pub fn sanitize_url(url: &str) -> String {
    let re = Regex::new(r"(://[^:/@]+):[^@/]*@").unwrap();
    re.replace(url, "$1:****@").to_string()
}

/// Strips any occurrence of the raw connection string (and its password) from a
/// driver error message.
pub fn sanitize_connection_error(connection_string: &str, message: &str) -> String {
    let mut sanitized = message.replace(connection_string, &sanitize_url(connection_string));
    let re = Regex::new(r"://[^:/@]+:([^@/]*)@").unwrap();
    if let Some(password) = re
        .captures(connection_string)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|p| !p.is_empty())
    {
        sanitized = sanitized.replace(password, "****");
    }
    sanitized
}

/// Splits a T-SQL script on `GO` batch separator lines.
/// Empty batches are dropped.
pub fn split_batches(sql: &str) -> Vec<String> {
    let re = Regex::new(r"(?im)^\s*GO\s*(?:--.*)?$").unwrap();
    re.split(sql)
        .map(str::trim)
        .filter(|batch| !batch.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Lint error: {0}")]
    LintError(String),

    #[error("{dialect} does not support {feature}")]
    Unsupported { dialect: Dialect, feature: String },

    #[error("Type mapping error: {0}")]
    TypeMapError(String),

    #[error("Cannot reverse {0} expression")]
    Irreversible(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrationError {
    pub fn unsupported(dialect: Dialect, feature: impl Into<String>) -> Self {
        Self::Unsupported {
            dialect,
            feature: feature.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;
