use crate::dialect::Dialect;
use crate::util::MigrationError;
use thiserror::Error;

pub use crate::validate::ValidationError;

/// Structured error type for polymold library operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Migration validation failed: {message}")]
    Validation {
        message: String,
        errors: Vec<ValidationError>,
    },

    #[error("{dialect} does not support {feature}")]
    Unsupported { dialect: Dialect, feature: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Cannot reverse {kind} expression; give the migration an explicit down")]
    Irreversible { kind: String },

    #[error("Type mapping failed: {message}")]
    TypeMap { message: String },

    #[error("Lint error: {message}")]
    Lint { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Migration {version} failed: {message}")]
    Execution { version: u32, message: String },

    #[error("Lint check failed with {count} error(s)")]
    LintFailed {
        count: usize,
        issues: Vec<crate::lint::LintResult>,
    },

    #[error("No migrations found in {source_path}")]
    NoMigrations { source_path: String },

    #[error("Runtime error: {message}")]
    Runtime { message: String },
}

impl Error {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn validation(errors: Vec<ValidationError>) -> Self {
        Self::Validation {
            message: format!("{} problem(s) found", errors.len()),
            errors,
        }
    }

    pub fn execution(version: u32, message: impl Into<String>) -> Self {
        Self::Execution {
            version,
            message: message.into(),
        }
    }

    pub fn no_migrations(source_path: impl Into<String>) -> Self {
        Self::NoMigrations {
            source_path: source_path.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }
}

/// Database errors without a migration to blame become [`Error::Database`];
/// `apply` reports connection and statement failures with their own variants.
impl From<MigrationError> for Error {
    fn from(error: MigrationError) -> Self {
        match error {
            MigrationError::ParseError(message) => Self::Parse { message },
            MigrationError::DatabaseError(message) => Self::Database { message },
            MigrationError::ValidationError(message) => Self::Validation {
                message,
                errors: Vec::new(),
            },
            MigrationError::LintError(message) => Self::Lint { message },
            MigrationError::Unsupported { dialect, feature } => {
                Self::Unsupported { dialect, feature }
            }
            MigrationError::TypeMapError(message) => Self::TypeMap { message },
            MigrationError::Irreversible(kind) => Self::Irreversible { kind },
            MigrationError::Io(error) => Self::Io {
                message: error.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_stay_parse_errors() {
        let error = Error::from(MigrationError::ParseError("bad json".into()));
        assert!(matches!(error, Error::Parse { message } if message == "bad json"));
    }

    #[test]
    fn irreversible_names_the_expression() {
        let error = Error::from(MigrationError::Irreversible("drop_table".into()));
        assert!(matches!(&error, Error::Irreversible { kind } if kind == "drop_table"));
        assert!(error.to_string().contains("explicit down"));
    }

    #[test]
    fn type_map_errors_are_distinct() {
        let error = Error::from(MigrationError::TypeMapError("string(9000) too large".into()));
        assert!(matches!(error, Error::TypeMap { .. }));
    }

    #[test]
    fn validation_errors_keep_their_message() {
        let error = Error::from(MigrationError::ValidationError("table has no columns".into()));
        match error {
            Error::Validation { message, errors } => {
                assert_eq!(message, "table has no columns");
                assert!(errors.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn database_and_io_errors() {
        assert!(matches!(
            Error::from(MigrationError::DatabaseError("gone".into())),
            Error::Database { .. }
        ));
        assert!(matches!(
            Error::from(MigrationError::LintError("denied".into())),
            Error::Lint { .. }
        ));
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        assert!(matches!(
            Error::from(MigrationError::from(io)),
            Error::Io { message } if message.contains("missing.json")
        ));
    }

    #[test]
    fn unsupported_keeps_dialect_and_feature() {
        let error = Error::from(MigrationError::unsupported(Dialect::Sqlite, "sequences"));
        assert!(matches!(
            error,
            Error::Unsupported { dialect: Dialect::Sqlite, ref feature } if feature == "sequences"
        ));
    }
}
