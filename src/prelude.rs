//! Convenient re-exports for common polymold usage.
//!
//! # Example
//!
//! ```no_run
//! use polymold::prelude::*;
//!
//! let result = generate(GenerateOptions::new(
//!     vec!["migrations".into()],
//!     Dialect::Postgres,
//! )).unwrap();
//!
//! println!("Generated {} statements", result.statement_count());
//! ```

// Functions
pub use crate::api::{apply, apply_blocking, generate, validate};

// Options
pub use crate::api::{ApplyOptions, GenerateOptions, ValidateOptions};

// Results
pub use crate::api::{ApplyResult, GenerateResult, GeneratedMigration, ValidateResult};

// Error types
pub use crate::api::{Error, ValidationError};

// Core types
pub use crate::dialect::Dialect;
pub use crate::generator::{generator_for, CompatibilityMode, Generator, GeneratorOptions};
pub use crate::model::{Direction, Expression, Migration};

// Re-export LintResult as LintIssue for accessing Error::LintFailed issues
pub use crate::lint::LintResult as LintIssue;
