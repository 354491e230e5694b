//! polymold - database-agnostic schema migrations.
//!
//! Migrations are written once as dialect-neutral [`model::Expression`]s and
//! rendered to SQL for PostgreSQL, SQL Server, SQLite, Oracle and Firebird.
//!
//! # Quick Start
//!
//! Use the high-level API via the [`api`] module or [`prelude`]:
//!
//! ```no_run
//! use polymold::prelude::*;
//!
//! let result = generate(GenerateOptions::new(
//!     vec!["migrations".into()],
//!     Dialect::Sqlite,
//! )).unwrap();
//!
//! for migration in &result.migrations {
//!     println!("{}: {} statement(s)", migration.version, migration.statements.len());
//! }
//! ```
//!
//! # Modules
//!
//! - [`api`] - High-level API mirroring CLI commands
//! - [`prelude`] - Convenient re-exports for common usage
//! - [`model`] - Expressions and migrations
//! - [`generator`] - Expression to SQL rendering, one [`dialect`] at a time
//! - [`processor`] - Running generated SQL against a connection or a script

pub mod api;
pub mod apply;
pub mod conventions;
pub mod dialect;
pub mod generator;
pub mod lint;
pub mod migrate;
pub mod model;
pub mod prelude;
pub mod processor;
pub mod quoter;
pub mod typemap;
pub mod util;
pub mod validate;
