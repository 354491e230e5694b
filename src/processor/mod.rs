//! Execution of generated SQL.
//!
//! A [`Processor`] runs statements against one target. Live processors wrap a
//! sqlx pool; [`ScriptProcessor`] only records what would run.

mod postgres;
mod script;
mod sqlite;

pub use postgres::PostgresProcessor;
pub use script::{ScriptEntry, ScriptProcessor};
pub use sqlite::SqliteProcessor;

use crate::dialect::Dialect;
use crate::util::{MigrationError, Result};
use async_trait::async_trait;

#[async_trait]
pub trait Processor: Send {
    fn dialect(&self) -> Dialect;

    /// Runs one statement, inside the open transaction if there is one.
    async fn execute(&mut self, sql: &str) -> Result<()>;

    async fn begin(&mut self) -> Result<()>;
    async fn commit(&mut self) -> Result<()>;
    async fn rollback(&mut self) -> Result<()>;

    async fn schema_exists(&mut self, schema: &str) -> Result<bool>;
    async fn table_exists(&mut self, schema: Option<&str>, table: &str) -> Result<bool>;
    async fn column_exists(
        &mut self,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Result<bool>;
    async fn index_exists(
        &mut self,
        schema: Option<&str>,
        table: &str,
        index: &str,
    ) -> Result<bool>;
    async fn sequence_exists(&mut self, schema: Option<&str>, sequence: &str) -> Result<bool>;
}

/// Opens a live processor for `dialect`.
pub async fn connect(dialect: Dialect, url: &str) -> Result<Box<dyn Processor>> {
    match dialect {
        Dialect::Postgres => Ok(Box::new(PostgresProcessor::connect(url).await?)),
        Dialect::Sqlite => Ok(Box::new(SqliteProcessor::connect(url).await?)),
        Dialect::SqlServer | Dialect::Oracle | Dialect::Firebird => {
            Err(MigrationError::DatabaseError(format!(
                "No bundled driver for {dialect}; use `polymold generate` to produce a script"
            )))
        }
    }
}

pub(crate) fn database_error(action: &str, error: sqlx::Error) -> MigrationError {
    MigrationError::DatabaseError(format!("Failed to {action}: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn script_only_dialects_cannot_connect() {
        for dialect in [Dialect::SqlServer, Dialect::Oracle, Dialect::Firebird] {
            assert!(!dialect.has_driver());
            let err = connect(dialect, "server=localhost").await.err().unwrap();
            assert!(err.to_string().contains("No bundled driver"));
        }
    }
}
