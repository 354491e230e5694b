use super::{database_error, Processor};
use crate::dialect::sqlite::SqliteQuoter;
use crate::dialect::Dialect;
use crate::quoter::Quoter;
use crate::util::{sanitize_connection_error, sanitize_url, MigrationError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Executor, Pool, Sqlite, Transaction};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// SQLite over a single pooled connection, so `sqlite::memory:` databases
/// survive between statements.
pub struct SqliteProcessor {
    pool: Pool<Sqlite>,
    transaction: Option<Transaction<'static, Sqlite>>,
}

impl SqliteProcessor {
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let connect_error = |e: sqlx::Error| {
            let sanitized_error = sanitize_connection_error(connection_string, &e.to_string());
            MigrationError::DatabaseError(format!(
                "Failed to connect to {}: {sanitized_error}",
                sanitize_url(connection_string)
            ))
        };
        let options = SqliteConnectOptions::from_str(connection_string)
            .map_err(connect_error)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(connect_error)?;
        info!(url = %sanitize_url(connection_string), "Opened SQLite database");

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self {
            pool,
            transaction: None,
        }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    async fn count(&mut self, query: &str, binds: &[&str]) -> Result<bool> {
        let mut query = sqlx::query_scalar::<_, i64>(query);
        for value in binds {
            query = query.bind(*value);
        }
        let found = match self.transaction.as_mut() {
            Some(transaction) => query.fetch_one(&mut **transaction).await,
            None => query.fetch_one(&self.pool).await,
        };
        found
            .map(|count| count > 0)
            .map_err(|e| database_error("query the catalog", e))
    }

    fn master_table(schema: Option<&str>) -> String {
        match schema {
            Some(schema) => format!("{}.sqlite_master", SqliteQuoter.quote(schema)),
            None => "sqlite_master".to_string(),
        }
    }
}

#[async_trait]
impl Processor for SqliteProcessor {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn execute(&mut self, sql: &str) -> Result<()> {
        debug!(sql, "Executing statement");
        let statement = sqlx::raw_sql(sql);
        let result = match self.transaction.as_mut() {
            Some(transaction) => (&mut **transaction).execute(statement).await,
            None => self.pool.execute(statement).await,
        };
        result
            .map(|_| ())
            .map_err(|e| database_error("execute SQL", e))
    }

    async fn begin(&mut self) -> Result<()> {
        if self.transaction.is_some() {
            return Err(MigrationError::DatabaseError(
                "A transaction is already open".to_string(),
            ));
        }
        let transaction = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error("begin transaction", e))?;
        debug!("Transaction started");
        self.transaction = Some(transaction);
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        let Some(transaction) = self.transaction.take() else {
            return Ok(());
        };
        transaction
            .commit()
            .await
            .map_err(|e| database_error("commit transaction", e))?;
        debug!("Transaction committed");
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        let Some(transaction) = self.transaction.take() else {
            return Ok(());
        };
        transaction
            .rollback()
            .await
            .map_err(|e| database_error("roll back transaction", e))?;
        warn!("Transaction rolled back");
        Ok(())
    }

    /// Attached databases play the role of schemas.
    async fn schema_exists(&mut self, schema: &str) -> Result<bool> {
        self.count(
            "SELECT COUNT(*) FROM pragma_database_list WHERE name = ?",
            &[schema],
        )
        .await
    }

    async fn table_exists(&mut self, schema: Option<&str>, table: &str) -> Result<bool> {
        let query = format!(
            "SELECT COUNT(*) FROM {} WHERE type = 'table' AND name = ?",
            Self::master_table(schema)
        );
        self.count(&query, &[table]).await
    }

    async fn column_exists(
        &mut self,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Result<bool> {
        self.count(
            "SELECT COUNT(*) FROM pragma_table_info(?, ?) WHERE name = ?",
            &[table, schema.unwrap_or("main"), column],
        )
        .await
    }

    async fn index_exists(
        &mut self,
        schema: Option<&str>,
        table: &str,
        index: &str,
    ) -> Result<bool> {
        let query = format!(
            "SELECT COUNT(*) FROM {} WHERE type = 'index' AND tbl_name = ? AND name = ?",
            Self::master_table(schema)
        );
        self.count(&query, &[table, index]).await
    }

    async fn sequence_exists(&mut self, _schema: Option<&str>, _sequence: &str) -> Result<bool> {
        Err(MigrationError::unsupported(Dialect::Sqlite, "sequences"))
    }
}
