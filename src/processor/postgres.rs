use super::{database_error, Processor};
use crate::dialect::Dialect;
use crate::util::{sanitize_connection_error, sanitize_url, MigrationError, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, Pool, Postgres, Transaction};
use tracing::{debug, info, warn};

const DEFAULT_SCHEMA: &str = "public";

pub struct PostgresProcessor {
    pool: Pool<Postgres>,
    transaction: Option<Transaction<'static, Postgres>>,
}

impl PostgresProcessor {
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await
            .map_err(|e| {
                let sanitized_error = sanitize_connection_error(connection_string, &e.to_string());
                MigrationError::DatabaseError(format!(
                    "Failed to connect to {}: {sanitized_error}",
                    sanitize_url(connection_string)
                ))
            })?;
        info!(url = %sanitize_url(connection_string), "Connected to PostgreSQL");

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self {
            pool,
            transaction: None,
        }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    async fn exists(&mut self, query: &str, binds: &[&str]) -> Result<bool> {
        let mut query = sqlx::query_scalar::<_, bool>(query);
        for value in binds {
            query = query.bind(*value);
        }
        let found = match self.transaction.as_mut() {
            Some(transaction) => query.fetch_one(&mut **transaction).await,
            None => query.fetch_one(&self.pool).await,
        };
        found.map_err(|e| database_error("query the catalog", e))
    }
}

#[async_trait]
impl Processor for PostgresProcessor {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
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

    async fn schema_exists(&mut self, schema: &str) -> Result<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM information_schema.schemata WHERE schema_name = $1)",
            &[schema],
        )
        .await
    }

    async fn table_exists(&mut self, schema: Option<&str>, table: &str) -> Result<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_schema = $1 AND table_name = $2)",
            &[schema.unwrap_or(DEFAULT_SCHEMA), table],
        )
        .await
    }

    async fn column_exists(
        &mut self,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Result<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM information_schema.columns WHERE table_schema = $1 AND table_name = $2 AND column_name = $3)",
            &[schema.unwrap_or(DEFAULT_SCHEMA), table, column],
        )
        .await
    }

    async fn index_exists(
        &mut self,
        schema: Option<&str>,
        table: &str,
        index: &str,
    ) -> Result<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM pg_indexes WHERE schemaname = $1 AND tablename = $2 AND indexname = $3)",
            &[schema.unwrap_or(DEFAULT_SCHEMA), table, index],
        )
        .await
    }

    async fn sequence_exists(&mut self, schema: Option<&str>, sequence: &str) -> Result<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM information_schema.sequences WHERE sequence_schema = $1 AND sequence_name = $2)",
            &[schema.unwrap_or(DEFAULT_SCHEMA), sequence],
        )
        .await
    }
}
