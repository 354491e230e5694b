use super::Processor;
use crate::dialect::Dialect;
use crate::generator::{generator_for, GeneratorOptions};
use crate::util::{MigrationError, Result};
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEntry {
    Begin,
    Statement(String),
    Commit,
    Rollback,
}

/// Records statements instead of running them.
#[derive(Debug, Clone)]
pub struct ScriptProcessor {
    dialect: Dialect,
    entries: Vec<ScriptEntry>,
}

impl ScriptProcessor {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[ScriptEntry] {
        &self.entries
    }

    pub fn statements(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                ScriptEntry::Statement(sql) => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    /// The recorded statements as a terminated script for the dialect.
    pub fn script(&self) -> String {
        generator_for(self.dialect, GeneratorOptions::default()).render_script(&self.statements())
    }

    fn no_connection(&self) -> MigrationError {
        MigrationError::unsupported(self.dialect, "existence checks without a connection")
    }
}

#[async_trait]
impl Processor for ScriptProcessor {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.entries.push(ScriptEntry::Statement(sql.to_string()));
        Ok(())
    }

    async fn begin(&mut self) -> Result<()> {
        self.entries.push(ScriptEntry::Begin);
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.entries.push(ScriptEntry::Commit);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.entries.push(ScriptEntry::Rollback);
        Ok(())
    }

    async fn schema_exists(&mut self, _schema: &str) -> Result<bool> {
        Err(self.no_connection())
    }

    async fn table_exists(&mut self, _schema: Option<&str>, _table: &str) -> Result<bool> {
        Err(self.no_connection())
    }

    async fn column_exists(
        &mut self,
        _schema: Option<&str>,
        _table: &str,
        _column: &str,
    ) -> Result<bool> {
        Err(self.no_connection())
    }

    async fn index_exists(
        &mut self,
        _schema: Option<&str>,
        _table: &str,
        _index: &str,
    ) -> Result<bool> {
        Err(self.no_connection())
    }

    async fn sequence_exists(&mut self, _schema: Option<&str>, _sequence: &str) -> Result<bool> {
        Err(self.no_connection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_statements_and_transaction_markers() {
        let mut processor = ScriptProcessor::new(Dialect::SqlServer);
        processor.begin().await.unwrap();
        processor.execute("CREATE TABLE [dbo].[t] ([id] INT)").await.unwrap();
        processor.commit().await.unwrap();

        assert_eq!(
            processor.entries(),
            &[
                ScriptEntry::Begin,
                ScriptEntry::Statement("CREATE TABLE [dbo].[t] ([id] INT)".to_string()),
                ScriptEntry::Commit,
            ]
        );
        assert_eq!(processor.script(), "CREATE TABLE [dbo].[t] ([id] INT)\nGO\n");
    }

    #[tokio::test]
    async fn existence_checks_need_a_connection() {
        let mut processor = ScriptProcessor::new(Dialect::Oracle);
        let err = processor.table_exists(None, "users").await.unwrap_err();
        assert!(matches!(err, MigrationError::Unsupported { dialect: Dialect::Oracle, .. }));
    }
}
