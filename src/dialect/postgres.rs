use super::Dialect;
use crate::generator::{Generator, GeneratorOptions, IndexFeatures};
use crate::model::{
    CreateIndex, DbType, IndexColumn, IndexMethod, InsertData, MoveTable, NullsOrder,
    SortDirection, SystemMethod,
};
use crate::quoter::Quoter;
use crate::typemap::{TypeMap, UNBOUNDED};
use crate::util::Result;

const MAX_CHAR_LENGTH: u32 = 10_485_760;

pub struct PostgresQuoter;

impl Quoter for PostgresQuoter {
    fn format_bool(&self, value: bool) -> String {
        value.to_string()
    }

    fn format_bytes(&self, bytes: &[u8]) -> String {
        format!("'\\x{}'::bytea", hex::encode(bytes))
    }

    fn format_system_method(&self, method: SystemMethod) -> Option<String> {
        let sql = match method {
            SystemMethod::NewGuid => "gen_random_uuid()",
            SystemMethod::NewSequentialId => return None,
            SystemMethod::CurrentDateTime => "now()",
            SystemMethod::CurrentUtcDateTime => "(now() at time zone 'UTC')",
            SystemMethod::CurrentDateTimeOffset => "current_timestamp",
            SystemMethod::CurrentUser => "current_user",
        };
        Some(sql.to_string())
    }

    fn max_identifier_length(&self) -> Option<usize> {
        Some(63)
    }
}

pub fn type_map() -> TypeMap {
    let mut map = TypeMap::new(Dialect::Postgres);
    map.set(DbType::AnsiStringFixedLength, "CHAR(255)")
        .set_sized(DbType::AnsiStringFixedLength, MAX_CHAR_LENGTH, "CHAR($size)")
        .set(DbType::AnsiString, "TEXT")
        .set_sized(DbType::AnsiString, MAX_CHAR_LENGTH, "VARCHAR($size)")
        .set(DbType::StringFixedLength, "CHAR(255)")
        .set_sized(DbType::StringFixedLength, MAX_CHAR_LENGTH, "CHAR($size)")
        .set(DbType::String, "TEXT")
        .set_sized(DbType::String, MAX_CHAR_LENGTH, "VARCHAR($size)")
        .set_sized(DbType::String, UNBOUNDED, "TEXT")
        .set(DbType::Binary, "BYTEA")
        .set(DbType::Boolean, "BOOLEAN")
        .set(DbType::Byte, "SMALLINT")
        .set(DbType::Currency, "MONEY")
        .set(DbType::Date, "DATE")
        .set(DbType::DateTime, "TIMESTAMP")
        .set(DbType::DateTime2, "TIMESTAMP")
        .set(DbType::DateTimeOffset, "TIMESTAMPTZ")
        .set(DbType::Decimal, "DECIMAL(19,5)")
        .set_sized(DbType::Decimal, 1000, "DECIMAL($size,$scale)")
        .set(DbType::Double, "DOUBLE PRECISION")
        .set(DbType::Guid, "UUID")
        .set(DbType::Int16, "SMALLINT")
        .set(DbType::Int32, "INTEGER")
        .set(DbType::Int64, "BIGINT")
        .set(DbType::Single, "REAL")
        .set(DbType::Time, "TIME")
        .set(DbType::Xml, "XML");
    map
}

pub struct PostgresGenerator {
    quoter: PostgresQuoter,
    type_map: TypeMap,
    options: GeneratorOptions,
}

impl PostgresGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            quoter: PostgresQuoter,
            type_map: type_map(),
            options,
        }
    }
}

fn format_method(method: IndexMethod) -> &'static str {
    match method {
        IndexMethod::BTree => "btree",
        IndexMethod::Hash => "hash",
        IndexMethod::Gin => "gin",
        IndexMethod::Gist => "gist",
        IndexMethod::Brin => "brin",
    }
}

impl Generator for PostgresGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn quoter(&self) -> &dyn Quoter {
        &self.quoter
    }

    fn type_map(&self) -> &TypeMap {
        &self.type_map
    }

    fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn format_collation(&self, collation: &str) -> String {
        format!("COLLATE {}", self.quoter.quote(collation))
    }

    fn move_table(&self, move_table: &MoveTable) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} SET SCHEMA {}",
            self.qualified_table(move_table.schema.as_deref(), &move_table.table),
            self.quoter.quote_schema_name(&move_table.destination_schema)
        )])
    }

    fn index_features(&self) -> IndexFeatures {
        IndexFeatures {
            clustered: false,
            include: true,
            filter: true,
            method: true,
            concurrently: true,
            if_not_exists: true,
            nulls_not_distinct: true,
            storage: true,
            tablespace: true,
        }
    }

    fn index_column(&self, column: &IndexColumn) -> Result<String> {
        let mut sql = self.quoter.quote_column_name(&column.name);
        sql.push_str(match column.direction {
            SortDirection::Ascending => " ASC",
            SortDirection::Descending => " DESC",
        });
        match column.nulls {
            Some(NullsOrder::First) => sql.push_str(" NULLS FIRST"),
            Some(NullsOrder::Last) => sql.push_str(" NULLS LAST"),
            None => {}
        }
        Ok(sql)
    }

    fn create_index(&self, index: &CreateIndex) -> Result<Vec<String>> {
        let options = self.supported_index_options(&index.options)?;

        let mut sql = String::from("CREATE ");
        if index.unique {
            sql.push_str("UNIQUE ");
        }
        sql.push_str("INDEX ");
        if options.concurrently {
            sql.push_str("CONCURRENTLY ");
        }
        if options.if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }
        sql.push_str(&format!(
            "{} ON {}",
            self.quoter.quote(&crate::generator::index_name(index)),
            self.qualified_table(index.schema.as_deref(), &index.table)
        ));
        if let Some(method) = options.method {
            sql.push_str(&format!(" USING {}", format_method(method)));
        }
        sql.push_str(&format!(" ({})", self.index_columns(&index.columns)?));

        if !options.include.is_empty() {
            sql.push_str(&format!(
                " INCLUDE ({})",
                self.quoter.quote_column_list(&options.include)
            ));
        }
        if options.nulls_distinct == Some(false) {
            sql.push_str(" NULLS NOT DISTINCT");
        }
        if !options.storage.is_empty() {
            let parameters: Vec<String> = options
                .storage
                .iter()
                .map(|(key, value)| format!("{} = {}", key.to_lowercase(), value))
                .collect();
            sql.push_str(&format!(" WITH ({})", parameters.join(", ")));
        }
        if let Some(ref tablespace) = options.tablespace {
            sql.push_str(&format!(" TABLESPACE {}", self.quoter.quote(tablespace)));
        }
        if let Some(ref filter) = options.filter {
            sql.push_str(&format!(" WHERE {filter}"));
        }

        Ok(vec![sql])
    }

    fn format_sequence_cache(&self, cache: i64) -> Result<Option<String>> {
        Ok(Some(format!("CACHE {}", cache.max(1))))
    }

    fn insert_data(&self, insert: &InsertData) -> Result<Vec<String>> {
        let table = self.qualified_table(insert.schema.as_deref(), &insert.table);
        if !insert.identity_insert {
            return Ok(insert.rows.iter().map(|row| self.insert_row(&table, row)).collect());
        }
        Ok(insert
            .rows
            .iter()
            .map(|row| {
                let columns: Vec<String> = row.keys().cloned().collect();
                let values: Vec<String> = row.values().map(|v| self.quoter.quote_value(v)).collect();
                format!(
                    "INSERT INTO {} ({}) OVERRIDING SYSTEM VALUE VALUES ({})",
                    table,
                    self.quoter.quote_column_list(&columns),
                    values.join(", ")
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use crate::util::MigrationError;
    use std::collections::BTreeMap;

    fn generator() -> PostgresGenerator {
        PostgresGenerator::new(GeneratorOptions::default())
    }

    fn sql(expression: Expression) -> Vec<String> {
        generator().generate(&expression).unwrap()
    }

    #[test]
    fn create_table_with_identity_and_defaults() {
        let table = CreateTable::new(
            "users",
            vec![
                ColumnDefinition::new("id", DbType::Int64).primary_key().identity(),
                ColumnDefinition::new("email", DbType::String).sized(255).not_null().unique(),
                ColumnDefinition::new("active", DbType::Boolean)
                    .not_null()
                    .with_default(DefaultValue::value(true)),
                ColumnDefinition::new("created_at", DbType::DateTimeOffset)
                    .with_default(DefaultValue::Method(SystemMethod::CurrentDateTimeOffset)),
            ],
        )
        .in_schema("app");

        assert_eq!(
            sql(Expression::CreateTable(table)),
            vec![concat!(
                "CREATE TABLE \"app\".\"users\" (\n",
                "    \"id\" BIGINT GENERATED BY DEFAULT AS IDENTITY NOT NULL PRIMARY KEY,\n",
                "    \"email\" VARCHAR(255) NOT NULL UNIQUE,\n",
                "    \"active\" BOOLEAN NOT NULL DEFAULT true,\n",
                "    \"created_at\" TIMESTAMPTZ DEFAULT current_timestamp\n",
                ")"
            )]
        );
    }

    #[test]
    fn identity_with_custom_seed() {
        let mut column = ColumnDefinition::new("id", DbType::Int32).primary_key();
        column.identity = Some(Identity {
            seed: 100,
            increment: 5,
            generation: IdentityGeneration::Always,
        });
        let statements = sql(Expression::CreateTable(CreateTable::new("t", vec![column])));
        assert!(statements[0]
            .contains("\"id\" INTEGER GENERATED ALWAYS AS IDENTITY (START WITH 100 INCREMENT BY 5) NOT NULL PRIMARY KEY"));
    }

    #[test]
    fn composite_key_foreign_keys_and_comments() {
        let mut table = CreateTable::new(
            "order_lines",
            vec![
                ColumnDefinition::new("order_id", DbType::Int32).primary_key(),
                ColumnDefinition::new("line", DbType::Int32)
                    .primary_key()
                    .with_description("Line number"),
            ],
        );
        table.description = Some("Order's lines".into());
        table.foreign_keys.push(ForeignKeyDefinition {
            name: None,
            foreign_schema: None,
            foreign_table: "order_lines".into(),
            foreign_columns: vec!["order_id".into()],
            primary_schema: None,
            primary_table: "orders".into(),
            primary_columns: vec!["id".into()],
            on_delete: Rule::Cascade,
            on_update: Rule::None,
        });

        let statements = sql(Expression::CreateTable(table));
        assert_eq!(statements.len(), 4);
        assert!(statements[0].contains("CONSTRAINT \"PK_order_lines\" PRIMARY KEY (\"order_id\", \"line\")"));
        assert!(!statements[0].contains("NOT NULL PRIMARY KEY"));
        assert_eq!(
            statements[1],
            "ALTER TABLE \"order_lines\" ADD CONSTRAINT \"FK_order_lines_order_id_orders_id\" FOREIGN KEY (\"order_id\") REFERENCES \"orders\" (\"id\") ON DELETE CASCADE"
        );
        assert_eq!(statements[2], "COMMENT ON TABLE \"order_lines\" IS 'Order''s lines'");
        assert_eq!(
            statements[3],
            "COMMENT ON COLUMN \"order_lines\".\"line\" IS 'Line number'"
        );
    }

    #[test]
    fn alter_column_is_one_statement() {
        let statements = sql(Expression::AlterColumn(AlterColumn {
            schema: Some("app".into()),
            table: "users".into(),
            column: ColumnDefinition::new("name", DbType::String)
                .sized(100)
                .not_null()
                .with_default(DefaultValue::value("")),
        }));
        assert_eq!(
            statements,
            vec![concat!(
                "ALTER TABLE \"app\".\"users\" ",
                "ALTER COLUMN \"name\" TYPE VARCHAR(100), ",
                "ALTER COLUMN \"name\" SET NOT NULL, ",
                "ALTER COLUMN \"name\" SET DEFAULT ''"
            )]
        );
    }

    #[test]
    fn create_index_with_every_option() {
        let mut storage = BTreeMap::new();
        storage.insert("FILLFACTOR".to_string(), "70".to_string());
        let index = CreateIndex {
            schema: Some("app".into()),
            table: "users".into(),
            name: Some("ix_users_email".into()),
            columns: vec![
                IndexColumn::new("email"),
                IndexColumn::new("created").descending().nulls(NullsOrder::Last),
            ],
            unique: true,
            options: IndexOptions {
                concurrently: true,
                if_not_exists: true,
                method: Some(IndexMethod::BTree),
                include: vec!["name".into()],
                nulls_distinct: Some(false),
                storage,
                tablespace: Some("fast".into()),
                filter: Some("deleted_at IS NULL".into()),
                clustered: None,
            },
        };
        assert_eq!(
            sql(Expression::CreateIndex(index)),
            vec![concat!(
                "CREATE UNIQUE INDEX CONCURRENTLY IF NOT EXISTS \"ix_users_email\" ON \"app\".\"users\" USING btree ",
                "(\"email\" ASC, \"created\" DESC NULLS LAST) INCLUDE (\"name\") NULLS NOT DISTINCT ",
                "WITH (fillfactor = 70) TABLESPACE \"fast\" WHERE deleted_at IS NULL"
            )]
        );
    }

    #[test]
    fn clustered_index_is_unsupported_in_strict_mode() {
        let mut index = CreateIndex::new("users", "ix", vec![IndexColumn::new("id")]);
        index.options.clustered = Some(true);
        let strict = PostgresGenerator::new(GeneratorOptions::strict());
        let err = strict.generate(&Expression::CreateIndex(index.clone())).unwrap_err();
        assert!(matches!(err, MigrationError::Unsupported { .. }));

        let statements = sql(Expression::CreateIndex(index));
        assert_eq!(statements, vec!["CREATE INDEX \"ix\" ON \"users\" (\"id\" ASC)"]);
    }

    #[test]
    fn drop_statements() {
        assert_eq!(
            sql(Expression::DropTable(DropTable {
                schema: Some("app".into()),
                name: "users".into(),
                if_exists: true,
                cascade: true,
            })),
            vec!["DROP TABLE IF EXISTS \"app\".\"users\" CASCADE"]
        );
        assert_eq!(
            sql(Expression::DropIndex(DropIndex {
                schema: Some("app".into()),
                table: "users".into(),
                name: "ix".into(),
                if_exists: false,
            })),
            vec!["DROP INDEX \"app\".\"ix\""]
        );
        assert_eq!(
            sql(Expression::DropSchema(DropSchema {
                name: "app".into(),
                cascade: true,
            })),
            vec!["DROP SCHEMA \"app\" CASCADE"]
        );
    }

    #[test]
    fn move_and_rename() {
        assert_eq!(
            sql(Expression::MoveTable(MoveTable {
                schema: Some("staging".into()),
                table: "users".into(),
                destination_schema: "app".into(),
            })),
            vec!["ALTER TABLE \"staging\".\"users\" SET SCHEMA \"app\""]
        );
        assert_eq!(
            sql(Expression::RenameTable(RenameTable {
                schema: None,
                old_name: "user".into(),
                new_name: "users".into(),
            })),
            vec!["ALTER TABLE \"user\" RENAME TO \"users\""]
        );
    }

    #[test]
    fn sequence_and_literals() {
        let sequence = SequenceDefinition {
            schema: Some("app".into()),
            name: "order_no".into(),
            start: Some(1000),
            increment: Some(1),
            min_value: None,
            max_value: Some(99_999),
            cache: Some(0),
            cycle: true,
        };
        assert_eq!(
            sql(Expression::CreateSequence(sequence)),
            vec!["CREATE SEQUENCE \"app\".\"order_no\" START WITH 1000 INCREMENT BY 1 MAXVALUE 99999 CACHE 1 CYCLE"]
        );
        assert_eq!(
            PostgresQuoter.quote_value(&SqlValue::bytes(vec![0xab, 0x01])),
            "'\\xab01'::bytea"
        );
        assert_eq!(PostgresQuoter.quote_value(&SqlValue::Bool(false)), "false");
    }

    #[test]
    fn identity_insert_overrides_system_value() {
        let row = Row::from([("id".to_string(), SqlValue::Integer(1))]);
        let statements = sql(Expression::InsertData(InsertData {
            schema: None,
            table: "users".into(),
            rows: vec![row],
            identity_insert: true,
        }));
        assert_eq!(
            statements,
            vec!["INSERT INTO \"users\" (\"id\") OVERRIDING SYSTEM VALUE VALUES (1)"]
        );
    }

    #[test]
    fn sequential_guid_default_is_dropped_in_loose_mode() {
        let column = ColumnDefinition::new("id", DbType::Guid)
            .with_default(DefaultValue::Method(SystemMethod::NewSequentialId));
        let statements = sql(Expression::CreateColumn(CreateColumn {
            schema: None,
            table: "t".into(),
            column,
        }));
        assert_eq!(statements, vec!["ALTER TABLE \"t\" ADD COLUMN \"id\" UUID"]);
    }
}
