//! Firebird 3+.
//!
//! Firebird has no schemas, so every schema qualifier is ignored. Identifiers
//! are quoted only when they would not survive unquoted; unquoted names are
//! stored upper-cased by the server.

use super::Dialect;
use crate::generator::{ColumnClause, Generator, GeneratorOptions};
use crate::model::{
    AlterColumn, CreateIndex, CreateSchema, CreateTable, DbType, DropColumn, DropIndex,
    DropSchema, DropTable, RenameColumn, RenameTable, SequenceDefinition, SortDirection,
    SystemMethod,
};
use crate::quoter::Quoter;
use crate::typemap::{TypeMap, UNBOUNDED};
use crate::util::Result;
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

static PLAIN_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_$]*$").expect("valid identifier pattern"));

const RESERVED_WORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "AT", "AVG", "BEGIN", "BETWEEN", "BIGINT", "BLOB",
    "BOOLEAN", "BOTH", "BY", "CASE", "CAST", "CHAR", "CHARACTER", "CHECK", "CLOSE", "COLLATE",
    "COLUMN", "COMMIT", "CONNECT", "CONSTRAINT", "COUNT", "CREATE", "CROSS", "CURRENT",
    "CURRENT_DATE", "CURRENT_ROLE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER",
    "CURSOR", "DATE", "DAY", "DEC", "DECIMAL", "DECLARE", "DEFAULT", "DELETE", "DISTINCT",
    "DOUBLE", "DROP", "ELSE", "END", "ESCAPE", "EXECUTE", "EXISTS", "EXTERNAL", "EXTRACT",
    "FALSE", "FETCH", "FILTER", "FLOAT", "FOR", "FOREIGN", "FROM", "FULL", "FUNCTION", "GLOBAL",
    "GRANT", "GROUP", "HAVING", "HOUR", "IN", "INDEX", "INNER", "INSERT", "INT", "INTEGER",
    "INTO", "IS", "JOIN", "KEY", "LEADING", "LEFT", "LIKE", "MAX", "MIN", "MINUTE", "MONTH",
    "NATURAL", "NCHAR", "NO", "NOT", "NULL", "NUMERIC", "OF", "ON", "ONLY", "OPEN", "OR",
    "ORDER", "OUTER", "POSITION", "PRECISION", "PRIMARY", "PROCEDURE", "REAL", "REFERENCES",
    "RETURNS", "REVOKE", "RIGHT", "ROLLBACK", "ROW", "ROWS", "SECOND", "SELECT", "SET",
    "SMALLINT", "SOME", "SUM", "TABLE", "THEN", "TIME", "TIMESTAMP", "TO", "TRIGGER", "TRUE",
    "UNION", "UNIQUE", "UPDATE", "USER", "USING", "VALUE", "VALUES", "VARCHAR", "VARIABLE",
    "VARYING", "VIEW", "WHEN", "WHERE", "WHILE", "WITH", "YEAR",
];

pub struct FirebirdQuoter;

impl FirebirdQuoter {
    pub fn needs_quoting(&self, name: &str) -> bool {
        !PLAIN_IDENTIFIER.is_match(name)
            || RESERVED_WORDS.contains(&name.to_ascii_uppercase().as_str())
    }

    /// The name as stored in the system tables.
    fn stored_name(&self, name: &str) -> String {
        let name = self.unquote(name);
        if self.needs_quoting(&name) {
            name
        } else {
            name.to_ascii_uppercase()
        }
    }
}

impl Quoter for FirebirdQuoter {
    fn quote(&self, name: &str) -> String {
        if self.is_quoted(name) || !self.needs_quoting(name) {
            return name.to_string();
        }
        self.force_quote(name)
    }

    fn quote_table_name(&self, table: &str, _schema: Option<&str>) -> String {
        self.quote(table)
    }

    fn format_guid(&self, guid: &Uuid) -> String {
        format!("CHAR_TO_UUID('{}')", guid.hyphenated())
    }

    fn format_datetime(&self, value: &NaiveDateTime) -> String {
        self.format_string(&value.format("%Y-%m-%d %H:%M:%S%.f").to_string())
    }

    fn format_system_method(&self, method: SystemMethod) -> Option<String> {
        let sql = match method {
            SystemMethod::NewGuid => "gen_uuid()",
            SystemMethod::CurrentDateTime => "CURRENT_TIMESTAMP",
            SystemMethod::CurrentUser => "CURRENT_USER",
            SystemMethod::NewSequentialId
            | SystemMethod::CurrentUtcDateTime
            | SystemMethod::CurrentDateTimeOffset => return None,
        };
        Some(sql.to_string())
    }

    fn max_identifier_length(&self) -> Option<usize> {
        Some(31)
    }
}

pub fn type_map() -> TypeMap {
    let mut map = TypeMap::new(Dialect::Firebird);
    map.set(DbType::AnsiStringFixedLength, "CHAR(255)")
        .set_sized(DbType::AnsiStringFixedLength, 32767, "CHAR($size)")
        .set(DbType::AnsiString, "VARCHAR(255)")
        .set_sized(DbType::AnsiString, 32765, "VARCHAR($size)")
        .set_sized(DbType::AnsiString, UNBOUNDED, "BLOB SUB_TYPE TEXT")
        .set(DbType::StringFixedLength, "CHAR(255)")
        .set_sized(DbType::StringFixedLength, 8191, "CHAR($size)")
        .set(DbType::String, "VARCHAR(255)")
        .set_sized(DbType::String, 8191, "VARCHAR($size)")
        .set_sized(DbType::String, UNBOUNDED, "BLOB SUB_TYPE TEXT")
        .set(DbType::Binary, "BLOB SUB_TYPE BINARY")
        .set(DbType::Boolean, "BOOLEAN")
        .set(DbType::Byte, "SMALLINT")
        .set(DbType::Currency, "DECIMAL(18,4)")
        .set(DbType::Date, "DATE")
        .set(DbType::DateTime, "TIMESTAMP")
        .set(DbType::DateTime2, "TIMESTAMP")
        .set(DbType::DateTimeOffset, "TIMESTAMP WITH TIME ZONE")
        .set(DbType::Decimal, "DECIMAL(18,4)")
        .set_sized(DbType::Decimal, 18, "DECIMAL($size,$scale)")
        .set(DbType::Double, "DOUBLE PRECISION")
        .set(DbType::Guid, "CHAR(16) CHARACTER SET OCTETS")
        .set(DbType::Int16, "SMALLINT")
        .set(DbType::Int32, "INTEGER")
        .set(DbType::Int64, "BIGINT")
        .set(DbType::Single, "FLOAT")
        .set(DbType::Time, "TIME")
        .set(DbType::Xml, "BLOB SUB_TYPE TEXT");
    map
}

const CLAUSE_ORDER: &[ColumnClause] = &[
    ColumnClause::Type,
    ColumnClause::Identity,
    ColumnClause::Default,
    ColumnClause::Nullability,
    ColumnClause::PrimaryKey,
    ColumnClause::Unique,
    ColumnClause::Collation,
];

pub struct FirebirdGenerator {
    quoter: FirebirdQuoter,
    type_map: TypeMap,
    options: GeneratorOptions,
}

impl FirebirdGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            quoter: FirebirdQuoter,
            type_map: type_map(),
            options,
        }
    }

    /// Wraps `statement` in an EXECUTE BLOCK that runs it only when `condition` holds.
    fn guarded(&self, condition: &str, statement: &str) -> String {
        format!(
            "EXECUTE BLOCK AS\nBEGIN\n    IF ({condition}) THEN\n        EXECUTE STATEMENT {};\nEND",
            self.quoter.format_string(statement)
        )
    }

    fn relation_exists(&self, table: &str) -> String {
        format!(
            "EXISTS(SELECT 1 FROM RDB$RELATIONS WHERE RDB$RELATION_NAME = {})",
            self.quoter.format_string(&self.quoter.stored_name(table))
        )
    }
}

impl Generator for FirebirdGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::Firebird
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

    /// EXECUTE BLOCK bodies contain `;`, so isql needs a different terminator around them.
    fn render_statement(&self, statement: &str) -> String {
        if statement.starts_with("EXECUTE BLOCK") {
            format!("SET TERM ^ ;\n{statement}^\nSET TERM ; ^")
        } else {
            format!("{statement};")
        }
    }

    fn column_clause_order(&self) -> &'static [ColumnClause] {
        CLAUSE_ORDER
    }

    fn create_schema(&self, _schema: &CreateSchema) -> Result<Vec<String>> {
        self.unsupported("schemas")
    }

    fn drop_schema(&self, _schema: &DropSchema) -> Result<Vec<String>> {
        self.unsupported("schemas")
    }

    fn create_table_statement(&self, table: &CreateTable, definitions: &[String]) -> Result<String> {
        let sql = format!(
            "CREATE TABLE {} (\n    {}\n)",
            self.quoter.quote(&table.name),
            definitions.join(",\n    ")
        );
        if table.if_not_exists {
            let condition = format!("NOT {}", self.relation_exists(&table.name));
            return Ok(self.guarded(&condition, &sql));
        }
        Ok(sql)
    }

    fn drop_table(&self, table: &DropTable) -> Result<Vec<String>> {
        if table.cascade {
            self.check_feature("DROP TABLE CASCADE")?;
        }
        let sql = format!("DROP TABLE {}", self.quoter.quote(&table.name));
        if table.if_exists {
            return Ok(vec![self.guarded(&self.relation_exists(&table.name), &sql)]);
        }
        Ok(vec![sql])
    }

    fn rename_table(&self, _rename: &RenameTable) -> Result<Vec<String>> {
        self.unsupported("renaming tables")
    }

    fn add_column_keyword(&self) -> &'static str {
        "ADD"
    }

    fn alter_column(&self, alter: &AlterColumn) -> Result<Vec<String>> {
        let table = self.qualified_table(alter.schema.as_deref(), &alter.table);
        let column = &alter.column;
        let name = self.quoter.quote_column_name(&column.name);
        self.check_alter_column(column)?;

        let mut data_type = self.format_column_type(column)?;
        if let Some(ref collation) = column.collation {
            data_type = format!("{data_type} {}", self.format_collation(collation));
        }
        let nullability = if column.nullable { "DROP NOT NULL" } else { "SET NOT NULL" };
        let default = match column.default.as_ref() {
            Some(default) => self.format_default(default)?,
            None => None,
        };

        let mut statements = vec![
            format!("ALTER TABLE {table} ALTER COLUMN {name} TYPE {data_type}"),
            format!("ALTER TABLE {table} ALTER COLUMN {name} {nullability}"),
        ];
        statements.push(match default {
            Some(default) => format!("ALTER TABLE {table} ALTER COLUMN {name} SET DEFAULT {default}"),
            None => format!("ALTER TABLE {table} ALTER COLUMN {name} DROP DEFAULT"),
        });
        statements.extend(self.alter_column_description(alter)?);
        Ok(statements)
    }

    fn drop_column(&self, drop: &DropColumn) -> Result<Vec<String>> {
        let table = self.quoter.quote(&drop.table);
        Ok(drop
            .columns
            .iter()
            .map(|column| format!("ALTER TABLE {table} DROP {}", self.quoter.quote(column)))
            .collect())
    }

    fn rename_column(&self, rename: &RenameColumn) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} TO {}",
            self.quoter.quote(&rename.table),
            self.quoter.quote(&rename.old_name),
            self.quoter.quote(&rename.new_name)
        )])
    }

    /// Firebird indexes have one direction for all their columns.
    fn create_index(&self, index: &CreateIndex) -> Result<Vec<String>> {
        self.supported_index_options(&index.options)?;
        if index.columns.iter().any(|c| c.nulls.is_some()) {
            self.check_feature("NULLS FIRST/LAST index ordering")?;
        }
        let descending = index
            .columns
            .iter()
            .filter(|c| c.direction == SortDirection::Descending)
            .count();
        let direction = if descending == 0 {
            ""
        } else if descending == index.columns.len() {
            "DESCENDING "
        } else {
            self.check_feature("mixed sort directions in one index")?;
            ""
        };

        let unique = if index.unique { "UNIQUE " } else { "" };
        let columns: Vec<String> = index.columns.iter().map(|c| c.name.clone()).collect();
        Ok(vec![format!(
            "CREATE {}{}INDEX {} ON {} ({})",
            unique,
            direction,
            self.quoter.quote(&crate::generator::index_name(index)),
            self.quoter.quote(&index.table),
            self.quoter.quote_column_list(&columns)
        )])
    }

    fn drop_index(&self, index: &DropIndex) -> Result<Vec<String>> {
        let sql = format!("DROP INDEX {}", self.quoter.quote(&index.name));
        if index.if_exists {
            let condition = format!(
                "EXISTS(SELECT 1 FROM RDB$INDICES WHERE RDB$INDEX_NAME = {})",
                self.quoter
                    .format_string(&self.quoter.stored_name(&index.name))
            );
            return Ok(vec![self.guarded(&condition, &sql)]);
        }
        Ok(vec![sql])
    }

    fn create_sequence(&self, sequence: &SequenceDefinition) -> Result<Vec<String>> {
        if sequence.min_value.is_some() || sequence.max_value.is_some() {
            self.check_feature("sequence bounds")?;
        }
        if sequence.cache.is_some() {
            self.check_feature("sequence caching")?;
        }
        if sequence.cycle {
            self.check_feature("cycling sequences")?;
        }
        let mut sql = format!("CREATE SEQUENCE {}", self.quoter.quote(&sequence.name));
        if let Some(start) = sequence.start {
            sql.push_str(&format!(" START WITH {start}"));
        }
        if let Some(increment) = sequence.increment {
            sql.push_str(&format!(" INCREMENT BY {increment}"));
        }
        Ok(vec![sql])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use crate::util::MigrationError;

    fn sql(expression: Expression) -> Vec<String> {
        FirebirdGenerator::new(GeneratorOptions::default())
            .generate(&expression)
            .unwrap()
    }

    #[test]
    fn quotes_only_when_needed() {
        let q = FirebirdQuoter;
        assert_eq!(q.quote("customers"), "customers");
        assert_eq!(q.quote("user"), "\"user\"");
        assert_eq!(q.quote("order lines"), "\"order lines\"");
        assert_eq!(q.quote("_hidden"), "\"_hidden\"");
        assert_eq!(q.force_quote("customers"), "\"customers\"");
        assert_eq!(q.quote_table_name("customers", Some("app")), "customers");
        assert_eq!(q.unquote(&q.quote("user")), "user");
    }

    #[test]
    fn literals() {
        let q = FirebirdQuoter;
        assert_eq!(q.quote_value(&SqlValue::Bool(true)), "TRUE");
        let guid = Uuid::parse_str("8f2b6c1e-1f0a-4c5e-9b7d-0123456789ab").unwrap();
        assert_eq!(
            q.quote_value(&SqlValue::guid(guid)),
            "CHAR_TO_UUID('8f2b6c1e-1f0a-4c5e-9b7d-0123456789ab')"
        );
        let at = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(q.quote_value(&SqlValue::datetime(at)), "'2024-01-02 03:04:05'");
    }

    #[test]
    fn create_table_if_not_exists_uses_execute_block() {
        let mut table = CreateTable::new(
            "customers",
            vec![
                ColumnDefinition::new("id", DbType::Int32).primary_key().identity(),
                ColumnDefinition::new("name", DbType::String)
                    .sized(80)
                    .not_null()
                    .with_default(DefaultValue::value("")),
            ],
        )
        .in_schema("ignored");
        table.if_not_exists = true;

        let generator = FirebirdGenerator::new(GeneratorOptions::default());
        let statements = generator.generate(&Expression::CreateTable(table)).unwrap();
        assert_eq!(
            statements,
            vec![concat!(
                "EXECUTE BLOCK AS\n",
                "BEGIN\n",
                "    IF (NOT EXISTS(SELECT 1 FROM RDB$RELATIONS WHERE RDB$RELATION_NAME = 'CUSTOMERS')) THEN\n",
                "        EXECUTE STATEMENT 'CREATE TABLE customers (\n",
                "    id INTEGER GENERATED BY DEFAULT AS IDENTITY NOT NULL PRIMARY KEY,\n",
                "    name VARCHAR(80) DEFAULT '''' NOT NULL\n",
                ")';\n",
                "END"
            )]
        );
        let script = generator.render_script(&statements);
        assert!(script.starts_with("SET TERM ^ ;\nEXECUTE BLOCK AS\n"));
        assert!(script.ends_with("END^\nSET TERM ; ^\n"));
    }

    #[test]
    fn alter_column_emits_one_statement_per_change() {
        let alter = AlterColumn {
            schema: None,
            table: "customers".into(),
            column: ColumnDefinition::new("name", DbType::String).sized(120),
        };
        assert_eq!(
            sql(Expression::AlterColumn(alter)),
            vec![
                "ALTER TABLE customers ALTER COLUMN name TYPE VARCHAR(120)",
                "ALTER TABLE customers ALTER COLUMN name DROP NOT NULL",
                "ALTER TABLE customers ALTER COLUMN name DROP DEFAULT",
            ]
        );
    }

    #[test]
    fn column_renames_and_drops() {
        assert_eq!(
            sql(Expression::RenameColumn(RenameColumn {
                schema: None,
                table: "customers".into(),
                old_name: "nm".into(),
                new_name: "name".into(),
            })),
            vec!["ALTER TABLE customers ALTER COLUMN nm TO name"]
        );
        assert_eq!(
            sql(Expression::DropColumn(DropColumn {
                schema: None,
                table: "customers".into(),
                columns: vec!["legacy".into(), "key".into()],
            })),
            vec![
                "ALTER TABLE customers DROP legacy",
                "ALTER TABLE customers DROP \"key\"",
            ]
        );
        assert!(sql(Expression::RenameTable(RenameTable {
            schema: None,
            old_name: "a".into(),
            new_name: "b".into(),
        }))
        .is_empty());
    }

    #[test]
    fn indexes_have_a_single_direction() {
        let index = CreateIndex::new(
            "customers",
            "ix_customers_created",
            vec![IndexColumn::new("created").descending(), IndexColumn::new("id").descending()],
        );
        assert_eq!(
            sql(Expression::CreateIndex(index)),
            vec!["CREATE DESCENDING INDEX ix_customers_created ON customers (created, id)"]
        );

        let mixed = CreateIndex::new(
            "customers",
            "ix_mixed",
            vec![IndexColumn::new("created").descending(), IndexColumn::new("id")],
        );
        let strict = FirebirdGenerator::new(GeneratorOptions::strict());
        assert!(matches!(
            strict.generate(&Expression::CreateIndex(mixed)),
            Err(MigrationError::Unsupported { dialect: Dialect::Firebird, .. })
        ));
    }

    #[test]
    fn sequences_support_start_and_increment_only() {
        let sequence = SequenceDefinition {
            schema: None,
            name: "gen_orders".into(),
            start: Some(10),
            increment: Some(5),
            min_value: None,
            max_value: None,
            cache: None,
            cycle: false,
        };
        assert_eq!(
            sql(Expression::CreateSequence(sequence.clone())),
            vec!["CREATE SEQUENCE gen_orders START WITH 10 INCREMENT BY 5"]
        );

        let strict = FirebirdGenerator::new(GeneratorOptions::strict());
        let cycling = SequenceDefinition {
            cycle: true,
            ..sequence
        };
        assert!(strict.generate(&Expression::CreateSequence(cycling)).is_err());
    }
}
