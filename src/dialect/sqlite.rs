use super::Dialect;
use crate::generator::{
    ColumnClause, ColumnContext, Generator, GeneratorOptions, IndexFeatures,
};
use crate::model::{
    AlterColumn, AlterDefault, ColumnDefinition, ConstraintKind, CreateColumn, CreateConstraint,
    CreateIndex, CreateSchema, CreateTable, DbType, DropConstraint, DropDefault, DropForeignKey, DropSchema,
    DropSequence, DropTable, ForeignKeyDefinition, Identity, SequenceDefinition, SystemMethod,
};
use crate::quoter::Quoter;
use crate::typemap::TypeMap;
use crate::util::Result;

pub struct SqliteQuoter;

impl Quoter for SqliteQuoter {
    fn format_bool(&self, value: bool) -> String {
        String::from(if value { "1" } else { "0" })
    }

    fn format_system_method(&self, method: SystemMethod) -> Option<String> {
        let sql = match method {
            SystemMethod::NewGuid => "(lower(hex(randomblob(16))))",
            SystemMethod::CurrentDateTime => "(datetime('now','localtime'))",
            SystemMethod::CurrentUtcDateTime => "CURRENT_TIMESTAMP",
            SystemMethod::NewSequentialId
            | SystemMethod::CurrentDateTimeOffset
            | SystemMethod::CurrentUser => return None,
        };
        Some(sql.to_string())
    }
}

/// SQLite uses type affinity, so sizes never change the declared type.
pub fn type_map() -> TypeMap {
    let mut map = TypeMap::new(Dialect::Sqlite);
    map.set(DbType::AnsiStringFixedLength, "TEXT")
        .set(DbType::AnsiString, "TEXT")
        .set(DbType::StringFixedLength, "TEXT")
        .set(DbType::String, "TEXT")
        .set(DbType::Binary, "BLOB")
        .set(DbType::Boolean, "INTEGER")
        .set(DbType::Byte, "INTEGER")
        .set(DbType::Currency, "NUMERIC")
        .set(DbType::Date, "DATETIME")
        .set(DbType::DateTime, "DATETIME")
        .set(DbType::DateTime2, "DATETIME")
        .set(DbType::DateTimeOffset, "DATETIME")
        .set(DbType::Decimal, "NUMERIC")
        .set(DbType::Double, "REAL")
        .set(DbType::Guid, "TEXT")
        .set(DbType::Int16, "INTEGER")
        .set(DbType::Int32, "INTEGER")
        .set(DbType::Int64, "INTEGER")
        .set(DbType::Single, "REAL")
        .set(DbType::Time, "DATETIME")
        .set(DbType::Xml, "TEXT");
    map
}

/// AUTOINCREMENT must directly follow PRIMARY KEY.
const CLAUSE_ORDER: &[ColumnClause] = &[
    ColumnClause::Type,
    ColumnClause::Nullability,
    ColumnClause::PrimaryKey,
    ColumnClause::Identity,
    ColumnClause::Default,
    ColumnClause::Unique,
    ColumnClause::Collation,
];

pub struct SqliteGenerator {
    quoter: SqliteQuoter,
    type_map: TypeMap,
    options: GeneratorOptions,
}

impl SqliteGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            quoter: SqliteQuoter,
            type_map: type_map(),
            options,
        }
    }
}

impl Generator for SqliteGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
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

    fn column_clause_order(&self) -> &'static [ColumnClause] {
        CLAUSE_ORDER
    }

    fn format_identity(
        &self,
        column: &ColumnDefinition,
        _identity: &Identity,
        ctx: &ColumnContext<'_>,
    ) -> Result<Option<String>> {
        let integer = self.format_column_type(column)? == "INTEGER";
        if column.primary_key && ctx.inline_primary_key && integer {
            return Ok(Some("AUTOINCREMENT".to_string()));
        }
        self.check_feature("identity columns other than an INTEGER PRIMARY KEY")?;
        Ok(None)
    }

    fn create_schema(&self, _schema: &CreateSchema) -> Result<Vec<String>> {
        self.unsupported("schemas")
    }

    fn drop_schema(&self, _schema: &DropSchema) -> Result<Vec<String>> {
        self.unsupported("schemas")
    }

    fn inline_foreign_keys(&self, table: &CreateTable) -> Result<Vec<String>> {
        table
            .foreign_keys
            .iter()
            .map(|foreign_key| self.foreign_key_clause(foreign_key))
            .collect()
    }

    fn table_foreign_keys(&self, _table: &CreateTable) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Referenced tables always live in the same database file.
    fn referenced_table(&self, foreign_key: &ForeignKeyDefinition) -> String {
        self.quoter.quote(&foreign_key.primary_table)
    }

    fn table_description(
        &self,
        _schema: Option<&str>,
        _table: &str,
        _description: &str,
        _replace: bool,
    ) -> Result<Vec<String>> {
        self.unsupported("table descriptions")
    }

    fn column_description(
        &self,
        _schema: Option<&str>,
        _table: &str,
        _column: &str,
        _description: &str,
        _replace: bool,
    ) -> Result<Vec<String>> {
        self.unsupported("column descriptions")
    }

    fn drop_table(&self, table: &DropTable) -> Result<Vec<String>> {
        if table.cascade {
            self.check_feature("DROP TABLE CASCADE")?;
        }
        let if_exists = if table.if_exists { "IF EXISTS " } else { "" };
        Ok(vec![format!(
            "DROP TABLE {}{}",
            if_exists,
            self.qualified_table(table.schema.as_deref(), &table.name)
        )])
    }

    /// ADD COLUMN cannot declare a primary key; loose mode adds a plain column.
    fn create_column(&self, create: &CreateColumn) -> Result<Vec<String>> {
        let mut column = create.column.clone();
        if column.primary_key {
            self.check_feature("adding a PRIMARY KEY column")?;
            column.primary_key = false;
            column.primary_key_name = None;
        }

        let schema = create.schema.as_deref();
        let ctx = ColumnContext::create(schema, &create.table, false);
        let mut statements = vec![format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.qualified_table(schema, &create.table),
            self.column_definition(&column, &ctx)?
        )];
        if let Some(ref description) = column.description {
            statements.extend(self.column_description(
                schema,
                &create.table,
                &column.name,
                description,
                false,
            )?);
        }
        Ok(statements)
    }

    fn alter_column(&self, _alter: &AlterColumn) -> Result<Vec<String>> {
        self.unsupported("altering columns")
    }

    fn index_features(&self) -> IndexFeatures {
        IndexFeatures {
            filter: true,
            if_not_exists: true,
            ..IndexFeatures::default()
        }
    }

    /// The schema qualifies the index name; the table name stays bare.
    fn create_index(&self, index: &CreateIndex) -> Result<Vec<String>> {
        let options = self.supported_index_options(&index.options)?;
        let mut sql = String::from("CREATE ");
        if index.unique {
            sql.push_str("UNIQUE ");
        }
        sql.push_str("INDEX ");
        if options.if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }
        sql.push_str(&format!(
            "{} ON {} ({})",
            self.quoter
                .quote_index_name(&crate::generator::index_name(index), index.schema.as_deref()),
            self.quoter.quote(&index.table),
            self.index_columns(&index.columns)?
        ));
        if let Some(ref filter) = options.filter {
            sql.push_str(&format!(" WHERE {filter}"));
        }
        Ok(vec![sql])
    }

    fn create_foreign_key(&self, _foreign_key: &ForeignKeyDefinition) -> Result<Vec<String>> {
        self.unsupported("adding foreign keys to existing tables")
    }

    fn drop_foreign_key(&self, _foreign_key: &DropForeignKey) -> Result<Vec<String>> {
        self.unsupported("dropping foreign keys")
    }

    /// Unique constraints are emulated with a unique index.
    fn create_constraint(&self, constraint: &CreateConstraint) -> Result<Vec<String>> {
        if constraint.kind == ConstraintKind::PrimaryKey {
            return self.unsupported("adding primary keys to existing tables");
        }
        if constraint.clustered.is_some() {
            self.check_feature("clustered constraints")?;
        }
        Ok(vec![format!(
            "CREATE UNIQUE INDEX {} ON {} ({})",
            self.quoter.quote_index_name(
                &crate::generator::constraint_name(constraint),
                constraint.schema.as_deref()
            ),
            self.quoter.quote(&constraint.table),
            self.quoter.quote_column_list(&constraint.columns)
        )])
    }

    fn drop_constraint(&self, constraint: &DropConstraint) -> Result<Vec<String>> {
        if constraint.kind == ConstraintKind::PrimaryKey {
            return self.unsupported("dropping primary keys");
        }
        Ok(vec![format!(
            "DROP INDEX {}",
            self.quoter
                .quote_index_name(&constraint.name, constraint.schema.as_deref())
        )])
    }

    fn alter_default(&self, _alter: &AlterDefault) -> Result<Vec<String>> {
        self.unsupported("altering column defaults")
    }

    fn drop_default(&self, _drop: &DropDefault) -> Result<Vec<String>> {
        self.unsupported("dropping column defaults")
    }

    fn create_sequence(&self, _sequence: &SequenceDefinition) -> Result<Vec<String>> {
        self.unsupported("sequences")
    }

    fn drop_sequence(&self, _sequence: &DropSequence) -> Result<Vec<String>> {
        self.unsupported("sequences")
    }
}
