use super::Dialect;
use crate::conventions::default_constraint_name;
use crate::generator::{ColumnContext, Generator, GeneratorOptions, IndexFeatures};
use crate::model::{
    AlterColumn, AlterDefault, ColumnDefinition, ConstraintKind, CreateConstraint, CreateIndex,
    CreateTable, DbType, DropColumn, DropDefault, DropIndex, DropSchema, DropTable, ExecuteSql,
    Identity, InsertData, MoveTable, RenameColumn, RenameTable, SystemMethod,
};
use crate::quoter::Quoter;
use crate::typemap::{TypeMap, UNBOUNDED};
use crate::util::{split_batches, Result};

const DEFAULT_SCHEMA: &str = "dbo";

pub struct SqlServerQuoter;

impl Quoter for SqlServerQuoter {
    fn open_quote(&self) -> &str {
        "["
    }

    fn close_quote(&self) -> &str {
        "]"
    }

    fn quote_table_name(&self, table: &str, schema: Option<&str>) -> String {
        format!(
            "{}.{}",
            self.quote_schema_name(schema.unwrap_or(DEFAULT_SCHEMA)),
            self.quote(table)
        )
    }

    /// Index names are scoped to their table.
    fn quote_index_name(&self, index: &str, _schema: Option<&str>) -> String {
        self.quote(index)
    }

    fn format_bool(&self, value: bool) -> String {
        String::from(if value { "1" } else { "0" })
    }

    fn format_national_string(&self, value: &str) -> String {
        format!("N{}", self.format_string(value))
    }

    fn format_bytes(&self, bytes: &[u8]) -> String {
        format!("0x{}", hex::encode_upper(bytes))
    }

    fn format_system_method(&self, method: SystemMethod) -> Option<String> {
        let sql = match method {
            SystemMethod::NewGuid => "NEWID()",
            SystemMethod::NewSequentialId => "NEWSEQUENTIALID()",
            SystemMethod::CurrentDateTime => "GETDATE()",
            SystemMethod::CurrentUtcDateTime => "GETUTCDATE()",
            SystemMethod::CurrentDateTimeOffset => "SYSDATETIMEOFFSET()",
            SystemMethod::CurrentUser => "CURRENT_USER",
        };
        Some(sql.to_string())
    }

    fn max_identifier_length(&self) -> Option<usize> {
        Some(128)
    }
}

pub fn type_map() -> TypeMap {
    let mut map = TypeMap::new(Dialect::SqlServer);
    map.set(DbType::AnsiStringFixedLength, "CHAR(255)")
        .set_sized(DbType::AnsiStringFixedLength, 8000, "CHAR($size)")
        .set(DbType::AnsiString, "VARCHAR(255)")
        .set_sized(DbType::AnsiString, 8000, "VARCHAR($size)")
        .set_sized(DbType::AnsiString, UNBOUNDED, "VARCHAR(MAX)")
        .set(DbType::StringFixedLength, "NCHAR(255)")
        .set_sized(DbType::StringFixedLength, 4000, "NCHAR($size)")
        .set(DbType::String, "NVARCHAR(255)")
        .set_sized(DbType::String, 4000, "NVARCHAR($size)")
        .set_sized(DbType::String, UNBOUNDED, "NVARCHAR(MAX)")
        .set(DbType::Binary, "VARBINARY(8000)")
        .set_sized(DbType::Binary, 8000, "VARBINARY($size)")
        .set_sized(DbType::Binary, UNBOUNDED, "VARBINARY(MAX)")
        .set(DbType::Boolean, "BIT")
        .set(DbType::Byte, "TINYINT")
        .set(DbType::Currency, "MONEY")
        .set(DbType::Date, "DATE")
        .set(DbType::DateTime, "DATETIME")
        .set(DbType::DateTime2, "DATETIME2")
        .set(DbType::DateTimeOffset, "DATETIMEOFFSET")
        .set(DbType::Decimal, "DECIMAL(19,5)")
        .set_sized(DbType::Decimal, 38, "DECIMAL($size,$scale)")
        .set(DbType::Double, "FLOAT")
        .set(DbType::Guid, "UNIQUEIDENTIFIER")
        .set(DbType::Int16, "SMALLINT")
        .set(DbType::Int32, "INT")
        .set(DbType::Int64, "BIGINT")
        .set(DbType::Single, "REAL")
        .set(DbType::Time, "TIME")
        .set(DbType::Xml, "XML");
    map
}

pub struct SqlServerGenerator {
    quoter: SqlServerQuoter,
    type_map: TypeMap,
    options: GeneratorOptions,
}

impl SqlServerGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            quoter: SqlServerQuoter,
            type_map: type_map(),
            options,
        }
    }

    fn nstring(&self, value: &str) -> String {
        self.quoter.format_national_string(value)
    }

    /// Drops whatever default constraint the column has, whatever its name.
    fn drop_default_constraint(&self, schema: Option<&str>, table: &str, column: &str) -> String {
        let qualified = self.qualified_table(schema, table);
        [
            "DECLARE @default sysname, @sql nvarchar(max);".to_string(),
            format!(
                "SELECT @default = dc.name FROM sys.default_constraints dc \
                 JOIN sys.columns c ON c.object_id = dc.parent_object_id AND c.column_id = dc.parent_column_id \
                 WHERE dc.parent_object_id = OBJECT_ID({}) AND c.name = {};",
                self.nstring(&qualified),
                self.nstring(column)
            ),
            "IF @default IS NOT NULL".to_string(),
            "BEGIN".to_string(),
            format!(
                "    SET @sql = {} + QUOTENAME(@default);",
                self.nstring(&format!("ALTER TABLE {qualified} DROP CONSTRAINT "))
            ),
            "    EXEC sp_executesql @sql;".to_string(),
            "END".to_string(),
        ]
        .join("\n")
    }

    fn add_default_constraint(
        &self,
        schema: Option<&str>,
        table: &str,
        column: &str,
        default: &str,
    ) -> String {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} DEFAULT {} FOR {}",
            self.qualified_table(schema, table),
            self.quoter.quote(&default_constraint_name(table, column)),
            default,
            self.quoter.quote_column_name(column)
        )
    }

    fn extended_property_target(&self, schema: Option<&str>, table: &str, column: Option<&str>) -> String {
        let mut args = format!(
            "@level0type = N'SCHEMA', @level0name = {}, @level1type = N'TABLE', @level1name = {}",
            self.nstring(schema.unwrap_or(DEFAULT_SCHEMA)),
            self.nstring(table)
        );
        if let Some(column) = column {
            args.push_str(&format!(
                ", @level2type = N'COLUMN', @level2name = {}",
                self.nstring(column)
            ));
        }
        args
    }

    fn set_description(
        &self,
        schema: Option<&str>,
        table: &str,
        column: Option<&str>,
        description: &str,
        replace: bool,
    ) -> Vec<String> {
        let target = self.extended_property_target(schema, table, column);
        let mut statements = Vec::new();
        if replace {
            let (level2type, level2name) = match column {
                Some(column) => ("N'COLUMN'".to_string(), self.nstring(column)),
                None => ("NULL".to_string(), "NULL".to_string()),
            };
            statements.push(format!(
                "IF EXISTS (SELECT 1 FROM fn_listextendedproperty(N'MS_Description', N'SCHEMA', {}, N'TABLE', {}, {}, {}))\n    \
                 EXEC sys.sp_dropextendedproperty @name = N'MS_Description', {}",
                self.nstring(schema.unwrap_or(DEFAULT_SCHEMA)),
                self.nstring(table),
                level2type,
                level2name,
                target
            ));
        }
        statements.push(format!(
            "EXEC sys.sp_addextendedproperty @name = N'MS_Description', @value = {}, {}",
            self.nstring(description),
            target
        ));
        statements
    }
}

impl Generator for SqlServerGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
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

    fn render_statement(&self, statement: &str) -> String {
        format!("{statement}\nGO")
    }

    fn format_identity(
        &self,
        _column: &ColumnDefinition,
        identity: &Identity,
        _ctx: &ColumnContext<'_>,
    ) -> Result<Option<String>> {
        Ok(Some(format!(
            "IDENTITY({},{})",
            identity.seed, identity.increment
        )))
    }

    fn format_nullability(&self, column: &ColumnDefinition, _ctx: &ColumnContext<'_>) -> Option<String> {
        let nullability = if column.nullable { "NULL" } else { "NOT NULL" };
        Some(nullability.to_string())
    }

    /// Inline defaults are named so they can be dropped later; altered columns get theirs separately.
    fn format_default_clause(
        &self,
        column: &ColumnDefinition,
        ctx: &ColumnContext<'_>,
    ) -> Result<Option<String>> {
        let Some(ref default) = column.default else {
            return Ok(None);
        };
        if ctx.alter {
            return Ok(None);
        }
        Ok(self.format_default(default)?.map(|sql| {
            format!(
                "CONSTRAINT {} DEFAULT {}",
                self.quoter
                    .quote(&default_constraint_name(ctx.table, &column.name)),
                sql
            )
        }))
    }

    fn drop_schema(&self, schema: &DropSchema) -> Result<Vec<String>> {
        if schema.cascade {
            self.check_feature("DROP SCHEMA CASCADE")?;
        }
        Ok(vec![format!(
            "DROP SCHEMA {}",
            self.quoter.quote_schema_name(&schema.name)
        )])
    }

    fn create_table_statement(&self, table: &CreateTable, definitions: &[String]) -> Result<String> {
        let qualified = self.qualified_table(table.schema.as_deref(), &table.name);
        let create = format!(
            "CREATE TABLE {} (\n    {}\n)",
            qualified,
            definitions.join(",\n    ")
        );
        if !table.if_not_exists {
            return Ok(create);
        }
        Ok(format!(
            "IF OBJECT_ID({}, N'U') IS NULL\n{}",
            self.nstring(&qualified),
            create
        ))
    }

    fn table_description(
        &self,
        schema: Option<&str>,
        table: &str,
        description: &str,
        replace: bool,
    ) -> Result<Vec<String>> {
        Ok(self.set_description(schema, table, None, description, replace))
    }

    fn column_description(
        &self,
        schema: Option<&str>,
        table: &str,
        column: &str,
        description: &str,
        replace: bool,
    ) -> Result<Vec<String>> {
        Ok(self.set_description(schema, table, Some(column), description, replace))
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

    fn rename_table(&self, rename: &RenameTable) -> Result<Vec<String>> {
        Ok(vec![format!(
            "EXEC sp_rename {}, {}",
            self.nstring(&self.qualified_table(rename.schema.as_deref(), &rename.old_name)),
            self.nstring(&rename.new_name)
        )])
    }

    fn move_table(&self, move_table: &MoveTable) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER SCHEMA {} TRANSFER {}",
            self.quoter.quote_schema_name(&move_table.destination_schema),
            self.qualified_table(move_table.schema.as_deref(), &move_table.table)
        )])
    }

    fn add_column_keyword(&self) -> &'static str {
        "ADD"
    }

    fn alter_column(&self, alter: &AlterColumn) -> Result<Vec<String>> {
        let schema = alter.schema.as_deref();
        let column = &alter.column;
        self.check_alter_column(column)?;

        let ctx = ColumnContext::alter(schema, &alter.table);
        let mut statements = vec![
            self.drop_default_constraint(schema, &alter.table, &column.name),
            format!(
                "ALTER TABLE {} ALTER COLUMN {}",
                self.qualified_table(schema, &alter.table),
                self.column_definition(column, &ctx)?
            ),
        ];
        if let Some(default) = column
            .default
            .as_ref()
            .map(|d| self.format_default(d))
            .transpose()?
            .flatten()
        {
            statements.push(self.add_default_constraint(schema, &alter.table, &column.name, &default));
        }
        statements.extend(self.alter_column_description(alter)?);
        Ok(statements)
    }

    fn drop_column(&self, drop: &DropColumn) -> Result<Vec<String>> {
        let schema = drop.schema.as_deref();
        let table = self.qualified_table(schema, &drop.table);
        let mut statements = Vec::new();
        for column in &drop.columns {
            statements.push(self.drop_default_constraint(schema, &drop.table, column));
            statements.push(format!(
                "ALTER TABLE {table} DROP COLUMN {}",
                self.quoter.quote_column_name(column)
            ));
        }
        Ok(statements)
    }

    fn rename_column(&self, rename: &RenameColumn) -> Result<Vec<String>> {
        let column = format!(
            "{}.{}",
            self.qualified_table(rename.schema.as_deref(), &rename.table),
            self.quoter.quote_column_name(&rename.old_name)
        );
        Ok(vec![format!(
            "EXEC sp_rename {}, {}, N'COLUMN'",
            self.nstring(&column),
            self.nstring(&rename.new_name)
        )])
    }

    fn index_features(&self) -> IndexFeatures {
        IndexFeatures {
            clustered: true,
            include: true,
            filter: true,
            storage: true,
            ..IndexFeatures::default()
        }
    }

    fn create_index(&self, index: &CreateIndex) -> Result<Vec<String>> {
        let options = self.supported_index_options(&index.options)?;

        let mut sql = String::from("CREATE ");
        if index.unique {
            sql.push_str("UNIQUE ");
        }
        match options.clustered {
            Some(true) => sql.push_str("CLUSTERED "),
            Some(false) => sql.push_str("NONCLUSTERED "),
            None => {}
        }
        sql.push_str(&format!(
            "INDEX {} ON {} ({})",
            self.quoter.quote(&crate::generator::index_name(index)),
            self.qualified_table(index.schema.as_deref(), &index.table),
            self.index_columns(&index.columns)?
        ));
        if !options.include.is_empty() {
            sql.push_str(&format!(
                " INCLUDE ({})",
                self.quoter.quote_column_list(&options.include)
            ));
        }
        if let Some(ref filter) = options.filter {
            sql.push_str(&format!(" WHERE {filter}"));
        }
        if !options.storage.is_empty() {
            let parameters: Vec<String> = options
                .storage
                .iter()
                .map(|(key, value)| format!("{} = {}", key.to_uppercase(), value))
                .collect();
            sql.push_str(&format!(" WITH ({})", parameters.join(", ")));
        }
        Ok(vec![sql])
    }

    fn drop_index(&self, index: &DropIndex) -> Result<Vec<String>> {
        let if_exists = if index.if_exists { "IF EXISTS " } else { "" };
        Ok(vec![format!(
            "DROP INDEX {}{} ON {}",
            if_exists,
            self.quoter.quote(&index.name),
            self.qualified_table(index.schema.as_deref(), &index.table)
        )])
    }

    fn create_constraint(&self, constraint: &CreateConstraint) -> Result<Vec<String>> {
        let kind = match constraint.kind {
            ConstraintKind::PrimaryKey => "PRIMARY KEY",
            ConstraintKind::Unique => "UNIQUE",
        };
        let clustered = match constraint.clustered {
            Some(true) => " CLUSTERED",
            Some(false) => " NONCLUSTERED",
            None => "",
        };
        Ok(vec![format!(
            "ALTER TABLE {} ADD CONSTRAINT {} {}{} ({})",
            self.qualified_table(constraint.schema.as_deref(), &constraint.table),
            self.quoter
                .quote_constraint_name(&crate::generator::constraint_name(constraint)),
            kind,
            clustered,
            self.quoter.quote_column_list(&constraint.columns)
        )])
    }

    fn alter_default(&self, alter: &AlterDefault) -> Result<Vec<String>> {
        let schema = alter.schema.as_deref();
        let Some(default) = self.format_default(&alter.default)? else {
            return Ok(Vec::new());
        };
        Ok(vec![
            self.drop_default_constraint(schema, &alter.table, &alter.column),
            self.add_default_constraint(schema, &alter.table, &alter.column, &default),
        ])
    }

    fn drop_default(&self, drop: &DropDefault) -> Result<Vec<String>> {
        Ok(vec![self.drop_default_constraint(
            drop.schema.as_deref(),
            &drop.table,
            &drop.column,
        )])
    }

    fn format_sequence_cache(&self, cache: i64) -> Result<Option<String>> {
        if cache <= 0 {
            return Ok(Some("NO CACHE".to_string()));
        }
        Ok(Some(format!("CACHE {cache}")))
    }

    fn insert_data(&self, insert: &InsertData) -> Result<Vec<String>> {
        let table = self.qualified_table(insert.schema.as_deref(), &insert.table);
        let rows = insert.rows.iter().map(|row| self.insert_row(&table, row));
        if !insert.identity_insert {
            return Ok(rows.collect());
        }
        let mut statements = vec![format!("SET IDENTITY_INSERT {table} ON")];
        statements.extend(rows);
        statements.push(format!("SET IDENTITY_INSERT {table} OFF"));
        Ok(statements)
    }

    fn execute_sql(&self, execute: &ExecuteSql) -> Result<Vec<String>> {
        Ok(split_batches(&execute.sql))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use std::collections::BTreeMap;

    fn sql(expression: Expression) -> Vec<String> {
        SqlServerGenerator::new(GeneratorOptions::default())
            .generate(&expression)
            .unwrap()
    }

    #[test]
    fn quoting_defaults_to_dbo() {
        let q = SqlServerQuoter;
        assert_eq!(q.quote_table_name("users", None), "[dbo].[users]");
        assert_eq!(q.quote_table_name("users", Some("app")), "[app].[users]");
        assert_eq!(q.quote("odd]name"), "[odd]]name]");
        assert_eq!(q.unquote("[odd]]name]"), "odd]name");
    }

    #[test]
    fn literals() {
        let q = SqlServerQuoter;
        assert_eq!(q.quote_value(&SqlValue::Bool(true)), "1");
        assert_eq!(q.quote_value(&SqlValue::national("héllo")), "N'héllo'");
        assert_eq!(q.quote_value(&SqlValue::bytes(vec![0x0f, 0xa0])), "0x0FA0");
    }

    #[test]
    fn create_table_names_inline_defaults() {
        let table = CreateTable::new(
            "users",
            vec![
                ColumnDefinition::new("id", DbType::Int32).primary_key().identity(),
                ColumnDefinition::new("name", DbType::String).sized(5000),
                ColumnDefinition::new("created", DbType::DateTime2)
                    .not_null()
                    .with_default(DefaultValue::Method(SystemMethod::CurrentUtcDateTime)),
            ],
        );
        assert_eq!(
            sql(Expression::CreateTable(table)),
            vec![concat!(
                "CREATE TABLE [dbo].[users] (\n",
                "    [id] INT IDENTITY(1,1) NOT NULL PRIMARY KEY,\n",
                "    [name] NVARCHAR(MAX) NULL,\n",
                "    [created] DATETIME2 NOT NULL CONSTRAINT [DF_users_created] DEFAULT GETUTCDATE()\n",
                ")"
            )]
        );
    }

    #[test]
    fn create_table_if_not_exists_uses_object_id_guard() {
        let mut table = CreateTable::new("t", vec![ColumnDefinition::new("id", DbType::Int32)]);
        table.if_not_exists = true;
        let statements = sql(Expression::CreateTable(table));
        assert!(statements[0].starts_with("IF OBJECT_ID(N'[dbo].[t]', N'U') IS NULL\nCREATE TABLE [dbo].[t]"));
    }

    #[test]
    fn alter_column_replaces_default_constraint() {
        let statements = sql(Expression::AlterColumn(AlterColumn {
            schema: None,
            table: "users".into(),
            column: ColumnDefinition::new("status", DbType::AnsiString)
                .sized(20)
                .not_null()
                .with_default(DefaultValue::value("new")),
        }));
        assert_eq!(statements.len(), 3);
        assert!(statements[0].starts_with("DECLARE @default sysname"));
        assert!(statements[0].contains("OBJECT_ID(N'[dbo].[users]')"));
        assert!(statements[0].contains("c.name = N'status'"));
        assert!(statements[0].contains("N'ALTER TABLE [dbo].[users] DROP CONSTRAINT ' + QUOTENAME(@default)"));
        assert_eq!(
            statements[1],
            "ALTER TABLE [dbo].[users] ALTER COLUMN [status] VARCHAR(20) NOT NULL"
        );
        assert_eq!(
            statements[2],
            "ALTER TABLE [dbo].[users] ADD CONSTRAINT [DF_users_status] DEFAULT 'new' FOR [status]"
        );
    }

    #[test]
    fn drop_column_drops_default_first() {
        let statements = sql(Expression::DropColumn(DropColumn {
            schema: Some("app".into()),
            table: "users".into(),
            columns: vec!["a".into(), "b".into()],
        }));
        assert_eq!(statements.len(), 4);
        assert!(statements[0].starts_with("DECLARE"));
        assert_eq!(statements[1], "ALTER TABLE [app].[users] DROP COLUMN [a]");
        assert_eq!(statements[3], "ALTER TABLE [app].[users] DROP COLUMN [b]");
    }

    #[test]
    fn renames_use_sp_rename() {
        assert_eq!(
            sql(Expression::RenameTable(RenameTable {
                schema: None,
                old_name: "user".into(),
                new_name: "users".into(),
            })),
            vec!["EXEC sp_rename N'[dbo].[user]', N'users'"]
        );
        assert_eq!(
            sql(Expression::RenameColumn(RenameColumn {
                schema: None,
                table: "users".into(),
                old_name: "mail".into(),
                new_name: "email".into(),
            })),
            vec!["EXEC sp_rename N'[dbo].[users].[mail]', N'email', N'COLUMN'"]
        );
    }

    #[test]
    fn clustered_filtered_index_with_storage() {
        let mut storage = BTreeMap::new();
        storage.insert("fillfactor".to_string(), "80".to_string());
        let index = CreateIndex {
            schema: None,
            table: "users".into(),
            name: None,
            columns: vec![IndexColumn::new("email"), IndexColumn::new("id").descending()],
            unique: true,
            options: IndexOptions {
                clustered: Some(false),
                include: vec!["name".into()],
                filter: Some("[email] IS NOT NULL".into()),
                storage,
                ..Default::default()
            },
        };
        assert_eq!(
            sql(Expression::CreateIndex(index)),
            vec!["CREATE UNIQUE NONCLUSTERED INDEX [IX_users_email_id] ON [dbo].[users] ([email] ASC, [id] DESC) INCLUDE ([name]) WHERE [email] IS NOT NULL WITH (FILLFACTOR = 80)"]
        );
    }

    #[test]
    fn nulls_ordering_is_rejected_in_strict_mode() {
        let index = CreateIndex::new(
            "users",
            "ix",
            vec![IndexColumn::new("email").nulls(NullsOrder::First)],
        );
        let strict = SqlServerGenerator::new(GeneratorOptions::strict());
        assert!(strict.generate(&Expression::CreateIndex(index)).is_err());
    }

    #[test]
    fn drop_index_names_table() {
        assert_eq!(
            sql(Expression::DropIndex(DropIndex {
                schema: None,
                table: "users".into(),
                name: "ix".into(),
                if_exists: true,
            })),
            vec!["DROP INDEX IF EXISTS [ix] ON [dbo].[users]"]
        );
    }

    #[test]
    fn identity_insert_brackets_rows() {
        let statements = sql(Expression::InsertData(InsertData {
            schema: None,
            table: "users".into(),
            rows: vec![Row::from([
                ("id".to_string(), SqlValue::Integer(1)),
                ("name".to_string(), SqlValue::national("Ann")),
            ])],
            identity_insert: true,
        }));
        assert_eq!(
            statements,
            vec![
                "SET IDENTITY_INSERT [dbo].[users] ON",
                "INSERT INTO [dbo].[users] ([id], [name]) VALUES (1, N'Ann')",
                "SET IDENTITY_INSERT [dbo].[users] OFF",
            ]
        );
    }

    #[test]
    fn table_description_replaces_existing_property() {
        let statements = sql(Expression::AlterTable(AlterTable {
            schema: None,
            name: "users".into(),
            description: Some("People".into()),
        }));
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with(
            "IF EXISTS (SELECT 1 FROM fn_listextendedproperty(N'MS_Description', N'SCHEMA', N'dbo', N'TABLE', N'users', NULL, NULL))"
        ));
        assert_eq!(
            statements[1],
            "EXEC sys.sp_addextendedproperty @name = N'MS_Description', @value = N'People', @level0type = N'SCHEMA', @level0name = N'dbo', @level1type = N'TABLE', @level1name = N'users'"
        );
    }

    #[test]
    fn execute_sql_splits_batches_and_script_uses_go() {
        let generator = SqlServerGenerator::new(GeneratorOptions::default());
        let statements = generator
            .generate(&Expression::ExecuteSql(ExecuteSql {
                sql: "CREATE VIEW v AS SELECT 1 AS x\nGO\nSELECT * FROM v".into(),
            }))
            .unwrap();
        assert_eq!(statements, vec!["CREATE VIEW v AS SELECT 1 AS x", "SELECT * FROM v"]);
        assert_eq!(
            generator.render_script(&statements),
            "CREATE VIEW v AS SELECT 1 AS x\nGO\n\nSELECT * FROM v\nGO\n"
        );
    }

    #[test]
    fn schema_operations() {
        assert_eq!(
            sql(Expression::CreateSchema(CreateSchema {
                name: "app".into(),
                authorization: Some("dbo".into()),
            })),
            vec!["CREATE SCHEMA [app] AUTHORIZATION [dbo]"]
        );
        assert_eq!(
            sql(Expression::MoveTable(MoveTable {
                schema: None,
                table: "users".into(),
                destination_schema: "app".into(),
            })),
            vec!["ALTER SCHEMA [app] TRANSFER [dbo].[users]"]
        );
        assert_eq!(
            sql(Expression::CreateSequence(SequenceDefinition {
                schema: None,
                name: "seq".into(),
                start: Some(1),
                increment: None,
                min_value: None,
                max_value: None,
                cache: Some(0),
                cycle: false,
            })),
            vec!["CREATE SEQUENCE [dbo].[seq] START WITH 1 NO CACHE"]
        );
    }
}
