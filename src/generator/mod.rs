//! Rendering of [`Expression`]s into SQL statements.
//!
//! [`Generator`] provides an ANSI rendering for every expression; dialects
//! override the methods where their syntax differs. Generated statements carry
//! no terminator, [`Generator::render_script`] adds them.

mod column;

pub use column::{ColumnClause, ColumnContext, ANSI_CLAUSE_ORDER};

use crate::conventions;
use crate::dialect::{self, Dialect};
use crate::model::{
    AlterColumn, AlterDefault, AlterTable, ColumnDefinition, ConstraintKind, CreateColumn,
    CreateConstraint, CreateIndex, CreateSchema, CreateTable, DefaultValue, DeleteData,
    DropColumn, DropConstraint, DropDefault, DropForeignKey, DropIndex, DropSchema, DropSequence,
    DropTable, ExecuteSql, Expression, ForeignKeyDefinition, Identity, IdentityGeneration,
    IndexColumn, IndexOptions, InsertData, MoveTable, RenameColumn, RenameTable, Row, Rule,
    SequenceDefinition, SortDirection, UpdateData,
};
use crate::quoter::Quoter;
use crate::typemap::TypeMap;
use crate::util::{MigrationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// What happens when an expression uses something the dialect cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityMode {
    /// Drop the feature and log a warning.
    #[default]
    Loose,
    /// Fail with [`MigrationError::Unsupported`].
    Strict,
}

impl fmt::Display for CompatibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompatibilityMode::Loose => f.write_str("loose"),
            CompatibilityMode::Strict => f.write_str("strict"),
        }
    }
}

impl FromStr for CompatibilityMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loose" => Ok(CompatibilityMode::Loose),
            "strict" => Ok(CompatibilityMode::Strict),
            other => Err(format!(
                "unknown compatibility mode '{other}' (expected loose or strict)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub compatibility: CompatibilityMode,
}

impl GeneratorOptions {
    pub fn strict() -> Self {
        Self {
            compatibility: CompatibilityMode::Strict,
        }
    }

    pub fn loose() -> Self {
        Self {
            compatibility: CompatibilityMode::Loose,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.compatibility == CompatibilityMode::Strict
    }
}

/// Index options a dialect knows how to render.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexFeatures {
    pub clustered: bool,
    pub include: bool,
    pub filter: bool,
    pub method: bool,
    pub concurrently: bool,
    pub if_not_exists: bool,
    pub nulls_not_distinct: bool,
    pub storage: bool,
    pub tablespace: bool,
}

pub fn generator_for(dialect: Dialect, options: GeneratorOptions) -> Box<dyn Generator> {
    match dialect {
        Dialect::Postgres => Box::new(dialect::postgres::PostgresGenerator::new(options)),
        Dialect::SqlServer => Box::new(dialect::sqlserver::SqlServerGenerator::new(options)),
        Dialect::Sqlite => Box::new(dialect::sqlite::SqliteGenerator::new(options)),
        Dialect::Oracle => Box::new(dialect::oracle::OracleGenerator::new(options)),
        Dialect::Firebird => Box::new(dialect::firebird::FirebirdGenerator::new(options)),
    }
}

pub fn generate_sql(
    dialect: Dialect,
    expressions: &[Expression],
    options: GeneratorOptions,
) -> Result<Vec<String>> {
    generator_for(dialect, options).generate_all(expressions)
}

pub fn index_name(index: &CreateIndex) -> String {
    index
        .name
        .clone()
        .unwrap_or_else(|| conventions::index_name(&index.table, &index.columns))
}

pub fn foreign_key_name(foreign_key: &ForeignKeyDefinition) -> String {
    foreign_key
        .name
        .clone()
        .unwrap_or_else(|| conventions::foreign_key_name(foreign_key))
}

pub fn constraint_name(constraint: &CreateConstraint) -> String {
    constraint.name.clone().unwrap_or_else(|| {
        conventions::constraint_name(constraint.kind, &constraint.table, &constraint.columns)
    })
}

pub trait Generator: Send + Sync {
    fn dialect(&self) -> Dialect;
    fn quoter(&self) -> &dyn Quoter;
    fn type_map(&self) -> &TypeMap;
    fn options(&self) -> &GeneratorOptions;

    fn generate(&self, expression: &Expression) -> Result<Vec<String>> {
        debug!(dialect = %self.dialect(), kind = expression.kind(), "Generating SQL");
        match expression {
            Expression::CreateSchema(e) => self.create_schema(e),
            Expression::DropSchema(e) => self.drop_schema(e),
            Expression::CreateTable(e) => self.create_table(e),
            Expression::AlterTable(e) => self.alter_table(e),
            Expression::DropTable(e) => self.drop_table(e),
            Expression::RenameTable(e) => self.rename_table(e),
            Expression::MoveTable(e) => self.move_table(e),
            Expression::CreateColumn(e) => self.create_column(e),
            Expression::AlterColumn(e) => self.alter_column(e),
            Expression::DropColumn(e) => self.drop_column(e),
            Expression::RenameColumn(e) => self.rename_column(e),
            Expression::CreateIndex(e) => self.create_index(e),
            Expression::DropIndex(e) => self.drop_index(e),
            Expression::CreateForeignKey(e) => self.create_foreign_key(e),
            Expression::DropForeignKey(e) => self.drop_foreign_key(e),
            Expression::CreateConstraint(e) => self.create_constraint(e),
            Expression::DropConstraint(e) => self.drop_constraint(e),
            Expression::AlterDefault(e) => self.alter_default(e),
            Expression::DropDefault(e) => self.drop_default(e),
            Expression::CreateSequence(e) => self.create_sequence(e),
            Expression::DropSequence(e) => self.drop_sequence(e),
            Expression::InsertData(e) => self.insert_data(e),
            Expression::UpdateData(e) => self.update_data(e),
            Expression::DeleteData(e) => self.delete_data(e),
            Expression::ExecuteSql(e) => self.execute_sql(e),
        }
    }

    fn generate_all(&self, expressions: &[Expression]) -> Result<Vec<String>> {
        let mut statements = Vec::new();
        for expression in expressions {
            statements.extend(self.generate(expression)?);
        }
        Ok(statements)
    }

    /// Terminates one statement for inclusion in a script.
    fn render_statement(&self, statement: &str) -> String {
        format!("{statement};")
    }

    fn render_script(&self, statements: &[String]) -> String {
        let mut script = statements
            .iter()
            .map(|s| self.render_statement(s))
            .collect::<Vec<_>>()
            .join("\n\n");
        if !script.is_empty() {
            script.push('\n');
        }
        script
    }

    /// Strict mode rejects the feature; loose mode logs and lets the caller drop it.
    fn check_feature(&self, feature: &str) -> Result<()> {
        if self.options().is_strict() {
            return Err(MigrationError::unsupported(self.dialect(), feature));
        }
        warn!(dialect = %self.dialect(), feature, "Unsupported feature skipped");
        Ok(())
    }

    fn unsupported(&self, feature: &str) -> Result<Vec<String>> {
        self.check_feature(feature)?;
        Ok(Vec::new())
    }

    fn qualified_table(&self, schema: Option<&str>, table: &str) -> String {
        self.quoter().quote_table_name(table, schema)
    }

    // Columns

    fn column_clause_order(&self) -> &'static [ColumnClause] {
        ANSI_CLAUSE_ORDER
    }

    fn column_definition(&self, column: &ColumnDefinition, ctx: &ColumnContext<'_>) -> Result<String> {
        column::render_column(self, column, ctx)
    }

    fn format_column_type(&self, column: &ColumnDefinition) -> Result<String> {
        self.type_map()
            .get(&column.data_type, column.size, column.scale)
    }

    fn format_collation(&self, collation: &str) -> String {
        format!("COLLATE {collation}")
    }

    fn format_identity(
        &self,
        _column: &ColumnDefinition,
        identity: &Identity,
        _ctx: &ColumnContext<'_>,
    ) -> Result<Option<String>> {
        let generation = match identity.generation {
            IdentityGeneration::Always => "ALWAYS",
            IdentityGeneration::ByDefault => "BY DEFAULT",
        };
        let mut sql = format!("GENERATED {generation} AS IDENTITY");
        if !identity.has_default_seed() {
            sql.push_str(&format!(
                " (START WITH {} INCREMENT BY {})",
                identity.seed, identity.increment
            ));
        }
        Ok(Some(sql))
    }

    fn format_nullability(&self, column: &ColumnDefinition, _ctx: &ColumnContext<'_>) -> Option<String> {
        if column.nullable {
            None
        } else {
            Some("NOT NULL".to_string())
        }
    }

    fn format_default(&self, default: &DefaultValue) -> Result<Option<String>> {
        match default {
            DefaultValue::Value(value) => Ok(Some(self.quoter().quote_value(value))),
            DefaultValue::Raw(sql) => Ok(Some(sql.clone())),
            DefaultValue::Method(method) => match self.quoter().format_system_method(*method) {
                Some(sql) => Ok(Some(sql)),
                None => {
                    self.check_feature(&format!("the {method} default"))?;
                    Ok(None)
                }
            },
        }
    }

    fn format_default_clause(
        &self,
        column: &ColumnDefinition,
        _ctx: &ColumnContext<'_>,
    ) -> Result<Option<String>> {
        let Some(ref default) = column.default else {
            return Ok(None);
        };
        Ok(self.format_default(default)?.map(|sql| format!("DEFAULT {sql}")))
    }

    fn format_inline_primary_key(&self, column: &ColumnDefinition) -> String {
        match column.primary_key_name {
            Some(ref name) => format!(
                "CONSTRAINT {} PRIMARY KEY",
                self.quoter().quote_constraint_name(name)
            ),
            None => "PRIMARY KEY".to_string(),
        }
    }

    /// Table-level primary key for composite keys; single-column keys are inline.
    fn primary_key_constraint(&self, table: &CreateTable) -> Option<String> {
        let columns = table.primary_key_columns();
        if columns.len() < 2 {
            return None;
        }
        let name = columns
            .iter()
            .find_map(|c| c.primary_key_name.clone())
            .unwrap_or_else(|| conventions::primary_key_name(&table.name));
        let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
        Some(format!(
            "CONSTRAINT {} PRIMARY KEY ({})",
            self.quoter().quote_constraint_name(&name),
            self.quoter().quote_column_list(&names)
        ))
    }

    // Schemas

    fn create_schema(&self, schema: &CreateSchema) -> Result<Vec<String>> {
        let mut sql = format!("CREATE SCHEMA {}", self.quoter().quote_schema_name(&schema.name));
        if let Some(ref owner) = schema.authorization {
            sql.push_str(&format!(" AUTHORIZATION {}", self.quoter().quote(owner)));
        }
        Ok(vec![sql])
    }

    fn drop_schema(&self, schema: &DropSchema) -> Result<Vec<String>> {
        let mut sql = format!("DROP SCHEMA {}", self.quoter().quote_schema_name(&schema.name));
        if schema.cascade {
            sql.push_str(" CASCADE");
        }
        Ok(vec![sql])
    }

    // Tables

    fn create_table(&self, table: &CreateTable) -> Result<Vec<String>> {
        let schema = table.schema.as_deref();
        let inline_primary_key = table.primary_key_columns().len() == 1;
        let ctx = ColumnContext::create(schema, &table.name, inline_primary_key);

        let mut definitions = table
            .columns
            .iter()
            .map(|column| self.column_definition(column, &ctx))
            .collect::<Result<Vec<_>>>()?;
        definitions.extend(self.primary_key_constraint(table));
        definitions.extend(self.inline_foreign_keys(table)?);

        let mut statements = vec![self.create_table_statement(table, &definitions)?];
        statements.extend(self.table_foreign_keys(table)?);

        if let Some(ref description) = table.description {
            statements.extend(self.table_description(schema, &table.name, description, false)?);
        }
        for column in &table.columns {
            if let Some(ref description) = column.description {
                statements.extend(self.column_description(
                    schema,
                    &table.name,
                    &column.name,
                    description,
                    false,
                )?);
            }
        }

        Ok(statements)
    }

    fn create_table_statement(&self, table: &CreateTable, definitions: &[String]) -> Result<String> {
        let if_not_exists = if table.if_not_exists { "IF NOT EXISTS " } else { "" };
        Ok(format!(
            "CREATE TABLE {}{} (\n    {}\n)",
            if_not_exists,
            self.qualified_table(table.schema.as_deref(), &table.name),
            definitions.join(",\n    ")
        ))
    }

    /// Foreign keys written inside the CREATE TABLE body.
    fn inline_foreign_keys(&self, _table: &CreateTable) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Foreign keys added after the table exists.
    fn table_foreign_keys(&self, table: &CreateTable) -> Result<Vec<String>> {
        let mut statements = Vec::new();
        for foreign_key in &table.foreign_keys {
            let mut foreign_key = foreign_key.clone();
            foreign_key.foreign_table.clone_from(&table.name);
            if foreign_key.foreign_schema.is_none() {
                foreign_key.foreign_schema.clone_from(&table.schema);
            }
            statements.extend(self.create_foreign_key(&foreign_key)?);
        }
        Ok(statements)
    }

    fn alter_table(&self, table: &AlterTable) -> Result<Vec<String>> {
        match table.description {
            Some(ref description) => {
                self.table_description(table.schema.as_deref(), &table.name, description, true)
            }
            None => Ok(Vec::new()),
        }
    }

    /// `replace` is set when the object may already carry a description.
    fn table_description(
        &self,
        schema: Option<&str>,
        table: &str,
        description: &str,
        _replace: bool,
    ) -> Result<Vec<String>> {
        Ok(vec![format!(
            "COMMENT ON TABLE {} IS {}",
            self.qualified_table(schema, table),
            self.quoter().format_string(description)
        )])
    }

    fn column_description(
        &self,
        schema: Option<&str>,
        table: &str,
        column: &str,
        description: &str,
        _replace: bool,
    ) -> Result<Vec<String>> {
        Ok(vec![format!(
            "COMMENT ON COLUMN {}.{} IS {}",
            self.qualified_table(schema, table),
            self.quoter().quote_column_name(column),
            self.quoter().format_string(description)
        )])
    }

    fn drop_table(&self, table: &DropTable) -> Result<Vec<String>> {
        let if_exists = if table.if_exists { "IF EXISTS " } else { "" };
        let mut sql = format!(
            "DROP TABLE {}{}",
            if_exists,
            self.qualified_table(table.schema.as_deref(), &table.name)
        );
        if table.cascade {
            sql.push_str(" CASCADE");
        }
        Ok(vec![sql])
    }

    fn rename_table(&self, rename: &RenameTable) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} RENAME TO {}",
            self.qualified_table(rename.schema.as_deref(), &rename.old_name),
            self.quoter().quote(&rename.new_name)
        )])
    }

    fn move_table(&self, _move_table: &MoveTable) -> Result<Vec<String>> {
        self.unsupported("moving tables between schemas")
    }

    // Columns

    fn add_column_keyword(&self) -> &'static str {
        "ADD COLUMN"
    }

    fn create_column(&self, create: &CreateColumn) -> Result<Vec<String>> {
        let schema = create.schema.as_deref();
        let ctx = ColumnContext::create(schema, &create.table, create.column.primary_key);
        let mut statements = vec![format!(
            "ALTER TABLE {} {} {}",
            self.qualified_table(schema, &create.table),
            self.add_column_keyword(),
            self.column_definition(&create.column, &ctx)?
        )];
        if let Some(ref description) = create.column.description {
            statements.extend(self.column_description(
                schema,
                &create.table,
                &create.column.name,
                description,
                false,
            )?);
        }
        Ok(statements)
    }

    fn alter_column(&self, alter: &AlterColumn) -> Result<Vec<String>> {
        let schema = alter.schema.as_deref();
        let table = self.qualified_table(schema, &alter.table);
        let column = &alter.column;
        let name = self.quoter().quote_column_name(&column.name);
        self.check_alter_column(column)?;

        let mut data_type = self.format_column_type(column)?;
        if let Some(ref collation) = column.collation {
            data_type = format!("{data_type} {}", self.format_collation(collation));
        }
        let mut clauses = vec![format!("ALTER COLUMN {name} TYPE {data_type}")];
        clauses.push(if column.nullable {
            format!("ALTER COLUMN {name} DROP NOT NULL")
        } else {
            format!("ALTER COLUMN {name} SET NOT NULL")
        });
        match column.default.as_ref().map(|d| self.format_default(d)).transpose()?.flatten() {
            Some(default) => clauses.push(format!("ALTER COLUMN {name} SET DEFAULT {default}")),
            None => clauses.push(format!("ALTER COLUMN {name} DROP DEFAULT")),
        }

        let mut statements = vec![format!("ALTER TABLE {table} {}", clauses.join(", "))];
        statements.extend(self.alter_column_description(alter)?);
        Ok(statements)
    }

    /// Parts of a column definition no dialect can change in place.
    fn check_alter_column(&self, column: &ColumnDefinition) -> Result<()> {
        if column.identity.is_some() {
            self.check_feature("changing identity in alter_column")?;
        }
        if column.primary_key || column.unique {
            self.check_feature("key constraints in alter_column (use create_constraint)")?;
        }
        Ok(())
    }

    fn alter_column_description(&self, alter: &AlterColumn) -> Result<Vec<String>> {
        match alter.column.description {
            Some(ref description) => self.column_description(
                alter.schema.as_deref(),
                &alter.table,
                &alter.column.name,
                description,
                true,
            ),
            None => Ok(Vec::new()),
        }
    }

    fn drop_column(&self, drop: &DropColumn) -> Result<Vec<String>> {
        let table = self.qualified_table(drop.schema.as_deref(), &drop.table);
        Ok(drop
            .columns
            .iter()
            .map(|column| {
                format!(
                    "ALTER TABLE {table} DROP COLUMN {}",
                    self.quoter().quote_column_name(column)
                )
            })
            .collect())
    }

    fn rename_column(&self, rename: &RenameColumn) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.qualified_table(rename.schema.as_deref(), &rename.table),
            self.quoter().quote_column_name(&rename.old_name),
            self.quoter().quote_column_name(&rename.new_name)
        )])
    }

    // Indexes

    fn index_features(&self) -> IndexFeatures {
        IndexFeatures::default()
    }

    /// Drops (or rejects, in strict mode) the options the dialect cannot render.
    fn supported_index_options(&self, options: &IndexOptions) -> Result<IndexOptions> {
        let features = self.index_features();
        let mut kept = options.clone();

        if !features.clustered {
            if kept.clustered == Some(true) {
                self.check_feature("clustered indexes")?;
            }
            kept.clustered = None;
        }
        if !features.include && !kept.include.is_empty() {
            self.check_feature("included index columns")?;
            kept.include.clear();
        }
        if !features.filter && kept.filter.is_some() {
            self.check_feature("filtered indexes")?;
            kept.filter = None;
        }
        if !features.method && kept.method.is_some() {
            self.check_feature("index access methods")?;
            kept.method = None;
        }
        if !features.concurrently && kept.concurrently {
            self.check_feature("concurrent index builds")?;
            kept.concurrently = false;
        }
        if !features.if_not_exists && kept.if_not_exists {
            self.check_feature("CREATE INDEX IF NOT EXISTS")?;
            kept.if_not_exists = false;
        }
        if !features.nulls_not_distinct {
            if kept.nulls_distinct == Some(false) {
                self.check_feature("NULLS NOT DISTINCT")?;
            }
            kept.nulls_distinct = None;
        }
        if !features.storage && !kept.storage.is_empty() {
            self.check_feature("index storage parameters")?;
            kept.storage.clear();
        }
        if !features.tablespace && kept.tablespace.is_some() {
            self.check_feature("tablespaces")?;
            kept.tablespace = None;
        }

        Ok(kept)
    }

    fn index_column(&self, column: &IndexColumn) -> Result<String> {
        let direction = match column.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        if column.nulls.is_some() {
            self.check_feature("NULLS FIRST/LAST index ordering")?;
        }
        Ok(format!(
            "{} {direction}",
            self.quoter().quote_column_name(&column.name)
        ))
    }

    fn index_columns(&self, columns: &[IndexColumn]) -> Result<String> {
        Ok(columns
            .iter()
            .map(|c| self.index_column(c))
            .collect::<Result<Vec<_>>>()?
            .join(", "))
    }

    fn create_index(&self, index: &CreateIndex) -> Result<Vec<String>> {
        self.supported_index_options(&index.options)?;
        let unique = if index.unique { "UNIQUE " } else { "" };
        Ok(vec![format!(
            "CREATE {}INDEX {} ON {} ({})",
            unique,
            self.quoter().quote(&index_name(index)),
            self.qualified_table(index.schema.as_deref(), &index.table),
            self.index_columns(&index.columns)?
        )])
    }

    fn drop_index(&self, index: &DropIndex) -> Result<Vec<String>> {
        let if_exists = if index.if_exists { "IF EXISTS " } else { "" };
        Ok(vec![format!(
            "DROP INDEX {}{}",
            if_exists,
            self.quoter()
                .quote_index_name(&index.name, index.schema.as_deref())
        )])
    }

    // Foreign keys and constraints

    fn format_rule(&self, action: &str, rule: Rule) -> Result<Option<String>> {
        let rule = match rule {
            Rule::None => return Ok(None),
            Rule::Cascade => "CASCADE",
            Rule::SetNull => "SET NULL",
            Rule::SetDefault => "SET DEFAULT",
        };
        Ok(Some(format!("{action} {rule}")))
    }

    fn referenced_table(&self, foreign_key: &ForeignKeyDefinition) -> String {
        self.qualified_table(
            foreign_key.primary_schema.as_deref(),
            &foreign_key.primary_table,
        )
    }

    /// `CONSTRAINT .. FOREIGN KEY .. REFERENCES ..`, shared by inline and standalone forms.
    fn foreign_key_clause(&self, foreign_key: &ForeignKeyDefinition) -> Result<String> {
        let mut sql = format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.quoter()
                .quote_constraint_name(&foreign_key_name(foreign_key)),
            self.quoter().quote_column_list(&foreign_key.foreign_columns),
            self.referenced_table(foreign_key),
            self.quoter().quote_column_list(&foreign_key.primary_columns)
        );
        if let Some(rule) = self.format_rule("ON DELETE", foreign_key.on_delete)? {
            sql.push(' ');
            sql.push_str(&rule);
        }
        if let Some(rule) = self.format_rule("ON UPDATE", foreign_key.on_update)? {
            sql.push(' ');
            sql.push_str(&rule);
        }
        Ok(sql)
    }

    fn create_foreign_key(&self, foreign_key: &ForeignKeyDefinition) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} ADD {}",
            self.qualified_table(
                foreign_key.foreign_schema.as_deref(),
                &foreign_key.foreign_table
            ),
            self.foreign_key_clause(foreign_key)?
        )])
    }

    fn drop_foreign_key(&self, foreign_key: &DropForeignKey) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.qualified_table(foreign_key.schema.as_deref(), &foreign_key.table),
            self.quoter().quote_constraint_name(&foreign_key.name)
        )])
    }

    fn create_constraint(&self, constraint: &CreateConstraint) -> Result<Vec<String>> {
        if constraint.clustered.is_some() {
            self.check_feature("clustered constraints")?;
        }
        let kind = match constraint.kind {
            ConstraintKind::PrimaryKey => "PRIMARY KEY",
            ConstraintKind::Unique => "UNIQUE",
        };
        Ok(vec![format!(
            "ALTER TABLE {} ADD CONSTRAINT {} {} ({})",
            self.qualified_table(constraint.schema.as_deref(), &constraint.table),
            self.quoter()
                .quote_constraint_name(&constraint_name(constraint)),
            kind,
            self.quoter().quote_column_list(&constraint.columns)
        )])
    }

    fn drop_constraint(&self, constraint: &DropConstraint) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.qualified_table(constraint.schema.as_deref(), &constraint.table),
            self.quoter().quote_constraint_name(&constraint.name)
        )])
    }

    // Defaults

    fn alter_default(&self, alter: &AlterDefault) -> Result<Vec<String>> {
        let Some(default) = self.format_default(&alter.default)? else {
            return Ok(Vec::new());
        };
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {}",
            self.qualified_table(alter.schema.as_deref(), &alter.table),
            self.quoter().quote_column_name(&alter.column),
            default
        )])
    }

    fn drop_default(&self, drop: &DropDefault) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT",
            self.qualified_table(drop.schema.as_deref(), &drop.table),
            self.quoter().quote_column_name(&drop.column)
        )])
    }

    // Sequences

    fn format_sequence_cache(&self, cache: i64) -> Result<Option<String>> {
        Ok(Some(format!("CACHE {cache}")))
    }

    fn create_sequence(&self, sequence: &SequenceDefinition) -> Result<Vec<String>> {
        let mut parts = vec![
            "CREATE SEQUENCE".to_string(),
            self.quoter()
                .quote_sequence_name(&sequence.name, sequence.schema.as_deref()),
        ];
        if let Some(start) = sequence.start {
            parts.push(format!("START WITH {start}"));
        }
        if let Some(increment) = sequence.increment {
            parts.push(format!("INCREMENT BY {increment}"));
        }
        if let Some(min_value) = sequence.min_value {
            parts.push(format!("MINVALUE {min_value}"));
        }
        if let Some(max_value) = sequence.max_value {
            parts.push(format!("MAXVALUE {max_value}"));
        }
        if let Some(cache) = sequence.cache {
            parts.extend(self.format_sequence_cache(cache)?);
        }
        if sequence.cycle {
            parts.push("CYCLE".to_string());
        }
        Ok(vec![parts.join(" ")])
    }

    fn drop_sequence(&self, sequence: &DropSequence) -> Result<Vec<String>> {
        Ok(vec![format!(
            "DROP SEQUENCE {}",
            self.quoter()
                .quote_sequence_name(&sequence.name, sequence.schema.as_deref())
        )])
    }

    // Data

    /// `col = value AND ..`, with `IS NULL` for nulls and `1 = 1` for no filter.
    fn where_clause(&self, filter: &Row) -> String {
        if filter.is_empty() {
            return "1 = 1".to_string();
        }
        filter
            .iter()
            .map(|(column, value)| {
                let column = self.quoter().quote_column_name(column);
                if value.is_null() {
                    format!("{column} IS NULL")
                } else {
                    format!("{column} = {}", self.quoter().quote_value(value))
                }
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    fn insert_row(&self, table: &str, row: &Row) -> String {
        let columns: Vec<String> = row.keys().cloned().collect();
        let values: Vec<String> = row.values().map(|v| self.quoter().quote_value(v)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            self.quoter().quote_column_list(&columns),
            values.join(", ")
        )
    }

    fn insert_data(&self, insert: &InsertData) -> Result<Vec<String>> {
        let table = self.qualified_table(insert.schema.as_deref(), &insert.table);
        Ok(insert
            .rows
            .iter()
            .map(|row| self.insert_row(&table, row))
            .collect())
    }

    fn update_data(&self, update: &UpdateData) -> Result<Vec<String>> {
        let assignments = update
            .set
            .iter()
            .map(|(column, value)| {
                format!(
                    "{} = {}",
                    self.quoter().quote_column_name(column),
                    self.quoter().quote_value(value)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        Ok(vec![format!(
            "UPDATE {} SET {} WHERE {}",
            self.qualified_table(update.schema.as_deref(), &update.table),
            assignments,
            self.where_clause(&update.filter)
        )])
    }

    fn delete_data(&self, delete: &DeleteData) -> Result<Vec<String>> {
        let table = self.qualified_table(delete.schema.as_deref(), &delete.table);
        if delete.all_rows {
            return Ok(vec![format!("DELETE FROM {table} WHERE 1 = 1")]);
        }
        Ok(delete
            .rows
            .iter()
            .map(|row| format!("DELETE FROM {table} WHERE {}", self.where_clause(row)))
            .collect())
    }

    fn execute_sql(&self, execute: &ExecuteSql) -> Result<Vec<String>> {
        let sql = execute.sql.trim();
        if sql.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![sql.to_string()])
    }
}
