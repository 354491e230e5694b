//! Structural checks run before any SQL is generated.

use crate::conventions;
use crate::dialect::Dialect;
use crate::generator::generator_for;
use crate::model::{
    ColumnDefinition, CreateTable, DefaultValue, Expression, ForeignKeyDefinition, Row, SqlValue,
    TypedValue,
};
use crate::util::MigrationError;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("valid decimal pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Position of the offending expression in the list.
    pub index: usize,
    pub kind: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}: {}", self.index, self.kind, self.message)
    }
}

/// Every structural problem in `expressions`, in expression order.
pub fn validate_expressions(expressions: &[Expression], dialect: Dialect) -> Vec<ValidationError> {
    let max_identifier_length = generator_for(dialect, Default::default())
        .quoter()
        .max_identifier_length();

    expressions
        .iter()
        .enumerate()
        .flat_map(|(index, expression)| {
            let mut checker = Checker {
                dialect,
                max_identifier_length,
                messages: Vec::new(),
            };
            checker.check(expression);
            checker.messages.into_iter().map(move |message| ValidationError {
                index,
                kind: expression.kind(),
                message,
            })
        })
        .collect()
}

/// Folds validation errors into a single [`MigrationError::ValidationError`].
pub fn into_error(errors: &[ValidationError]) -> MigrationError {
    let lines: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    MigrationError::ValidationError(lines.join("; "))
}

struct Checker {
    dialect: Dialect,
    max_identifier_length: Option<usize>,
    messages: Vec<String>,
}

impl Checker {
    fn check(&mut self, expression: &Expression) {
        self.optional_name("schema", expression.schema());

        match expression {
            Expression::CreateSchema(e) => self.name("schema", &e.name),
            Expression::DropSchema(e) => self.name("schema", &e.name),
            Expression::CreateTable(e) => {
                self.name("table", &e.name);
                if e.columns.is_empty() {
                    self.fail(format!("table '{}' has no columns", e.name));
                }
                self.columns(&e.name, &e.columns);
                self.primary_key(e);
                for foreign_key in &e.foreign_keys {
                    self.foreign_key(foreign_key);
                }
            }
            Expression::AlterTable(e) => self.name("table", &e.name),
            Expression::DropTable(e) => self.name("table", &e.name),
            Expression::RenameTable(e) => {
                self.name("table", &e.old_name);
                self.name("table", &e.new_name);
            }
            Expression::MoveTable(e) => {
                self.name("table", &e.table);
                self.name("schema", &e.destination_schema);
            }
            Expression::CreateColumn(e) => {
                self.name("table", &e.table);
                self.column(&e.table, &e.column);
            }
            Expression::AlterColumn(e) => {
                self.name("table", &e.table);
                self.column(&e.table, &e.column);
            }
            Expression::DropColumn(e) => {
                self.name("table", &e.table);
                if e.columns.is_empty() {
                    self.fail("no columns to drop".to_string());
                }
                for column in &e.columns {
                    self.name("column", column);
                }
            }
            Expression::RenameColumn(e) => {
                self.name("table", &e.table);
                self.name("column", &e.old_name);
                self.name("column", &e.new_name);
            }
            Expression::CreateIndex(e) => {
                self.name("table", &e.table);
                if let Some(ref name) = e.name {
                    self.name("index", name);
                }
                if e.columns.is_empty() {
                    self.fail(format!("index on '{}' has no columns", e.table));
                }
                for column in &e.columns {
                    self.name("column", &column.name);
                }
            }
            Expression::DropIndex(e) => self.name("index", &e.name),
            Expression::CreateForeignKey(e) => self.foreign_key(e),
            Expression::DropForeignKey(e) => {
                self.name("table", &e.table);
                self.name("foreign key", &e.name);
            }
            Expression::CreateConstraint(e) => {
                self.name("table", &e.table);
                if let Some(ref name) = e.name {
                    self.name("constraint", name);
                }
                if e.columns.is_empty() {
                    self.fail(format!("constraint on '{}' has no columns", e.table));
                }
                for column in &e.columns {
                    self.name("column", column);
                }
            }
            Expression::DropConstraint(e) => {
                self.name("table", &e.table);
                self.name("constraint", &e.name);
            }
            Expression::AlterDefault(e) => {
                self.name("table", &e.table);
                self.name("column", &e.column);
                self.default_constraint(&e.table, &e.column);
                self.default(&e.default);
            }
            Expression::DropDefault(e) => {
                self.name("table", &e.table);
                self.name("column", &e.column);
            }
            Expression::CreateSequence(e) => {
                self.name("sequence", &e.name);
                if e.increment == Some(0) {
                    self.fail(format!("sequence '{}' has an increment of 0", e.name));
                }
                if let (Some(min), Some(max)) = (e.min_value, e.max_value) {
                    if min > max {
                        self.fail(format!(
                            "sequence '{}' has MINVALUE {min} greater than MAXVALUE {max}",
                            e.name
                        ));
                    }
                }
            }
            Expression::DropSequence(e) => self.name("sequence", &e.name),
            Expression::InsertData(e) => {
                self.name("table", &e.table);
                if e.rows.is_empty() {
                    self.fail(format!("insert into '{}' has no rows", e.table));
                }
                for row in &e.rows {
                    if row.is_empty() {
                        self.fail(format!("insert into '{}' has an empty row", e.table));
                    }
                    self.row(row);
                }
            }
            Expression::UpdateData(e) => {
                self.name("table", &e.table);
                if e.set.is_empty() {
                    self.fail(format!("update of '{}' sets no columns", e.table));
                }
                if e.filter.is_empty() && !e.all_rows {
                    self.fail(format!(
                        "update of '{}' needs a filter or all_rows",
                        e.table
                    ));
                }
                self.row(&e.set);
                self.row(&e.filter);
            }
            Expression::DeleteData(e) => {
                self.name("table", &e.table);
                if e.rows.is_empty() && !e.all_rows {
                    self.fail(format!(
                        "delete from '{}' needs rows or all_rows",
                        e.table
                    ));
                }
                for row in &e.rows {
                    self.row(row);
                }
            }
            Expression::ExecuteSql(e) => {
                if e.sql.trim().is_empty() {
                    self.fail("SQL text is empty".to_string());
                }
            }
        }
    }

    fn fail(&mut self, message: String) {
        self.messages.push(message);
    }

    fn name(&mut self, what: &str, name: &str) {
        if name.trim().is_empty() {
            self.fail(format!("{what} name is empty"));
            return;
        }
        if name.contains('\0') {
            self.fail(format!("{what} name '{}' contains a NUL character", name.escape_debug()));
        }
        if let Some(max) = self.max_identifier_length {
            let length = name.chars().count();
            if length > max {
                self.fail(format!(
                    "{what} name '{name}' is {length} characters; {} allows {max}",
                    self.dialect
                ));
            }
        }
    }

    fn optional_name(&mut self, what: &str, name: Option<&str>) {
        if let Some(name) = name {
            self.name(what, name);
        }
    }

    fn columns(&mut self, table: &str, columns: &[ColumnDefinition]) {
        let mut seen = HashSet::new();
        for column in columns {
            if !seen.insert(column.name.to_lowercase()) {
                self.fail(format!("column '{}' is defined more than once", column.name));
            }
            self.column(table, column);
        }
    }

    fn column(&mut self, table: &str, column: &ColumnDefinition) {
        self.name("column", &column.name);
        if let Some(ref name) = column.primary_key_name {
            self.name("primary key", name);
        }
        if let Some(ref default) = column.default {
            self.default_constraint(table, &column.name);
            self.default(default);
        }
    }

    /// Composite keys become a table constraint named after the table.
    fn primary_key(&mut self, table: &CreateTable) {
        let columns = table.primary_key_columns();
        if columns.len() > 1 && columns.iter().all(|c| c.primary_key_name.is_none()) {
            self.name("primary key", &conventions::primary_key_name(&table.name));
        }
    }

    /// SQL Server names every default constraint.
    fn default_constraint(&mut self, table: &str, column: &str) {
        if self.dialect == Dialect::SqlServer {
            self.name("default constraint", &conventions::default_constraint_name(table, column));
        }
    }

    fn foreign_key(&mut self, foreign_key: &ForeignKeyDefinition) {
        if let Some(ref name) = foreign_key.name {
            self.name("foreign key", name);
        }
        self.optional_name("schema", foreign_key.foreign_schema.as_deref());
        self.optional_name("schema", foreign_key.primary_schema.as_deref());
        self.name("table", &foreign_key.primary_table);
        if foreign_key.foreign_columns.is_empty() {
            self.fail(format!(
                "foreign key to '{}' has no columns",
                foreign_key.primary_table
            ));
        }
        if foreign_key.foreign_columns.len() != foreign_key.primary_columns.len() {
            self.fail(format!(
                "foreign key to '{}' maps {} columns onto {}",
                foreign_key.primary_table,
                foreign_key.foreign_columns.len(),
                foreign_key.primary_columns.len()
            ));
        }
        for column in foreign_key
            .foreign_columns
            .iter()
            .chain(&foreign_key.primary_columns)
        {
            self.name("column", column);
        }
    }

    fn default(&mut self, default: &DefaultValue) {
        if let DefaultValue::Value(value) = default {
            self.value(value);
        }
    }

    fn row(&mut self, row: &Row) {
        for (column, value) in row {
            self.name("column", column);
            self.value(value);
        }
    }

    fn value(&mut self, value: &SqlValue) {
        if let SqlValue::Typed(TypedValue::Decimal(text)) = value {
            if !DECIMAL.is_match(text.trim()) {
                self.fail(format!("'{text}' is not a decimal number"));
            }
        }
    }
}
