//! Dialect-independent migration expressions.
//!
//! An [`Expression`] describes one schema or data operation. Expressions carry
//! no SQL; generators in [`crate::dialect`] render them per database.

pub mod reverse;
mod values;

pub use values::{DefaultValue, SqlValue, SystemMethod, TypedValue};

use crate::util::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Column values keyed by column name.
pub type Row = BTreeMap<String, SqlValue>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbType {
    AnsiString,
    AnsiStringFixedLength,
    Binary,
    Boolean,
    Byte,
    Currency,
    Date,
    DateTime,
    DateTime2,
    DateTimeOffset,
    Decimal,
    Double,
    Guid,
    Int16,
    Int32,
    Int64,
    Single,
    String,
    StringFixedLength,
    Time,
    Xml,
    /// Dialect type name passed through untouched.
    Custom(std::string::String),
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbType::Custom(name) => write!(f, "custom({name})"),
            other => {
                let json = serde_json::to_string(other).map_err(|_| fmt::Error)?;
                f.write_str(json.trim_matches('"'))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityGeneration {
    Always,
    #[default]
    ByDefault,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default = "one")]
    pub seed: i64,
    #[serde(default = "one")]
    pub increment: i64,
    #[serde(default)]
    pub generation: IdentityGeneration,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            seed: 1,
            increment: 1,
            generation: IdentityGeneration::ByDefault,
        }
    }
}

impl Identity {
    pub fn has_default_seed(&self) -> bool {
        self.seed == 1 && self.increment == 1
    }
}

fn one() -> i64 {
    1
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DbType,
    /// Length for strings/binaries, precision for decimals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: DbType) -> Self {
        Self {
            name: name.into(),
            data_type,
            size: None,
            scale: None,
            nullable: true,
            default: None,
            primary_key: false,
            primary_key_name: None,
            identity: None,
            unique: false,
            collation: None,
            description: None,
        }
    }

    pub fn sized(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn scaled(mut self, size: u32, scale: u32) -> Self {
        self.size = Some(size);
        self.scale = Some(scale);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Primary key columns are implicitly NOT NULL.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn identity(mut self) -> Self {
        self.identity = Some(Identity::default());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    #[default]
    None,
    Cascade,
    SetNull,
    SetDefault,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_schema: Option<String>,
    pub foreign_table: String,
    pub foreign_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_schema: Option<String>,
    pub primary_table: String,
    pub primary_columns: Vec<String>,
    #[serde(default)]
    pub on_delete: Rule,
    #[serde(default)]
    pub on_update: Rule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullsOrder {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IndexColumnRepr")]
pub struct IndexColumn {
    pub name: String,
    pub direction: SortDirection,
    pub nulls: Option<NullsOrder>,
}

impl IndexColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: SortDirection::Ascending,
            nulls: None,
        }
    }

    pub fn descending(mut self) -> Self {
        self.direction = SortDirection::Descending;
        self
    }

    pub fn nulls(mut self, order: NullsOrder) -> Self {
        self.nulls = Some(order);
        self
    }
}

/// Index columns may be written as a bare name in migration documents.
#[derive(Deserialize)]
#[serde(untagged)]
enum IndexColumnRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        direction: SortDirection,
        #[serde(default)]
        nulls: Option<NullsOrder>,
    },
}

impl From<IndexColumnRepr> for IndexColumn {
    fn from(repr: IndexColumnRepr) -> Self {
        match repr {
            IndexColumnRepr::Name(name) => IndexColumn::new(name),
            IndexColumnRepr::Full {
                name,
                direction,
                nulls,
            } => IndexColumn {
                name,
                direction,
                nulls,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexMethod {
    BTree,
    Hash,
    Gin,
    Gist,
    Brin,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clustered: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    /// Partial index predicate, emitted verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<IndexMethod>,
    #[serde(default)]
    pub concurrently: bool,
    #[serde(default)]
    pub if_not_exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nulls_distinct: Option<bool>,
    /// Storage parameters such as `fillfactor`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub storage: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tablespace: Option<String>,
}

impl IndexOptions {
    pub fn is_empty(&self) -> bool {
        *self == IndexOptions::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<i64>,
    #[serde(default)]
    pub cycle: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropSchema {
    pub name: String,
    #[serde(default)]
    pub cascade: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKeyDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub if_not_exists: bool,
}

impl CreateTable {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDefinition>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            columns,
            foreign_keys: Vec::new(),
            description: None,
            if_not_exists: false,
        }
    }

    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn primary_key_columns(&self) -> Vec<&ColumnDefinition> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }
}

/// Changes table-level metadata. Only the description is alterable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlterTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    #[serde(default)]
    pub if_exists: bool,
    #[serde(default)]
    pub cascade: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub old_name: String,
    pub new_name: String,
}

/// Moves a table into another schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    pub destination_schema: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateColumn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    pub column: ColumnDefinition,
}

/// Redefines a column. The definition is the complete new shape, not a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterColumn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    pub column: ColumnDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropColumn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameColumn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<IndexColumn>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "IndexOptions::is_empty")]
    pub options: IndexOptions,
}

impl CreateIndex {
    pub fn new(table: impl Into<String>, name: impl Into<String>, columns: Vec<IndexColumn>) -> Self {
        Self {
            schema: None,
            table: table.into(),
            name: Some(name.into()),
            columns,
            unique: false,
            options: IndexOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropIndex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    pub name: String,
    #[serde(default)]
    pub if_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropForeignKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: ConstraintKind,
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clustered: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    pub name: String,
    pub kind: ConstraintKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterDefault {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    pub column: String,
    pub default: DefaultValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropDefault {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropSequence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    pub rows: Vec<Row>,
    /// Allows explicit values for identity columns (SQL Server).
    #[serde(default)]
    pub identity_insert: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    pub set: Row,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filter: Row,
    #[serde(default)]
    pub all_rows: bool,
}

/// Deletes each listed row (matched on all its columns), or every row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub all_rows: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSql {
    pub sql: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expression {
    CreateSchema(CreateSchema),
    DropSchema(DropSchema),
    CreateTable(CreateTable),
    AlterTable(AlterTable),
    DropTable(DropTable),
    RenameTable(RenameTable),
    MoveTable(MoveTable),
    CreateColumn(CreateColumn),
    AlterColumn(AlterColumn),
    DropColumn(DropColumn),
    RenameColumn(RenameColumn),
    CreateIndex(CreateIndex),
    DropIndex(DropIndex),
    CreateForeignKey(ForeignKeyDefinition),
    DropForeignKey(DropForeignKey),
    CreateConstraint(CreateConstraint),
    DropConstraint(DropConstraint),
    AlterDefault(AlterDefault),
    DropDefault(DropDefault),
    CreateSequence(SequenceDefinition),
    DropSequence(DropSequence),
    InsertData(InsertData),
    UpdateData(UpdateData),
    DeleteData(DeleteData),
    ExecuteSql(ExecuteSql),
}

impl Expression {
    /// Stable snake_case name of the operation, matching the `op` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Expression::CreateSchema(_) => "create_schema",
            Expression::DropSchema(_) => "drop_schema",
            Expression::CreateTable(_) => "create_table",
            Expression::AlterTable(_) => "alter_table",
            Expression::DropTable(_) => "drop_table",
            Expression::RenameTable(_) => "rename_table",
            Expression::MoveTable(_) => "move_table",
            Expression::CreateColumn(_) => "create_column",
            Expression::AlterColumn(_) => "alter_column",
            Expression::DropColumn(_) => "drop_column",
            Expression::RenameColumn(_) => "rename_column",
            Expression::CreateIndex(_) => "create_index",
            Expression::DropIndex(_) => "drop_index",
            Expression::CreateForeignKey(_) => "create_foreign_key",
            Expression::DropForeignKey(_) => "drop_foreign_key",
            Expression::CreateConstraint(_) => "create_constraint",
            Expression::DropConstraint(_) => "drop_constraint",
            Expression::AlterDefault(_) => "alter_default",
            Expression::DropDefault(_) => "drop_default",
            Expression::CreateSequence(_) => "create_sequence",
            Expression::DropSequence(_) => "drop_sequence",
            Expression::InsertData(_) => "insert_data",
            Expression::UpdateData(_) => "update_data",
            Expression::DeleteData(_) => "delete_data",
            Expression::ExecuteSql(_) => "execute_sql",
        }
    }

    /// Schema of the table or object the expression targets, when it names one.
    /// Schema-level expressions and foreign keys return `None`.
    pub fn schema(&self) -> Option<&str> {
        match self {
            Expression::CreateTable(e) => e.schema.as_deref(),
            Expression::AlterTable(e) => e.schema.as_deref(),
            Expression::DropTable(e) => e.schema.as_deref(),
            Expression::RenameTable(e) => e.schema.as_deref(),
            Expression::MoveTable(e) => e.schema.as_deref(),
            Expression::CreateColumn(e) => e.schema.as_deref(),
            Expression::AlterColumn(e) => e.schema.as_deref(),
            Expression::DropColumn(e) => e.schema.as_deref(),
            Expression::RenameColumn(e) => e.schema.as_deref(),
            Expression::CreateIndex(e) => e.schema.as_deref(),
            Expression::DropIndex(e) => e.schema.as_deref(),
            Expression::DropForeignKey(e) => e.schema.as_deref(),
            Expression::CreateConstraint(e) => e.schema.as_deref(),
            Expression::DropConstraint(e) => e.schema.as_deref(),
            Expression::AlterDefault(e) => e.schema.as_deref(),
            Expression::DropDefault(e) => e.schema.as_deref(),
            Expression::CreateSequence(e) => e.schema.as_deref(),
            Expression::DropSequence(e) => e.schema.as_deref(),
            Expression::InsertData(e) => e.schema.as_deref(),
            Expression::UpdateData(e) => e.schema.as_deref(),
            Expression::DeleteData(e) => e.schema.as_deref(),
            Expression::CreateSchema(_)
            | Expression::DropSchema(_)
            | Expression::CreateForeignKey(_)
            | Expression::ExecuteSql(_) => None,
        }
    }

    /// Whether running the expression can lose data.
    pub fn is_destructive(&self) -> bool {
        match self {
            Expression::DropSchema(_)
            | Expression::DropTable(_)
            | Expression::DropColumn(_)
            | Expression::DropSequence(_) => true,
            Expression::DeleteData(delete) => delete.all_rows,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// A versioned unit of schema change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Migration {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub description: String,
    pub up: Vec<Expression>,
    /// Explicit rollback. When absent, `up` is reversed automatically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down: Option<Vec<Expression>>,
}

impl Migration {
    pub fn new(version: u32, description: impl Into<String>) -> Self {
        Migration {
            version,
            description: description.into(),
            up: Vec::new(),
            down: None,
        }
    }

    pub fn with_up(mut self, expressions: Vec<Expression>) -> Self {
        self.up = expressions;
        self
    }

    pub fn with_down(mut self, expressions: Vec<Expression>) -> Self {
        self.down = Some(expressions);
        self
    }

    pub fn checksum(&self) -> String {
        use sha2::{Digest, Sha256};
        let json = serde_json::to_string(self).expect("Migration must serialize");
        let hash = Sha256::digest(json.as_bytes());
        hex::encode(hash)
    }

    pub fn expressions(&self, direction: Direction) -> Result<Vec<Expression>> {
        match direction {
            Direction::Up => Ok(self.up.clone()),
            Direction::Down => match &self.down {
                Some(down) => Ok(down.clone()),
                None => reverse::reverse(&self.up),
            },
        }
    }
}
