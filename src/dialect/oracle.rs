use super::Dialect;
use crate::generator::{
    ColumnClause, ColumnContext, Generator, GeneratorOptions, IndexFeatures,
};
use crate::model::{
    AlterColumn, AlterDefault, ColumnDefinition, CreateIndex, CreateSchema, CreateTable, DbType,
    DropDefault, DropIndex, DropSchema, DropTable, Identity, IdentityGeneration, Rule,
    SystemMethod,
};
use crate::quoter::Quoter;
use crate::typemap::{TypeMap, UNBOUNDED};
use crate::util::Result;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

const ORA_TABLE_MISSING: i32 = -942;
const ORA_NAME_IN_USE: i32 = -955;
const ORA_INDEX_MISSING: i32 = -1418;

pub struct OracleQuoter;

impl Quoter for OracleQuoter {
    fn format_bool(&self, value: bool) -> String {
        String::from(if value { "1" } else { "0" })
    }

    fn format_national_string(&self, value: &str) -> String {
        format!("N{}", self.format_string(value))
    }

    fn format_bytes(&self, bytes: &[u8]) -> String {
        format!("HEXTORAW('{}')", hex::encode_upper(bytes))
    }

    fn format_guid(&self, guid: &Uuid) -> String {
        format!(
            "HEXTORAW('{}')",
            guid.simple().to_string().to_ascii_uppercase()
        )
    }

    fn format_date(&self, date: &NaiveDate) -> String {
        format!("TO_DATE('{}', 'YYYY-MM-DD')", date.format("%Y-%m-%d"))
    }

    /// Time columns are DATE, so a time literal is a DATE on the default day.
    fn format_time(&self, time: &NaiveTime) -> String {
        format!("TO_DATE('{}', 'HH24:MI:SS')", time.format("%H:%M:%S"))
    }

    fn format_datetime(&self, value: &NaiveDateTime) -> String {
        format!(
            "TO_TIMESTAMP('{}', 'YYYY-MM-DD HH24:MI:SS.FF6')",
            value.format("%Y-%m-%d %H:%M:%S%.6f")
        )
    }

    fn format_datetime_offset(&self, value: &DateTime<FixedOffset>) -> String {
        format!(
            "TO_TIMESTAMP_TZ('{}', 'YYYY-MM-DD HH24:MI:SS.FF6 TZH:TZM')",
            value.format("%Y-%m-%d %H:%M:%S%.6f %:z")
        )
    }

    fn format_system_method(&self, method: SystemMethod) -> Option<String> {
        let sql = match method {
            SystemMethod::NewGuid => "SYS_GUID()",
            SystemMethod::NewSequentialId => return None,
            SystemMethod::CurrentDateTime => "LOCALTIMESTAMP",
            SystemMethod::CurrentUtcDateTime => "sys_extract_utc(SYSTIMESTAMP)",
            SystemMethod::CurrentDateTimeOffset => "CURRENT_TIMESTAMP",
            SystemMethod::CurrentUser => "USER",
        };
        Some(sql.to_string())
    }

    fn max_identifier_length(&self) -> Option<usize> {
        Some(128)
    }
}

pub fn type_map() -> TypeMap {
    let mut map = TypeMap::new(Dialect::Oracle);
    map.set(DbType::AnsiStringFixedLength, "CHAR(255)")
        .set_sized(DbType::AnsiStringFixedLength, 2000, "CHAR($size)")
        .set(DbType::AnsiString, "VARCHAR2(255)")
        .set_sized(DbType::AnsiString, 4000, "VARCHAR2($size)")
        .set_sized(DbType::AnsiString, UNBOUNDED, "CLOB")
        .set(DbType::StringFixedLength, "NCHAR(255)")
        .set_sized(DbType::StringFixedLength, 2000, "NCHAR($size)")
        .set(DbType::String, "NVARCHAR2(255)")
        .set_sized(DbType::String, 2000, "NVARCHAR2($size)")
        .set_sized(DbType::String, UNBOUNDED, "NCLOB")
        .set(DbType::Binary, "BLOB")
        .set_sized(DbType::Binary, 2000, "RAW($size)")
        .set_sized(DbType::Binary, UNBOUNDED, "BLOB")
        .set(DbType::Boolean, "NUMBER(1,0)")
        .set(DbType::Byte, "NUMBER(3,0)")
        .set(DbType::Currency, "NUMBER(19,4)")
        .set(DbType::Date, "DATE")
        .set(DbType::DateTime, "TIMESTAMP(4)")
        .set(DbType::DateTime2, "TIMESTAMP(7)")
        .set(DbType::DateTimeOffset, "TIMESTAMP(4) WITH TIME ZONE")
        .set(DbType::Decimal, "NUMBER(19,5)")
        .set_sized(DbType::Decimal, 38, "NUMBER($size,$scale)")
        .set(DbType::Double, "BINARY_DOUBLE")
        .set(DbType::Guid, "RAW(16)")
        .set(DbType::Int16, "NUMBER(5,0)")
        .set(DbType::Int32, "NUMBER(10,0)")
        .set(DbType::Int64, "NUMBER(19,0)")
        .set(DbType::Single, "BINARY_FLOAT")
        .set(DbType::Time, "DATE")
        .set(DbType::Xml, "XMLTYPE");
    map
}

const CLAUSE_ORDER: &[ColumnClause] = &[
    ColumnClause::Type,
    ColumnClause::Collation,
    ColumnClause::Identity,
    ColumnClause::Default,
    ColumnClause::Nullability,
    ColumnClause::PrimaryKey,
    ColumnClause::Unique,
];

pub struct OracleGenerator {
    quoter: OracleQuoter,
    type_map: TypeMap,
    options: GeneratorOptions,
}

impl OracleGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            quoter: OracleQuoter,
            type_map: type_map(),
            options,
        }
    }

    /// Runs `statement` dynamically and swallows only the given SQLCODE.
    fn ignoring_error(&self, statement: &str, sqlcode: i32) -> String {
        format!(
            "BEGIN\n    EXECUTE IMMEDIATE {};\nEXCEPTION\n    WHEN OTHERS THEN\n        IF SQLCODE != {} THEN\n            RAISE;\n        END IF;\nEND;",
            self.quoter.format_string(statement),
            sqlcode
        )
    }
}

fn is_plsql_block(statement: &str) -> bool {
    let head = statement.trim_start().to_ascii_uppercase();
    head.starts_with("BEGIN") || head.starts_with("DECLARE")
}

impl Generator for OracleGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::Oracle
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

    /// PL/SQL blocks end with `END;` and need a `/` line in SQL*Plus scripts.
    fn render_statement(&self, statement: &str) -> String {
        if is_plsql_block(statement) {
            format!("{statement}\n/")
        } else {
            format!("{statement};")
        }
    }

    fn column_clause_order(&self) -> &'static [ColumnClause] {
        CLAUSE_ORDER
    }

    fn format_identity(
        &self,
        _column: &ColumnDefinition,
        identity: &Identity,
        _ctx: &ColumnContext<'_>,
    ) -> Result<Option<String>> {
        let generation = match identity.generation {
            IdentityGeneration::Always => "ALWAYS",
            IdentityGeneration::ByDefault => "BY DEFAULT ON NULL",
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

    fn create_schema(&self, _schema: &CreateSchema) -> Result<Vec<String>> {
        self.unsupported("schemas (Oracle schemas are users)")
    }

    fn drop_schema(&self, _schema: &DropSchema) -> Result<Vec<String>> {
        self.unsupported("schemas (Oracle schemas are users)")
    }

    fn create_table_statement(&self, table: &CreateTable, definitions: &[String]) -> Result<String> {
        let sql = format!(
            "CREATE TABLE {} (\n    {}\n)",
            self.qualified_table(table.schema.as_deref(), &table.name),
            definitions.join(",\n    ")
        );
        if table.if_not_exists {
            return Ok(self.ignoring_error(&sql, ORA_NAME_IN_USE));
        }
        Ok(sql)
    }

    fn drop_table(&self, table: &DropTable) -> Result<Vec<String>> {
        let mut sql = format!(
            "DROP TABLE {}",
            self.qualified_table(table.schema.as_deref(), &table.name)
        );
        if table.cascade {
            sql.push_str(" CASCADE CONSTRAINTS");
        }
        if table.if_exists {
            return Ok(vec![self.ignoring_error(&sql, ORA_TABLE_MISSING)]);
        }
        Ok(vec![sql])
    }

    fn add_column_keyword(&self) -> &'static str {
        "ADD"
    }

    fn alter_column(&self, alter: &AlterColumn) -> Result<Vec<String>> {
        let schema = alter.schema.as_deref();
        self.check_alter_column(&alter.column)?;
        let ctx = ColumnContext::alter(schema, &alter.table);
        let mut statements = vec![format!(
            "ALTER TABLE {} MODIFY {}",
            self.qualified_table(schema, &alter.table),
            self.column_definition(&alter.column, &ctx)?
        )];
        statements.extend(self.alter_column_description(alter)?);
        Ok(statements)
    }

    fn index_features(&self) -> IndexFeatures {
        IndexFeatures {
            tablespace: true,
            ..IndexFeatures::default()
        }
    }

    fn create_index(&self, index: &CreateIndex) -> Result<Vec<String>> {
        let options = self.supported_index_options(&index.options)?;
        let unique = if index.unique { "UNIQUE " } else { "" };
        let mut sql = format!(
            "CREATE {}INDEX {} ON {} ({})",
            unique,
            self.quoter.quote_index_name(
                &crate::generator::index_name(index),
                index.schema.as_deref()
            ),
            self.qualified_table(index.schema.as_deref(), &index.table),
            self.index_columns(&index.columns)?
        );
        if let Some(ref tablespace) = options.tablespace {
            sql.push_str(&format!(" TABLESPACE {}", self.quoter.quote(tablespace)));
        }
        Ok(vec![sql])
    }

    fn drop_index(&self, index: &DropIndex) -> Result<Vec<String>> {
        let sql = format!(
            "DROP INDEX {}",
            self.quoter
                .quote_index_name(&index.name, index.schema.as_deref())
        );
        if index.if_exists {
            return Ok(vec![self.ignoring_error(&sql, ORA_INDEX_MISSING)]);
        }
        Ok(vec![sql])
    }

    /// Oracle has no ON UPDATE actions and no SET DEFAULT delete action.
    fn format_rule(&self, action: &str, rule: Rule) -> Result<Option<String>> {
        match rule {
            Rule::None => Ok(None),
            _ if action == "ON UPDATE" => {
                self.check_feature("ON UPDATE referential actions")?;
                Ok(None)
            }
            Rule::SetDefault => {
                self.check_feature("ON DELETE SET DEFAULT")?;
                Ok(None)
            }
            Rule::Cascade => Ok(Some(format!("{action} CASCADE"))),
            Rule::SetNull => Ok(Some(format!("{action} SET NULL"))),
        }
    }

    fn alter_default(&self, alter: &AlterDefault) -> Result<Vec<String>> {
        let Some(default) = self.format_default(&alter.default)? else {
            return Ok(Vec::new());
        };
        Ok(vec![format!(
            "ALTER TABLE {} MODIFY {} DEFAULT {}",
            self.qualified_table(alter.schema.as_deref(), &alter.table),
            self.quoter.quote_column_name(&alter.column),
            default
        )])
    }

    fn drop_default(&self, drop: &DropDefault) -> Result<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} MODIFY {} DEFAULT NULL",
            self.qualified_table(drop.schema.as_deref(), &drop.table),
            self.quoter.quote_column_name(&drop.column)
        )])
    }

    fn format_sequence_cache(&self, cache: i64) -> Result<Option<String>> {
        if cache <= 1 {
            return Ok(Some("NOCACHE".to_string()));
        }
        Ok(Some(format!("CACHE {cache}")))
    }
}
