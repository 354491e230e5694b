//! Identifier quoting and literal formatting.
//!
//! The trait defaults follow ANSI SQL: double-quoted identifiers, single-quoted
//! strings with doubled quotes, `X'..'` binary literals and ISO 8601 text for
//! temporal values. Dialects override only what differs.

use crate::model::{SqlValue, SystemMethod, TypedValue};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

pub trait Quoter: Send + Sync {
    fn open_quote(&self) -> &str {
        "\""
    }

    fn close_quote(&self) -> &str {
        "\""
    }

    /// True when `name` is wrapped in quotes and every inner close quote is doubled.
    fn is_quoted(&self, name: &str) -> bool {
        let (open, close) = (self.open_quote(), self.close_quote());
        if name.len() < open.len() + close.len() || !name.starts_with(open) || !name.ends_with(close) {
            return false;
        }
        let inner = &name[open.len()..name.len() - close.len()];
        !inner.replace(&close.repeat(2), "").contains(close)
    }

    fn quote(&self, name: &str) -> String {
        if self.is_quoted(name) {
            return name.to_string();
        }
        self.force_quote(name)
    }

    fn force_quote(&self, name: &str) -> String {
        let close = self.close_quote();
        format!(
            "{}{}{}",
            self.open_quote(),
            name.replace(close, &close.repeat(2)),
            close
        )
    }

    fn unquote(&self, name: &str) -> String {
        if !self.is_quoted(name) {
            return name.to_string();
        }
        let (open, close) = (self.open_quote(), self.close_quote());
        name[open.len()..name.len() - close.len()].replace(&close.repeat(2), close)
    }

    fn quote_schema_name(&self, schema: &str) -> String {
        self.quote(schema)
    }

    fn quote_table_name(&self, table: &str, schema: Option<&str>) -> String {
        match schema {
            Some(schema) => format!("{}.{}", self.quote_schema_name(schema), self.quote(table)),
            None => self.quote(table),
        }
    }

    fn quote_column_name(&self, column: &str) -> String {
        self.quote(column)
    }

    fn quote_column_list(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.quote_column_name(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn quote_constraint_name(&self, name: &str) -> String {
        self.quote(name)
    }

    /// Index names are schema-scoped in some dialects and table-scoped in others.
    fn quote_index_name(&self, index: &str, schema: Option<&str>) -> String {
        self.quote_table_name(index, schema)
    }

    fn quote_sequence_name(&self, sequence: &str, schema: Option<&str>) -> String {
        self.quote_table_name(sequence, schema)
    }

    fn quote_value(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(b) => self.format_bool(*b),
            SqlValue::Integer(i) => i.to_string(),
            SqlValue::Float(f) => self.format_float(*f),
            SqlValue::Text(s) => self.format_string(s),
            SqlValue::Typed(typed) => match typed {
                TypedValue::Decimal(d) => d.clone(),
                TypedValue::NationalText(s) => self.format_national_string(s),
                TypedValue::Bytes(bytes) => self.format_bytes(bytes),
                TypedValue::Guid(guid) => self.format_guid(guid),
                TypedValue::Date(date) => self.format_date(date),
                TypedValue::Time(time) => self.format_time(time),
                TypedValue::DateTime(dt) => self.format_datetime(dt),
                TypedValue::DateTimeOffset(dt) => self.format_datetime_offset(dt),
                TypedValue::Raw(sql) => sql.clone(),
            },
        }
    }

    fn format_bool(&self, value: bool) -> String {
        String::from(if value { "TRUE" } else { "FALSE" })
    }

    fn format_float(&self, value: f64) -> String {
        value.to_string()
    }

    fn format_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn format_national_string(&self, value: &str) -> String {
        self.format_string(value)
    }

    fn format_bytes(&self, bytes: &[u8]) -> String {
        format!("X'{}'", hex::encode_upper(bytes))
    }

    fn format_guid(&self, guid: &Uuid) -> String {
        self.format_string(&guid.hyphenated().to_string())
    }

    fn format_date(&self, date: &NaiveDate) -> String {
        self.format_string(&date.format("%Y-%m-%d").to_string())
    }

    fn format_time(&self, time: &NaiveTime) -> String {
        self.format_string(&time.format("%H:%M:%S%.f").to_string())
    }

    fn format_datetime(&self, value: &NaiveDateTime) -> String {
        self.format_string(&value.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
    }

    fn format_datetime_offset(&self, value: &DateTime<FixedOffset>) -> String {
        self.format_string(&value.format("%Y-%m-%dT%H:%M:%S%.f%:z").to_string())
    }

    /// SQL for a system default function, or `None` when the dialect has no equivalent.
    fn format_system_method(&self, method: SystemMethod) -> Option<String> {
        match method {
            SystemMethod::CurrentDateTime => Some("CURRENT_TIMESTAMP".to_string()),
            SystemMethod::CurrentUser => Some("CURRENT_USER".to_string()),
            _ => None,
        }
    }

    /// Longest identifier the server accepts, `None` when unlimited.
    fn max_identifier_length(&self) -> Option<usize> {
        None
    }
}

/// The plain ANSI behavior, used by tests and as a fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiQuoter;

impl Quoter for AnsiQuoter {}
