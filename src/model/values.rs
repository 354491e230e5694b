use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A literal value as it appears in defaults, inserted rows and filters.
///
/// Plain JSON scalars map onto the untagged variants; everything that needs a
/// dialect-specific literal form is written as `{"type": ..., "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Typed(TypedValue),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TypedValue {
    /// Exact numeric kept as text so no precision is lost.
    Decimal(String),
    /// Unicode string literal (`N'...'` where the dialect distinguishes it).
    NationalText(String),
    Bytes(#[serde(with = "hex_bytes")] Vec<u8>),
    Guid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    /// Emitted verbatim.
    Raw(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn decimal(value: impl Into<String>) -> Self {
        SqlValue::Typed(TypedValue::Decimal(value.into()))
    }

    pub fn national(value: impl Into<String>) -> Self {
        SqlValue::Typed(TypedValue::NationalText(value.into()))
    }

    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        SqlValue::Typed(TypedValue::Bytes(value.into()))
    }

    pub fn guid(value: Uuid) -> Self {
        SqlValue::Typed(TypedValue::Guid(value))
    }

    pub fn date(value: NaiveDate) -> Self {
        SqlValue::Typed(TypedValue::Date(value))
    }

    pub fn time(value: NaiveTime) -> Self {
        SqlValue::Typed(TypedValue::Time(value))
    }

    pub fn datetime(value: NaiveDateTime) -> Self {
        SqlValue::Typed(TypedValue::DateTime(value))
    }

    pub fn datetime_offset(value: DateTime<FixedOffset>) -> Self {
        SqlValue::Typed(TypedValue::DateTimeOffset(value))
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        SqlValue::Typed(TypedValue::Raw(sql.into()))
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Integer(value.into())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// Database functions usable as column defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemMethod {
    NewGuid,
    NewSequentialId,
    CurrentDateTime,
    CurrentUtcDateTime,
    CurrentDateTimeOffset,
    CurrentUser,
}

impl fmt::Display for SystemMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SystemMethod::NewGuid => "new_guid",
            SystemMethod::NewSequentialId => "new_sequential_id",
            SystemMethod::CurrentDateTime => "current_date_time",
            SystemMethod::CurrentUtcDateTime => "current_utc_date_time",
            SystemMethod::CurrentDateTimeOffset => "current_date_time_offset",
            SystemMethod::CurrentUser => "current_user",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    Value(SqlValue),
    Method(SystemMethod),
    /// A dialect-specific expression, emitted verbatim.
    Raw(String),
}

impl DefaultValue {
    pub fn value(value: impl Into<SqlValue>) -> Self {
        DefaultValue::Value(value.into())
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(&text);
        hex::decode(digits).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_scalars_deserialize_untagged() {
        let values: Vec<SqlValue> =
            serde_json::from_str(r#"[null, true, 42, 1.5, "text"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                SqlValue::Null,
                SqlValue::Bool(true),
                SqlValue::Integer(42),
                SqlValue::Float(1.5),
                SqlValue::Text("text".to_string()),
            ]
        );
    }

    #[test]
    fn typed_values_use_type_and_value_keys() {
        let value: SqlValue = serde_json::from_str(r#"{"type": "bytes", "value": "0xCAFE"}"#).unwrap();
        assert_eq!(value, SqlValue::bytes(vec![0xca, 0xfe]));

        let value: SqlValue =
            serde_json::from_str(r#"{"type": "date", "value": "2024-02-29"}"#).unwrap();
        assert_eq!(
            value,
            SqlValue::date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
    }

    #[test]
    fn bytes_serialize_as_hex() {
        let json = serde_json::to_string(&SqlValue::bytes(vec![1, 2, 255])).unwrap();
        assert_eq!(json, r#"{"type":"bytes","value":"0102ff"}"#);
    }

    #[test]
    fn default_value_forms() {
        let defaults: Vec<DefaultValue> = serde_json::from_str(
            r#"[{"value": 0}, {"method": "current_utc_date_time"}, {"raw": "nextval('s')"}]"#,
        )
        .unwrap();
        assert_eq!(defaults[0], DefaultValue::Value(SqlValue::Integer(0)));
        assert_eq!(
            defaults[1],
            DefaultValue::Method(SystemMethod::CurrentUtcDateTime)
        );
        assert_eq!(defaults[2], DefaultValue::Raw("nextval('s')".to_string()));
    }

    #[test]
    fn option_converts_to_null() {
        let none: Option<i64> = None;
        assert!(SqlValue::from(none).is_null());
        assert_eq!(SqlValue::from(Some("x")), SqlValue::Text("x".to_string()));
    }
}
