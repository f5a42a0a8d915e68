use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{mysql::MySqlRow, Column, Row, TypeInfo};
use tracing::debug;

/// A row of the `apps` catalog table.
///
/// The schema is owned by whoever loads the catalog, so every column is kept
/// as-is (in column order) and handed to the templates untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct App(Map<String, Value>);

impl App {
    pub const fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    pub const fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn from_row(row: &MySqlRow) -> Self {
        let mut fields = Map::with_capacity(row.len());
        for column in row.columns() {
            let value = decode_column(row, column.ordinal(), column.type_info().name());
            fields.insert(column.name().to_string(), value);
        }
        Self(fields)
    }
}

/// Maps a MySQL column onto a JSON value. Columns that cannot be decoded
/// become `null` instead of failing the whole page.
fn decode_column(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    let decoded = match type_name {
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .map(|v| v.map(Value::from)),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .map(|v| v.map(Value::from)),
        unsigned if unsigned.ends_with("UNSIGNED") => row
            .try_get::<Option<u64>, _>(index)
            .map(|v| v.map(Value::from)),
        "FLOAT" => row
            .try_get::<Option<f32>, _>(index)
            .map(|v| v.map(|f| Value::from(f64::from(f)))),
        "DOUBLE" => row
            .try_get::<Option<f64>, _>(index)
            .map(|v| v.map(Value::from)),
        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(index)
            .map(|v| v.map(|d| Value::from(d.to_string()))),
        "DATETIME" => row
            .try_get::<Option<NaiveDateTime>, _>(index)
            .map(|v| v.map(|d| Value::from(d.to_string()))),
        "TIMESTAMP" => row
            .try_get::<Option<DateTime<Utc>>, _>(index)
            .map(|v| v.map(|d| Value::from(d.to_rfc3339()))),
        "TIME" => row
            .try_get::<Option<NaiveTime>, _>(index)
            .map(|v| v.map(|t| Value::from(t.to_string()))),
        "JSON" => row.try_get_unchecked::<Option<String>, _>(index).map(|v| {
            v.map(|raw| serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
        }),
        // DECIMAL, character and text columns
        _ => row
            .try_get::<Option<String>, _>(index)
            .or_else(|_| row.try_get_unchecked::<Option<String>, _>(index))
            .map(|v| v.map(Value::from)),
    };

    match decoded {
        Ok(value) => value.unwrap_or(Value::Null),
        Err(e) => {
            debug!(column = index, type_name, "Could not decode column: {}", e);
            Value::Null
        }
    }
}
