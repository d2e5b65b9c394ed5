//! Converting simple-query (text format) values into JSON

use serde_json::{Map, Number, Value};
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo};

use crate::error::BridgeResult;

/// Convert a row fetched over the simple-query protocol into an ordered map
pub fn row_to_map(row: &PgRow) -> BridgeResult<Map<String, Value>> {
    let mut map = Map::with_capacity(row.columns().len());

    for (i, column) in row.columns().iter().enumerate() {
        // Every value arrives as text here, so the unchecked String decode is sound
        let text: Option<String> = row.try_get_unchecked(i)?;
        map.insert(
            column.name().to_string(),
            text_to_json(column.type_info().name(), text),
        );
    }

    Ok(map)
}

/// Map one text-format value to JSON according to its PostgreSQL type name
pub fn text_to_json(type_name: &str, text: Option<String>) -> Value {
    let Some(text) = text else {
        return Value::Null;
    };

    match type_name {
        "INT2" | "INT4" | "INT8" | "OID" => text
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::String(text)),
        "FLOAT4" | "FLOAT8" | "NUMERIC" => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::String(text)),
        "BOOL" => match text.as_str() {
            "t" | "true" => Value::Bool(true),
            "f" | "false" => Value::Bool(false),
            _ => Value::String(text),
        },
        "JSON" | "JSONB" => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        _ => Value::String(text),
    }
}
