use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value};

use crate::domain::param::{FieldExtractor, FieldList, Param, ParamValue};

pub type JsonRow = Map<String, Value>;

/// Reads rows shaped like the first JSON object.
///
/// The shape is resolved once; rows missing one of its keys bind `NULL`
/// and extra keys are ignored.
#[derive(Debug, Clone, Default)]
pub struct JsonFieldExtractor {
    fields: FieldList,
}

impl JsonFieldExtractor {
    pub fn new(fields: FieldList) -> Self {
        Self { fields }
    }

    pub fn from_first_row(rows: &[JsonRow]) -> Self {
        rows.first()
            .map(|first_row| Self::new(FieldList::new(first_row.keys().cloned())))
            .unwrap_or_default()
    }
}

impl FieldExtractor<JsonRow> for JsonFieldExtractor {
    fn fields(&self) -> &FieldList {
        &self.fields
    }

    fn values(&self, row: &JsonRow) -> Vec<ParamValue> {
        self.fields
            .names()
            .iter()
            .map(|name| row.get(name).map_or(ParamValue::Null, json_to_param_value))
            .collect()
    }
}

pub fn json_to_param_value(value: &Value) -> ParamValue {
    match value {
        Value::Null => ParamValue::Null,
        Value::Bool(flag) => ParamValue::Bool(*flag),
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                ParamValue::Int(integer)
            } else if let Some(unsigned) = number.as_u64() {
                ParamValue::UInt(unsigned)
            } else {
                number
                    .as_f64()
                    .map_or_else(|| ParamValue::Text(number.to_string()), ParamValue::Float)
            }
        }
        Value::String(text) => ParamValue::Text(text.clone()),
        Value::Array(_) | Value::Object(_) => ParamValue::Text(value.to_string()),
    }
}

/// Parses a JSON array of objects, keeping each object's key order.
pub fn parse_rows(json: &str) -> Result<Vec<JsonRow>> {
    let document: Value = serde_json::from_str(json).context("Rows must be valid JSON")?;
    let Value::Array(items) = document else {
        return Err(anyhow!("Rows must be a JSON array of objects"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(row_index, item)| match item {
            Value::Object(row) => Ok(row),
            other => Err(anyhow!(
                "Row {row_index} must be a JSON object, but got {other}"
            )),
        })
        .collect()
}

/// Parses a JSON object into common parameters in key order.
pub fn parse_common_params(json: &str) -> Result<Vec<Param>> {
    let document: Value =
        serde_json::from_str(json).context("Common parameters must be valid JSON")?;
    let Value::Object(common) = document else {
        return Err(anyhow!("Common parameters must be a JSON object"));
    };

    Ok(common
        .iter()
        .map(|(name, value)| Param::new(name.as_str(), json_to_param_value(value)))
        .collect())
}
