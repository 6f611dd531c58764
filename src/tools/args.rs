use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{normalize_amount, parse_amount, parse_local_datetime, TransferId};

use super::ToolError;

/// Raw arguments of `AddTransfer`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddTransferArgs {
    pub value: Value,
    pub date: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Raw arguments of `UpdateTransfer`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTransferArgs {
    pub id: String,
    pub value: Value,
    pub date: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Raw arguments of `DeleteTransfer`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteTransferArgs {
    pub id: String,
}

/// Raw arguments of `GetTransfersInRange`.
#[derive(Debug, Clone, Deserialize)]
pub struct RangeArgs {
    pub from: String,
    pub to: String,
}

pub fn decode<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ToolError> {
    // Callers may omit `arguments` entirely; report the missing fields instead.
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };
    serde_json::from_value(arguments)
        .map_err(|err| ToolError::InvalidArguments(format!("{tool}: {err}")))
}

/// Accept an amount as a JSON number or a decimal string, without going through `f64`.
pub fn parse_value(value: &Value) -> Result<Decimal, ToolError> {
    match value {
        Value::String(text) => parse_amount(text)
            .map_err(|err| ToolError::InvalidArguments(format!("{err}: {text}"))),
        Value::Number(number) => {
            // serde_json prints large or tiny floats in exponent form ("1e21").
            let text = number.to_string();
            let parsed = Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map_err(|_| ToolError::InvalidArguments(format!("invalid amount: {text}")))?;
            normalize_amount(parsed)
                .map_err(|err| ToolError::InvalidArguments(format!("{err}: {text}")))
        }
        other => Err(ToolError::InvalidArguments(format!(
            "value must be a number or a decimal string, got {other}"
        ))),
    }
}

pub fn parse_date(field: &str, value: &str) -> Result<NaiveDateTime, ToolError> {
    parse_local_datetime(value).map_err(|err| ToolError::InvalidArguments(format!("{field}: {err}")))
}

pub fn parse_id(value: &str) -> Result<TransferId, ToolError> {
    TransferId::parse_str(value.trim())
        .map_err(|_| ToolError::InvalidArguments(format!("invalid transfer id: {value}")))
}
