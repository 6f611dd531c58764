//! Tool-invocation boundary.
//!
//! Maps the four named tools onto [`LedgerService`] calls: arguments arrive as JSON,
//! records leave as JSON using the `id`/`value`/`date`/`description`/`type` field names.

mod args;

pub use args::*;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::application::{AppError, LedgerService};

pub const ADD_TRANSFER: &str = "AddTransfer";
pub const UPDATE_TRANSFER: &str = "UpdateTransfer";
pub const DELETE_TRANSFER: &str = "DeleteTransfer";
pub const GET_TRANSFERS_IN_RANGE: &str = "GetTransfersInRange";

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid argument: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Operation(#[from] AppError),

    #[error("Failed to serialize result: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Stable error kind reported to the caller.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UnknownTool(_) => "UnknownTool",
            ToolError::InvalidArguments(_) => "InvalidArgument",
            ToolError::Operation(err) => err.kind(),
            ToolError::Serialization(_) => "Internal",
        }
    }
}

/// Successful tool result.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Serialized JSON payload
    Json(String),
    /// Operations that return nothing (delete)
    Empty,
}

/// Description of a tool as advertised to callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

fn amount_schema() -> Value {
    json!({
        "type": ["number", "string"],
        "description": "Amount (absolute, positive), e.g. 50 or \"50.00\""
    })
}

fn date_schema(description: &str) -> Value {
    json!({
        "type": "string",
        "description": format!("{description} (local, YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)")
    })
}

fn note_schema() -> Value {
    json!({ "type": "string", "description": "Optional short note (e.g., 'Rent')" })
}

fn kind_schema() -> Value {
    json!({
        "type": "string",
        "description": "Type: 'Income' or 'Expense' (case-insensitive)"
    })
}

fn id_schema() -> Value {
    json!({ "type": "string", "format": "uuid", "description": "Transfer id" })
}

/// The tool catalogue, in a fixed order.
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: ADD_TRANSFER,
            description: "Add a new transfer",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "value": amount_schema(),
                    "date": date_schema("Transfer date and time"),
                    "description": note_schema(),
                    "type": kind_schema(),
                },
                "required": ["value", "date", "description", "type"],
            }),
        },
        ToolDefinition {
            name: UPDATE_TRANSFER,
            description: "Update an existing transfer",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": id_schema(),
                    "value": amount_schema(),
                    "date": date_schema("Transfer date and time"),
                    "description": note_schema(),
                    "type": kind_schema(),
                },
                "required": ["id", "value", "date", "description", "type"],
            }),
        },
        ToolDefinition {
            name: DELETE_TRANSFER,
            description: "Delete a transfer",
            input_schema: json!({
                "type": "object",
                "properties": { "id": id_schema() },
                "required": ["id"],
            }),
        },
        ToolDefinition {
            name: GET_TRANSFERS_IN_RANGE,
            description: "Get transfers within a date range",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "from": date_schema("Start date (inclusive)"),
                    "to": date_schema("End date (inclusive)"),
                },
                "required": ["from", "to"],
            }),
        },
    ]
}

/// Dispatches tool calls to the ledger service.
#[derive(Clone)]
pub struct TransferTools {
    service: LedgerService,
}

impl TransferTools {
    pub fn new(service: LedgerService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &LedgerService {
        &self.service
    }

    /// Invoke a tool by name. Failures are logged and returned, never raised further.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<ToolOutput, ToolError> {
        let result = self.dispatch(name, arguments).await;
        if let Err(err) = &result {
            tracing::warn!(tool = name, kind = err.kind(), "{err}");
        }
        result
    }

    async fn dispatch(&self, name: &str, arguments: Value) -> Result<ToolOutput, ToolError> {
        match name {
            ADD_TRANSFER => self.add_transfer(decode(name, arguments)?).await,
            UPDATE_TRANSFER => self.update_transfer(decode(name, arguments)?).await,
            DELETE_TRANSFER => self.delete_transfer(decode(name, arguments)?).await,
            GET_TRANSFERS_IN_RANGE => self.get_transfers_in_range(decode(name, arguments)?).await,
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    async fn add_transfer(&self, args: AddTransferArgs) -> Result<ToolOutput, ToolError> {
        tracing::info!(
            value = %args.value,
            date = %args.date,
            description = %args.description,
            kind = %args.kind,
            "AddTransfer called"
        );
        let amount = parse_value(&args.value)?;
        let occurred_at = parse_date("date", &args.date)?;

        let transfer = self
            .service
            .add_transfer(amount, occurred_at, args.description, &args.kind)
            .await?;

        tracing::info!(id = %transfer.id, "AddTransfer - transfer created");
        to_json(&transfer)
    }

    async fn update_transfer(&self, args: UpdateTransferArgs) -> Result<ToolOutput, ToolError> {
        tracing::info!(
            id = %args.id,
            value = %args.value,
            date = %args.date,
            description = %args.description,
            kind = %args.kind,
            "UpdateTransfer called"
        );
        let id = parse_id(&args.id)?;
        let amount = parse_value(&args.value)?;
        let occurred_at = parse_date("date", &args.date)?;

        let transfer = self
            .service
            .update_transfer(id, amount, occurred_at, args.description, &args.kind)
            .await?;

        tracing::info!(id = %transfer.id, "UpdateTransfer - transfer updated");
        to_json(&transfer)
    }

    async fn delete_transfer(&self, args: DeleteTransferArgs) -> Result<ToolOutput, ToolError> {
        tracing::info!(id = %args.id, "DeleteTransfer called");
        let id = parse_id(&args.id)?;

        self.service.delete_transfer(id).await?;

        tracing::info!(%id, "DeleteTransfer completed");
        Ok(ToolOutput::Empty)
    }

    async fn get_transfers_in_range(&self, args: RangeArgs) -> Result<ToolOutput, ToolError> {
        tracing::info!(from = %args.from, to = %args.to, "GetTransfersInRange called");
        let from = parse_date("from", &args.from)?;
        let to = parse_date("to", &args.to)?;

        let transfers = self.service.get_transfers_in_range(from, to).await?;

        tracing::info!(count = transfers.len(), "GetTransfersInRange - retrieved transfers");
        to_json(&transfers)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<ToolOutput, ToolError> {
    Ok(ToolOutput::Json(serde_json::to_string(value)?))
}
