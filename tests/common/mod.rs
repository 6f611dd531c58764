// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDateTime;
use finledger::application::LedgerService;
use finledger::domain::{parse_local_datetime, Transfer};
use finledger::mcp::McpServer;
use finledger::tools::TransferTools;
use rust_decimal::Decimal;
use std::str::FromStr;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(&db_path).await?;
    Ok((service, temp_dir))
}

/// Helper to create the tool layer over a temporary database
pub async fn test_tools() -> Result<(TransferTools, TempDir)> {
    let (service, temp_dir) = test_service().await?;
    Ok((TransferTools::new(service), temp_dir))
}

/// Helper to create an MCP server over a temporary database
pub async fn test_server() -> Result<(McpServer, TempDir)> {
    let (tools, temp_dir) = test_tools().await?;
    Ok((McpServer::new(tools), temp_dir))
}

/// Helper to parse "YYYY-MM-DD" or "YYYY-MM-DDTHH:MM:SS"
pub fn date(input: &str) -> NaiveDateTime {
    parse_local_datetime(input).unwrap()
}

/// Helper to build a decimal amount from a literal string
pub fn amount(input: &str) -> Decimal {
    Decimal::from_str(input).unwrap()
}

/// Record an expense dated `on` with the given amount
pub async fn add_expense(service: &LedgerService, value: &str, on: &str, note: &str) -> Result<Transfer> {
    Ok(service
        .add_transfer(amount(value), date(on), note.to_string(), "Expense")
        .await?)
}

/// Record an income dated `on` with the given amount
pub async fn add_income(service: &LedgerService, value: &str, on: &str, note: &str) -> Result<Transfer> {
    Ok(service
        .add_transfer(amount(value), date(on), note.to_string(), "Income")
        .await?)
}
