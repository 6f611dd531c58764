use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TransferId = Uuid;

/// Direction of a transfer. The amount itself never carries a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferKind {
    /// Money leaving: reduces the balance
    Expense,
    /// Money coming in: increases the balance
    Income,
}

impl TransferKind {
    /// Name as persisted and serialized. Stored by name, never by position.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferKind::Expense => "Expense",
            TransferKind::Income => "Income",
        }
    }

    /// Case-insensitive lookup by name. Only the two names are recognized.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expense" => Some(TransferKind::Expense),
            "income" => Some(TransferKind::Income),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The value fields of a transfer. They are always written together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDetails {
    /// Magnitude with two fractional digits
    pub amount: Decimal,
    /// Local wall-clock time, no timezone attached
    pub occurred_at: NaiveDateTime,
    pub note: String,
    pub kind: TransferKind,
}

/// A single income or expense record.
///
/// Values are replaced wholesale: an update builds a new `Transfer` with the same id
/// (see [`Transfer::with_id`]) instead of mutating fields in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    #[serde(rename = "value")]
    pub amount: Decimal,
    #[serde(rename = "date")]
    pub occurred_at: NaiveDateTime,
    #[serde(rename = "description")]
    pub note: String,
    #[serde(rename = "type")]
    pub kind: TransferKind,
}

impl Transfer {
    /// Create a new transfer with a freshly generated id.
    pub fn new(details: TransferDetails) -> Self {
        Self::with_id(Uuid::new_v4(), details)
    }

    pub fn with_id(id: TransferId, details: TransferDetails) -> Self {
        Self {
            id,
            amount: details.amount,
            occurred_at: details.occurred_at,
            note: details.note,
            kind: details.kind,
        }
    }

    pub fn details(&self) -> TransferDetails {
        TransferDetails {
            amount: self.amount,
            occurred_at: self.occurred_at,
            note: self.note.clone(),
            kind: self.kind,
        }
    }
}
