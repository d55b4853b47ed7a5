//! Wire payloads for cart submissions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The per-line projection of a cart line sent to the settlement and
/// recommendation services.
///
/// `qty` is the unit count of the line. The settlement service prices each
/// line as a single unit and may ignore it; multiplicity is applied
/// client-side when line totals are displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotItem {
    pub id: String,
    pub price: Decimal,
    pub category: String,
    pub qty: u32,
}

/// Body of a cart submission: `{"items": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSubmission {
    pub items: Vec<SnapshotItem>,
}

/// Response of the save endpoint: the storage identifier the persistence
/// collaborator assigned to this simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSimulation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub file: String,
}
