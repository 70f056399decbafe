use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::LeaveTypeId;

/// Immutable reference data describing a kind of leave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaveType {
    #[schema(value_type = String, example = "annual")]
    pub id: LeaveTypeId,
    pub name: String,
    /// Accrual rules are owned by another system; kept as an opaque label.
    pub accrual_policy: Option<String>,
    #[schema(example = "#4caf50")]
    pub color: String,
}

impl LeaveType {
    pub fn new(id: impl Into<LeaveTypeId>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            accrual_policy: None,
            color: color.into(),
        }
    }
}

/// Leave types every fresh ledger starts with; mirrors the seed migration.
pub fn default_leave_types() -> Vec<LeaveType> {
    vec![
        LeaveType {
            accrual_policy: Some("annual".to_string()),
            ..LeaveType::new("annual", "Annual leave", "#4caf50")
        },
        LeaveType::new("sick", "Sick leave", "#f44336"),
        LeaveType::new("personal", "Personal leave", "#2196f3"),
        LeaveType::new("unpaid", "Unpaid leave", "#9e9e9e"),
    ]
}
