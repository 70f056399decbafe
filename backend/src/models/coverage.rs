//! Read-only calendar views: conflict levels and team coverage.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::LeaveRequestId;

/// How many teammates already have approved leave overlapping a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConflictLevel {
    None,
    Low,
    Medium,
    High,
}

impl ConflictLevel {
    pub fn from_overlap_count(count: usize) -> Self {
        match count {
            0 => ConflictLevel::None,
            1..=2 => ConflictLevel::Low,
            3..=4 => ConflictLevel::Medium,
            _ => ConflictLevel::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ConflictReport {
    #[schema(value_type = String)]
    pub request_id: LeaveRequestId,
    pub level: ConflictLevel,
    pub overlapping_count: usize,
    #[schema(value_type = Vec<String>)]
    pub overlapping_request_ids: Vec<LeaveRequestId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CoverageSnapshot {
    pub date: NaiveDate,
    pub roster_size: u32,
    pub on_leave: u32,
    pub available: u32,
    pub coverage_percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_count_buckets() {
        let levels: Vec<_> = (0..=6).map(ConflictLevel::from_overlap_count).collect();
        assert_eq!(
            levels,
            vec![
                ConflictLevel::None,
                ConflictLevel::Low,
                ConflictLevel::Low,
                ConflictLevel::Medium,
                ConflictLevel::Medium,
                ConflictLevel::High,
                ConflictLevel::High,
            ]
        );
    }
}
