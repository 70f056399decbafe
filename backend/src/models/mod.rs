//! Data models shared across storage and API handlers.

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::LedgerError,
    models::{date_range::DateRange, request_status::RequestStatus},
    types::{EmployeeId, LeaveTypeId, TeamId},
};

pub mod coverage;
pub mod date_range;
pub mod leave_balance;
pub mod leave_request;
pub mod leave_type;
pub mod request_status;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

/// Raw query string accepted by the request listing endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct LeaveRequestListQuery {
    pub employee_id: Option<String>,
    pub team_id: Option<String>,
    pub leave_type_id: Option<String>,
    /// One of `pending`, `approved`, `rejected`, `cancelled`.
    pub status: Option<String>,
    /// Only requests ending on or after this date.
    pub from: Option<NaiveDate>,
    /// Only requests starting on or before this date.
    pub to: Option<NaiveDate>,
    /// Maximum number of records to return (default: 50, max: 500).
    pub limit: Option<i64>,
    /// Number of records to skip (default: 0).
    pub offset: Option<i64>,
}

/// Typed listing filter; every recognised field is explicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveRequestFilter {
    pub employee_id: Option<EmployeeId>,
    pub team_id: Option<TeamId>,
    pub leave_type_id: Option<LeaveTypeId>,
    pub status: Option<RequestStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for LeaveRequestFilter {
    fn default() -> Self {
        Self {
            employee_id: None,
            team_id: None,
            leave_type_id: None,
            status: None,
            from: None,
            to: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl LeaveRequestFilter {
    pub fn for_employee(employee_id: EmployeeId) -> Self {
        Self {
            employee_id: Some(employee_id),
            limit: MAX_LIMIT,
            ..Self::default()
        }
    }

    /// Whether `request` passes every set field, ignoring pagination.
    pub fn matches(&self, request: &leave_request::LeaveRequest) -> bool {
        self.employee_id.map_or(true, |id| request.employee_id == id)
            && self.team_id.map_or(true, |id| request.team_id == id)
            && self
                .leave_type_id
                .as_ref()
                .map_or(true, |id| &request.leave_type_id == id)
            && self.status.map_or(true, |status| request.status == status)
            && self.from.map_or(true, |from| request.end_date >= from)
            && self.to.map_or(true, |to| request.start_date <= to)
    }
}

impl TryFrom<LeaveRequestListQuery> for LeaveRequestFilter {
    type Error = LedgerError;

    fn try_from(query: LeaveRequestListQuery) -> Result<Self, Self::Error> {
        fn parse_id<T: std::str::FromStr>(
            field: &str,
            raw: Option<String>,
        ) -> Result<Option<T>, LedgerError> {
            raw.filter(|value| !value.trim().is_empty())
                .map(|value| {
                    value.trim().parse::<T>().map_err(|_| {
                        LedgerError::InvalidRequest(format!("{field} is not a valid id: {value}"))
                    })
                })
                .transpose()
        }

        if let (Some(from), Some(to)) = (query.from, query.to) {
            DateRange::new(from, to)?;
        }

        let status = query
            .status
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.parse::<RequestStatus>())
            .transpose()
            .map_err(LedgerError::InvalidRequest)?;

        Ok(Self {
            employee_id: parse_id("employee_id", query.employee_id)?,
            team_id: parse_id("team_id", query.team_id)?,
            leave_type_id: query
                .leave_type_id
                .filter(|value| !value.trim().is_empty())
                .map(LeaveTypeId::from),
            status,
            from: query.from,
            to: query.to,
            limit: query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: query.offset.unwrap_or(0).max(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_parses_into_typed_filter() {
        let team = TeamId::new();
        let filter = LeaveRequestFilter::try_from(LeaveRequestListQuery {
            team_id: Some(team.to_string()),
            status: Some("Pending".into()),
            limit: Some(10_000),
            offset: Some(-4),
            ..Default::default()
        })
        .expect("valid query");
        assert_eq!(filter.team_id, Some(team));
        assert_eq!(filter.status, Some(RequestStatus::Pending));
        assert_eq!(filter.limit, 500);
        assert_eq!(filter.offset, 0);
    }

    #[test]
    fn unknown_status_and_bad_ids_are_rejected() {
        let bad_status = LeaveRequestFilter::try_from(LeaveRequestListQuery {
            status: Some("archived".into()),
            ..Default::default()
        });
        assert!(matches!(bad_status, Err(LedgerError::InvalidRequest(_))));

        let bad_id = LeaveRequestFilter::try_from(LeaveRequestListQuery {
            employee_id: Some("42".into()),
            ..Default::default()
        });
        assert!(matches!(bad_id, Err(LedgerError::InvalidRequest(_))));
    }

    #[test]
    fn blank_fields_are_ignored() {
        let filter = LeaveRequestFilter::try_from(LeaveRequestListQuery {
            status: Some("  ".into()),
            leave_type_id: Some(String::new()),
            ..Default::default()
        })
        .expect("valid query");
        assert_eq!(filter, LeaveRequestFilter::default());
    }
}
