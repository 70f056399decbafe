use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::LedgerError,
    models::{date_range::DateRange, request_status::RequestStatus},
    types::{EmployeeId, LeaveRequestId, LeaveTypeId, TeamId, UserId},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LeaveRequest {
    pub id: LeaveRequestId,
    pub employee_id: EmployeeId,
    pub team_id: TeamId,
    pub leave_type_id: LeaveTypeId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_requested: i32,
    pub reason: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub decided_by: Option<UserId>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_comment: Option<String>,
    pub cancelled_by: Option<UserId>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submission payload. Dates and balance checks happen in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateLeaveRequest {
    #[schema(value_type = String)]
    pub employee_id: EmployeeId,
    #[schema(value_type = String)]
    pub team_id: TeamId,
    #[schema(value_type = String, example = "annual")]
    pub leave_type_id: LeaveTypeId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

/// A single status write, applied as compare-and-set on `from`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub request_id: LeaveRequestId,
    pub from: RequestStatus,
    pub to: RequestStatus,
    pub actor_id: UserId,
    pub comment: Option<String>,
    pub at: DateTime<Utc>,
}

impl StatusChange {
    pub fn new(
        request: &LeaveRequest,
        to: RequestStatus,
        actor_id: UserId,
        comment: Option<String>,
    ) -> Self {
        Self {
            request_id: request.id,
            from: request.status,
            to,
            actor_id,
            comment,
            at: Utc::now(),
        }
    }
}

impl LeaveRequest {
    pub fn new(payload: CreateLeaveRequest, days_requested: i32) -> Self {
        let now = Utc::now();
        Self {
            id: LeaveRequestId::new(),
            employee_id: payload.employee_id,
            team_id: payload.team_id,
            leave_type_id: payload.leave_type_id,
            start_date: payload.start_date,
            end_date: payload.end_date,
            days_requested,
            reason: payload.reason,
            status: RequestStatus::Pending,
            decided_by: None,
            decided_at: None,
            decision_comment: None,
            cancelled_by: None,
            cancelled_at: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn date_range(&self) -> DateRange {
        // Constructed from validated dates; fall back to a one-day range
        // rather than panic on a corrupted row.
        DateRange::new(self.start_date, self.end_date)
            .unwrap_or_else(|_| DateRange::single(self.start_date))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, RequestStatus::Pending)
    }

    pub fn is_approved(&self) -> bool {
        matches!(self.status, RequestStatus::Approved)
    }

    /// Applies `change` if the request is still in `change.from` and the
    /// transition table allows it.
    pub fn apply_status_change(&mut self, change: &StatusChange) -> Result<(), LedgerError> {
        if self.status != change.from || !self.status.can_transition_to(change.to) {
            return Err(LedgerError::InvalidTransition {
                request_id: self.id,
                from: self.status,
                to: change.to,
            });
        }

        self.status = change.to;
        self.updated_at = change.at;
        match change.to {
            RequestStatus::Approved | RequestStatus::Rejected => {
                self.decided_by = Some(change.actor_id);
                self.decided_at = Some(change.at);
                self.decision_comment = change.comment.clone();
            }
            RequestStatus::Cancelled => {
                self.cancelled_by = Some(change.actor_id);
                self.cancelled_at = Some(change.at);
                self.cancellation_reason = change.comment.clone();
            }
            RequestStatus::Pending => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequestResponse {
    #[schema(value_type = String)]
    pub id: LeaveRequestId,
    #[schema(value_type = String)]
    pub employee_id: EmployeeId,
    #[schema(value_type = String)]
    pub team_id: TeamId,
    #[schema(value_type = String, example = "annual")]
    pub leave_type_id: LeaveTypeId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_requested: i32,
    pub reason: Option<String>,
    pub status: RequestStatus,
    #[schema(value_type = Option<String>)]
    pub decided_by: Option<UserId>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_comment: Option<String>,
    #[schema(value_type = Option<String>)]
    pub cancelled_by: Option<UserId>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LeaveRequest> for LeaveRequestResponse {
    fn from(request: LeaveRequest) -> Self {
        LeaveRequestResponse {
            id: request.id,
            employee_id: request.employee_id,
            team_id: request.team_id,
            leave_type_id: request.leave_type_id,
            start_date: request.start_date,
            end_date: request.end_date,
            days_requested: request.days_requested,
            reason: request.reason,
            status: request.status,
            decided_by: request.decided_by,
            decided_at: request.decided_at,
            decision_comment: request.decision_comment,
            cancelled_by: request.cancelled_by,
            cancelled_at: request.cancelled_at,
            cancellation_reason: request.cancellation_reason,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_request() -> LeaveRequest {
        LeaveRequest::new(
            CreateLeaveRequest {
                employee_id: EmployeeId::new(),
                team_id: TeamId::new(),
                leave_type_id: "annual".into(),
                start_date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 7, 3).unwrap(),
                reason: Some("Summer".into()),
            },
            3,
        )
    }

    #[test]
    fn approval_records_decider_and_comment() {
        let mut request = pending_request();
        let actor = UserId::new();
        let change = StatusChange::new(
            &request,
            RequestStatus::Approved,
            actor,
            Some("enjoy".into()),
        );
        request.apply_status_change(&change).expect("approve");
        assert!(request.is_approved());
        assert_eq!(request.decided_by, Some(actor));
        assert_eq!(request.decision_comment.as_deref(), Some("enjoy"));
        assert!(request.cancelled_at.is_none());
    }

    #[test]
    fn stale_change_is_rejected_as_invalid_transition() {
        let mut request = pending_request();
        let actor = UserId::new();
        let approve = StatusChange::new(&request, RequestStatus::Approved, actor, None);
        let reject = StatusChange::new(
            &request,
            RequestStatus::Rejected,
            actor,
            Some("no".into()),
        );
        request.apply_status_change(&approve).expect("first wins");
        let err = request.apply_status_change(&reject).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidTransition {
                from: RequestStatus::Approved,
                to: RequestStatus::Rejected,
                ..
            }
        ));
        assert!(request.is_approved());
    }

    #[test]
    fn cancellation_records_reason_separately_from_decision() {
        let mut request = pending_request();
        let actor = UserId::new();
        let approve = StatusChange::new(&request, RequestStatus::Approved, actor, Some("ok".into()));
        request.apply_status_change(&approve).unwrap();
        let cancel = StatusChange::new(
            &request,
            RequestStatus::Cancelled,
            actor,
            Some("plans changed".into()),
        );
        request.apply_status_change(&cancel).unwrap();
        assert_eq!(request.status, RequestStatus::Cancelled);
        assert_eq!(request.decision_comment.as_deref(), Some("ok"));
        assert_eq!(request.cancellation_reason.as_deref(), Some("plans changed"));
    }

    #[test]
    fn leave_request_response_serializes_status_snake_case() {
        let value = serde_json::to_value(LeaveRequestResponse::from(pending_request())).unwrap();
        assert_eq!(value["status"], "pending");
        assert_eq!(value["leave_type_id"], "annual");
        assert_eq!(value["days_requested"], 3);
    }
}
