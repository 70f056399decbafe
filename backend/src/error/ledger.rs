use crate::{
    models::request_status::RequestStatus,
    types::{EmployeeId, LeaveRequestId, LeaveTypeId},
};

/// Failures raised by the leave ledger.
///
/// Every variant is recoverable by the caller. `BalanceInconsistency` is the
/// exception in spirit: it means stored state disagrees with the request
/// history and is logged as an integrity signal where it is detected.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("leave request {request_id} cannot move from {from} to {to}")]
    InvalidTransition {
        request_id: LeaveRequestId,
        from: RequestStatus,
        to: RequestStatus,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("employee {employee_id} has no balance for leave type {leave_type_id}")]
    UnknownLeaveType {
        employee_id: EmployeeId,
        leave_type_id: LeaveTypeId,
    },

    #[error("{0} must not be blank")]
    MissingReason(&'static str),

    #[error("leave request {request_id} is {status}, not approved")]
    NotApproved {
        request_id: LeaveRequestId,
        status: RequestStatus,
    },

    #[error(
        "balance for employee {employee_id} ({leave_type_id}) has {used} used days, cannot apply {delta}"
    )]
    BalanceInconsistency {
        employee_id: EmployeeId,
        leave_type_id: LeaveTypeId,
        used: i32,
        delta: i32,
    },

    #[error(
        "employee {employee_id} has {available} {leave_type_id} days available, {requested} needed"
    )]
    InsufficientBalance {
        employee_id: EmployeeId,
        leave_type_id: LeaveTypeId,
        available: i32,
        requested: i32,
    },

    #[error("{0}")]
    InvalidRequest(String),

    #[error("storage failure: {0}")]
    Storage(#[source] anyhow::Error),
}

impl LedgerError {
    /// Stable machine-readable code, surfaced to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidTransition { .. } => "INVALID_TRANSITION",
            LedgerError::NotFound(_) => "NOT_FOUND",
            LedgerError::UnknownLeaveType { .. } => "UNKNOWN_LEAVE_TYPE",
            LedgerError::MissingReason(_) => "MISSING_REASON",
            LedgerError::NotApproved { .. } => "NOT_APPROVED",
            LedgerError::BalanceInconsistency { .. } => "BALANCE_INCONSISTENCY",
            LedgerError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            LedgerError::InvalidRequest(_) => "INVALID_REQUEST",
            LedgerError::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub(crate) fn request_not_found(id: LeaveRequestId) -> Self {
        LedgerError::NotFound(format!("leave request {id}"))
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => LedgerError::NotFound("record".to_string()),
            other => LedgerError::Storage(other.into()),
        }
    }
}
