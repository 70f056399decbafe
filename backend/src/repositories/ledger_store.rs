//! Storage contract consumed by the leave ledger.
//!
//! Reads go straight through [`LedgerStore`]. Anything that changes a
//! request's status together with a balance runs inside a
//! [`LedgerTransaction`] obtained from [`LedgerStore::begin`]; dropping the
//! transaction without calling `commit` discards every staged write.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::{
    error::LedgerError,
    models::{
        date_range::DateRange,
        leave_balance::LeaveBalance,
        leave_request::{LeaveRequest, StatusChange},
        leave_type::LeaveType,
        LeaveRequestFilter,
    },
    types::{EmployeeId, LeaveRequestId, LeaveTypeId, TeamId},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Opens a unit of work for a status transition and its balance effect.
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, LedgerError>;

    async fn find_balance(
        &self,
        employee_id: EmployeeId,
        leave_type_id: &LeaveTypeId,
    ) -> Result<Option<LeaveBalance>, LedgerError>;

    async fn list_balances(&self, employee_id: EmployeeId)
        -> Result<Vec<LeaveBalance>, LedgerError>;

    /// Creates or replaces the allocation of a balance, leaving `used` alone.
    async fn upsert_allocation(
        &self,
        employee_id: EmployeeId,
        leave_type_id: &LeaveTypeId,
        allocated: i32,
        allow_negative: bool,
    ) -> Result<LeaveBalance, LedgerError>;

    async fn get_request(&self, id: LeaveRequestId) -> Result<LeaveRequest, LedgerError>;

    async fn insert_request(&self, request: &LeaveRequest) -> Result<(), LedgerError>;

    async fn list_requests(
        &self,
        filter: &LeaveRequestFilter,
    ) -> Result<Vec<LeaveRequest>, LedgerError>;

    async fn list_approved_requests_overlapping(
        &self,
        team_id: TeamId,
        range: DateRange,
    ) -> Result<Vec<LeaveRequest>, LedgerError>;

    /// Sum of `days_requested` over every pending request of the employee,
    /// per leave type. Types without pending requests are absent.
    async fn pending_days_by_type(
        &self,
        employee_id: EmployeeId,
    ) -> Result<HashMap<LeaveTypeId, i32>, LedgerError>;

    async fn list_leave_types(&self) -> Result<Vec<LeaveType>, LedgerError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Reads a request and holds it against concurrent writers until the
    /// transaction ends.
    async fn lock_request(&mut self, id: LeaveRequestId) -> Result<LeaveRequest, LedgerError>;

    /// Writes `change` if the request is still in `change.from`; otherwise
    /// fails with `InvalidTransition`.
    async fn save_request_status(
        &mut self,
        change: &StatusChange,
    ) -> Result<LeaveRequest, LedgerError>;

    /// Moves `delta_days` into (positive) or out of (negative) `used`.
    async fn commit_balance_delta(
        &mut self,
        employee_id: EmployeeId,
        leave_type_id: &LeaveTypeId,
        delta_days: i32,
    ) -> Result<LeaveBalance, LedgerError>;

    async fn commit(&mut self) -> Result<(), LedgerError>;
}
