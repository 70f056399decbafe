use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::LedgerError,
    models::{
        date_range::DateRange, leave_balance::LeaveBalance, leave_request::LeaveRequest,
        leave_type::LeaveType, LeaveRequestFilter,
    },
    repositories::{
        leave_balance_repository, leave_request_repository,
        ledger_store::{LedgerStore, LedgerTransaction},
        transaction::PgLedgerTransaction,
    },
    types::{EmployeeId, LeaveRequestId, LeaveTypeId, TeamId},
};

/// [`LedgerStore`] over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, LedgerError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgLedgerTransaction::new(tx)))
    }

    async fn find_balance(
        &self,
        employee_id: EmployeeId,
        leave_type_id: &LeaveTypeId,
    ) -> Result<Option<LeaveBalance>, LedgerError> {
        Ok(leave_balance_repository::fetch_balance(&self.pool, employee_id, leave_type_id).await?)
    }

    async fn list_balances(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<LeaveBalance>, LedgerError> {
        Ok(leave_balance_repository::list_balances(&self.pool, employee_id).await?)
    }

    async fn upsert_allocation(
        &self,
        employee_id: EmployeeId,
        leave_type_id: &LeaveTypeId,
        allocated: i32,
        allow_negative: bool,
    ) -> Result<LeaveBalance, LedgerError> {
        let mut tx = self.pool.begin().await?;
        if !leave_balance_repository::leave_type_exists(&mut *tx, leave_type_id).await? {
            return Err(LedgerError::UnknownLeaveType {
                employee_id,
                leave_type_id: leave_type_id.clone(),
            });
        }
        let current =
            leave_balance_repository::fetch_balance_for_update(&mut *tx, employee_id, leave_type_id)
                .await?
                .unwrap_or_else(|| LeaveBalance::new(employee_id, leave_type_id.clone(), 0));
        let next = current.with_allocation(allocated, allow_negative)?;
        let saved = leave_balance_repository::upsert_balance(&mut *tx, &next).await?;
        tx.commit().await?;
        Ok(saved)
    }

    async fn get_request(&self, id: LeaveRequestId) -> Result<LeaveRequest, LedgerError> {
        leave_request_repository::fetch_leave_request(&self.pool, id)
            .await?
            .ok_or_else(|| LedgerError::request_not_found(id))
    }

    async fn insert_request(&self, request: &LeaveRequest) -> Result<(), LedgerError> {
        Ok(leave_request_repository::insert_leave_request(&self.pool, request).await?)
    }

    async fn list_requests(
        &self,
        filter: &LeaveRequestFilter,
    ) -> Result<Vec<LeaveRequest>, LedgerError> {
        Ok(leave_request_repository::list_leave_requests(&self.pool, filter).await?)
    }

    async fn list_approved_requests_overlapping(
        &self,
        team_id: TeamId,
        range: DateRange,
    ) -> Result<Vec<LeaveRequest>, LedgerError> {
        Ok(leave_request_repository::list_approved_overlapping(&self.pool, team_id, range).await?)
    }

    async fn pending_days_by_type(
        &self,
        employee_id: EmployeeId,
    ) -> Result<HashMap<LeaveTypeId, i32>, LedgerError> {
        let rows = leave_request_repository::sum_pending_days(&self.pool, employee_id).await?;
        Ok(rows
            .into_iter()
            .map(|(leave_type_id, days)| {
                (leave_type_id, i32::try_from(days).unwrap_or(i32::MAX))
            })
            .collect())
    }

    async fn list_leave_types(&self) -> Result<Vec<LeaveType>, LedgerError> {
        Ok(leave_balance_repository::list_leave_types(&self.pool).await?)
    }
}
