//! PostgreSQL unit of work backing [`LedgerTransaction`].

use async_trait::async_trait;
use sqlx::{postgres::PgTransaction, PgConnection};

use crate::{
    error::LedgerError,
    models::{
        leave_balance::LeaveBalance,
        leave_request::{LeaveRequest, StatusChange},
    },
    repositories::{
        leave_balance_repository, leave_request_repository, ledger_store::LedgerTransaction,
    },
    types::{EmployeeId, LeaveRequestId, LeaveTypeId},
};

/// Wraps a `sqlx` transaction. Rows read through it are locked `FOR UPDATE`;
/// dropping it before [`LedgerTransaction::commit`] rolls everything back.
pub struct PgLedgerTransaction {
    tx: Option<PgTransaction<'static>>,
}

impl PgLedgerTransaction {
    pub fn new(tx: PgTransaction<'static>) -> Self {
        Self { tx: Some(tx) }
    }

    fn connection(&mut self) -> Result<&mut PgConnection, LedgerError> {
        match self.tx.as_mut() {
            Some(tx) => Ok(&mut **tx),
            None => Err(LedgerError::Storage(anyhow::anyhow!(
                "transaction already finished"
            ))),
        }
    }
}

#[async_trait]
impl LedgerTransaction for PgLedgerTransaction {
    async fn lock_request(&mut self, id: LeaveRequestId) -> Result<LeaveRequest, LedgerError> {
        let conn = self.connection()?;
        leave_request_repository::fetch_leave_request_for_update(conn, id)
            .await?
            .ok_or_else(|| LedgerError::request_not_found(id))
    }

    async fn save_request_status(
        &mut self,
        change: &StatusChange,
    ) -> Result<LeaveRequest, LedgerError> {
        let mut request = self.lock_request(change.request_id).await?;
        request.apply_status_change(change)?;

        let conn = self.connection()?;
        leave_request_repository::update_request_status(conn, &request, change.from)
            .await?
            .ok_or(LedgerError::InvalidTransition {
                request_id: change.request_id,
                from: change.from,
                to: change.to,
            })
    }

    async fn commit_balance_delta(
        &mut self,
        employee_id: EmployeeId,
        leave_type_id: &LeaveTypeId,
        delta_days: i32,
    ) -> Result<LeaveBalance, LedgerError> {
        let conn = self.connection()?;
        let current =
            leave_balance_repository::fetch_balance_for_update(&mut *conn, employee_id, leave_type_id)
                .await?
                .ok_or_else(|| LedgerError::UnknownLeaveType {
                    employee_id,
                    leave_type_id: leave_type_id.clone(),
                })?;
        let next = current.apply_delta(delta_days)?;
        Ok(leave_balance_repository::upsert_balance(conn, &next).await?)
    }

    async fn commit(&mut self) -> Result<(), LedgerError> {
        match self.tx.take() {
            Some(tx) => Ok(tx.commit().await?),
            None => Err(LedgerError::Storage(anyhow::anyhow!(
                "transaction already finished"
            ))),
        }
    }
}
