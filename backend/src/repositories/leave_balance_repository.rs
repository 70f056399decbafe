use sqlx::PgExecutor;

use crate::{
    models::{leave_balance::LeaveBalance, leave_type::LeaveType},
    types::{EmployeeId, LeaveTypeId},
};

const BALANCE_COLUMNS: &str =
    "employee_id, leave_type_id, allocated, used, allow_negative, updated_at";

pub async fn fetch_balance<'e, E: PgExecutor<'e>>(
    executor: E,
    employee_id: EmployeeId,
    leave_type_id: &LeaveTypeId,
) -> Result<Option<LeaveBalance>, sqlx::Error> {
    let query = format!(
        "SELECT {BALANCE_COLUMNS} FROM leave_balances WHERE employee_id = $1 AND leave_type_id = $2"
    );
    sqlx::query_as::<_, LeaveBalance>(&query)
        .bind(employee_id)
        .bind(leave_type_id)
        .fetch_optional(executor)
        .await
}

pub async fn fetch_balance_for_update<'e, E: PgExecutor<'e>>(
    executor: E,
    employee_id: EmployeeId,
    leave_type_id: &LeaveTypeId,
) -> Result<Option<LeaveBalance>, sqlx::Error> {
    let query = format!(
        "SELECT {BALANCE_COLUMNS} FROM leave_balances \
         WHERE employee_id = $1 AND leave_type_id = $2 FOR UPDATE"
    );
    sqlx::query_as::<_, LeaveBalance>(&query)
        .bind(employee_id)
        .bind(leave_type_id)
        .fetch_optional(executor)
        .await
}

pub async fn list_balances<'e, E: PgExecutor<'e>>(
    executor: E,
    employee_id: EmployeeId,
) -> Result<Vec<LeaveBalance>, sqlx::Error> {
    let query = format!(
        "SELECT {BALANCE_COLUMNS} FROM leave_balances WHERE employee_id = $1 ORDER BY leave_type_id"
    );
    sqlx::query_as::<_, LeaveBalance>(&query)
        .bind(employee_id)
        .fetch_all(executor)
        .await
}

/// Writes every column of `balance`, inserting the row when it is missing.
pub async fn upsert_balance<'e, E: PgExecutor<'e>>(
    executor: E,
    balance: &LeaveBalance,
) -> Result<LeaveBalance, sqlx::Error> {
    let query = format!(
        "INSERT INTO leave_balances ({BALANCE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (employee_id, leave_type_id) DO UPDATE SET \
         allocated = EXCLUDED.allocated, used = EXCLUDED.used, \
         allow_negative = EXCLUDED.allow_negative, updated_at = EXCLUDED.updated_at \
         RETURNING {BALANCE_COLUMNS}"
    );
    sqlx::query_as::<_, LeaveBalance>(&query)
        .bind(balance.employee_id)
        .bind(&balance.leave_type_id)
        .bind(balance.allocated)
        .bind(balance.used)
        .bind(balance.allow_negative)
        .bind(balance.updated_at)
        .fetch_one(executor)
        .await
}

pub async fn list_leave_types<'e, E: PgExecutor<'e>>(
    executor: E,
) -> Result<Vec<LeaveType>, sqlx::Error> {
    sqlx::query_as::<_, LeaveType>(
        "SELECT id, name, accrual_policy, color FROM leave_types ORDER BY id",
    )
    .fetch_all(executor)
    .await
}

pub async fn leave_type_exists<'e, E: PgExecutor<'e>>(
    executor: E,
    leave_type_id: &LeaveTypeId,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM leave_types WHERE id = $1)")
        .bind(leave_type_id)
        .fetch_one(executor)
        .await
}
