//! SQL for the `leave_requests` table.
//!
//! Functions take any Postgres executor so the same statements run against
//! the pool or inside a ledger transaction.

use sqlx::{PgExecutor, Postgres, QueryBuilder};

use crate::{
    models::{
        date_range::DateRange, leave_request::LeaveRequest, request_status::RequestStatus,
        LeaveRequestFilter,
    },
    types::{EmployeeId, LeaveRequestId, LeaveTypeId, TeamId},
};

const TABLE: &str = "leave_requests";
const COLUMNS: &str = "id, employee_id, team_id, leave_type_id, start_date, end_date, \
     days_requested, reason, status, decided_by, decided_at, decision_comment, \
     cancelled_by, cancelled_at, cancellation_reason, created_at, updated_at";

pub async fn fetch_leave_request<'e, E: PgExecutor<'e>>(
    executor: E,
    id: LeaveRequestId,
) -> Result<Option<LeaveRequest>, sqlx::Error> {
    let query = format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1");
    sqlx::query_as::<_, LeaveRequest>(&query)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Same as [`fetch_leave_request`] but row-locks until the transaction ends.
pub async fn fetch_leave_request_for_update<'e, E: PgExecutor<'e>>(
    executor: E,
    id: LeaveRequestId,
) -> Result<Option<LeaveRequest>, sqlx::Error> {
    let query = format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, LeaveRequest>(&query)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Pending days per leave type for one employee, over all pending rows.
pub async fn sum_pending_days<'e, E: PgExecutor<'e>>(
    executor: E,
    employee_id: EmployeeId,
) -> Result<Vec<(LeaveTypeId, i64)>, sqlx::Error> {
    let query = format!(
        "SELECT leave_type_id, COALESCE(SUM(days_requested), 0)::BIGINT FROM {TABLE} \
         WHERE employee_id = $1 AND status = $2 GROUP BY leave_type_id"
    );
    sqlx::query_as::<_, (LeaveTypeId, i64)>(&query)
        .bind(employee_id)
        .bind(RequestStatus::Pending.db_value())
        .fetch_all(executor)
        .await
}

pub async fn insert_leave_request<'e, E: PgExecutor<'e>>(
    executor: E,
    request: &LeaveRequest,
) -> Result<(), sqlx::Error> {
    let query = format!(
        "INSERT INTO {TABLE} ({COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)"
    );
    sqlx::query(&query)
        .bind(request.id)
        .bind(request.employee_id)
        .bind(request.team_id)
        .bind(&request.leave_type_id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.days_requested)
        .bind(&request.reason)
        .bind(request.status.db_value())
        .bind(request.decided_by)
        .bind(request.decided_at)
        .bind(&request.decision_comment)
        .bind(request.cancelled_by)
        .bind(request.cancelled_at)
        .bind(&request.cancellation_reason)
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(executor)
        .await
        .map(|_| ())
}

/// Persists the status columns of `request`, guarded by `expected` so a
/// concurrent writer cannot be overwritten. Returns `None` when the guard
/// did not match.
pub async fn update_request_status<'e, E: PgExecutor<'e>>(
    executor: E,
    request: &LeaveRequest,
    expected: RequestStatus,
) -> Result<Option<LeaveRequest>, sqlx::Error> {
    let query = format!(
        "UPDATE {TABLE} SET status = $2, decided_by = $3, decided_at = $4, decision_comment = $5, \
         cancelled_by = $6, cancelled_at = $7, cancellation_reason = $8, updated_at = $9 \
         WHERE id = $1 AND status = $10 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, LeaveRequest>(&query)
        .bind(request.id)
        .bind(request.status.db_value())
        .bind(request.decided_by)
        .bind(request.decided_at)
        .bind(&request.decision_comment)
        .bind(request.cancelled_by)
        .bind(request.cancelled_at)
        .bind(&request.cancellation_reason)
        .bind(request.updated_at)
        .bind(expected.db_value())
        .fetch_optional(executor)
        .await
}

pub async fn list_leave_requests<'e, E: PgExecutor<'e>>(
    executor: E,
    filter: &LeaveRequestFilter,
) -> Result<Vec<LeaveRequest>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM {TABLE}"));
    apply_request_filters(&mut builder, filter);
    builder
        .push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(filter.limit)
        .push(" OFFSET ")
        .push_bind(filter.offset);
    builder
        .build_query_as::<LeaveRequest>()
        .fetch_all(executor)
        .await
}

pub async fn list_approved_overlapping<'e, E: PgExecutor<'e>>(
    executor: E,
    team_id: TeamId,
    range: DateRange,
) -> Result<Vec<LeaveRequest>, sqlx::Error> {
    let query = format!(
        "SELECT {COLUMNS} FROM {TABLE} \
         WHERE team_id = $1 AND status = $2 AND start_date <= $3 AND end_date >= $4 \
         ORDER BY start_date"
    );
    sqlx::query_as::<_, LeaveRequest>(&query)
        .bind(team_id)
        .bind(RequestStatus::Approved.db_value())
        .bind(range.end())
        .bind(range.start())
        .fetch_all(executor)
        .await
}

fn apply_request_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &LeaveRequestFilter) {
    let mut has_clause = false;
    if let Some(employee_id) = filter.employee_id {
        push_clause(builder, &mut has_clause);
        builder.push("employee_id = ").push_bind(employee_id);
    }
    if let Some(team_id) = filter.team_id {
        push_clause(builder, &mut has_clause);
        builder.push("team_id = ").push_bind(team_id);
    }
    if let Some(leave_type_id) = &filter.leave_type_id {
        push_clause(builder, &mut has_clause);
        builder.push("leave_type_id = ").push_bind(leave_type_id.clone());
    }
    if let Some(status) = filter.status {
        push_clause(builder, &mut has_clause);
        builder.push("status = ").push_bind(status.db_value());
    }
    if let Some(from) = filter.from {
        push_clause(builder, &mut has_clause);
        builder.push("end_date >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        push_clause(builder, &mut has_clause);
        builder.push("start_date <= ").push_bind(to);
    }
}

fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, has_clause: &mut bool) {
    if *has_clause {
        builder.push(" AND ");
    } else {
        builder.push(" WHERE ");
        *has_clause = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EmployeeId;

    #[test]
    fn filters_render_in_declared_order() {
        let filter = LeaveRequestFilter {
            employee_id: Some(EmployeeId::new()),
            status: Some(RequestStatus::Pending),
            ..LeaveRequestFilter::default()
        };
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT 1 FROM t");
        apply_request_filters(&mut builder, &filter);
        assert_eq!(
            builder.sql(),
            "SELECT 1 FROM t WHERE employee_id = $1 AND status = $2"
        );
    }

    #[test]
    fn empty_filter_adds_no_where_clause() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT 1 FROM t");
        apply_request_filters(&mut builder, &LeaveRequestFilter::default());
        assert_eq!(builder.sql(), "SELECT 1 FROM t");
    }
}
