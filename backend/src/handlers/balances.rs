use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::parse_id,
    middleware::Actor,
    models::leave_balance::LeaveBalanceResponse,
    state::AppState,
    types::{EmployeeId, LeaveTypeId},
    validation::rules,
};

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct SetAllocationPayload {
    #[validate(range(min = 0, max = rules::MAX_ALLOCATION_DAYS))]
    pub allocated: i32,
    /// Lets approvals take `available` below zero.
    #[serde(default)]
    pub allow_negative: bool,
}

pub async fn get_employee_balances(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> Result<Json<Vec<LeaveBalanceResponse>>, AppError> {
    let employee_id: EmployeeId = parse_id("employee id", &employee_id)?;
    let balances = state.ledger.balance_summary(employee_id).await?;
    Ok(Json(balances))
}

pub async fn set_employee_allocation(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((employee_id, leave_type_id)): Path<(String, String)>,
    Json(payload): Json<SetAllocationPayload>,
) -> Result<Json<LeaveBalanceResponse>, AppError> {
    let employee_id: EmployeeId = parse_id("employee id", &employee_id)?;
    rules::validate_leave_type_code(&leave_type_id)
        .map_err(|err| AppError::Validation(vec![format!("leave_type_id: {}", err.code)]))?;
    payload.validate()?;

    let leave_type_id = LeaveTypeId::from(leave_type_id);
    let balance = state
        .ledger
        .set_allocation(
            employee_id,
            &leave_type_id,
            payload.allocated,
            payload.allow_negative,
        )
        .await?;
    tracing::info!(
        actor_id = %actor.id(),
        employee_id = %employee_id,
        leave_type_id = %leave_type_id,
        "Allocation set via API"
    );
    Ok(Json(balance))
}
