use axum::{extract::State, Json};

use crate::{error::AppError, models::leave_type::LeaveType, state::AppState};

pub async fn list_leave_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaveType>>, AppError> {
    Ok(Json(state.ledger.list_leave_types().await?))
}
