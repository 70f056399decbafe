use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, LedgerError},
    handlers::parse_id,
    middleware::Actor,
    models::{
        coverage::ConflictReport,
        leave_request::{CreateLeaveRequest, LeaveRequestResponse},
        request_status::RequestStatus,
        LeaveRequestFilter, LeaveRequestListQuery,
    },
    services::BulkItemOutcome,
    state::AppState,
    types::LeaveRequestId,
    validation::rules,
};

/// Optional comment attached to an approval or rejection.
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct DecisionPayload {
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct CancelPayload {
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct TransitionPayload {
    /// Target status: `approved`, `rejected` or `cancelled`.
    #[validate(custom(function = "rules::validate_request_status"))]
    pub status: String,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct BulkDecisionPayload {
    pub request_ids: Vec<String>,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaveRequestListResponse {
    pub items: Vec<LeaveRequestResponse>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CancellationResponse {
    pub request: LeaveRequestResponse,
    pub restored_days: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkItemError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkItemResponse {
    pub request_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<LeaveRequestResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BulkItemError>,
}

impl From<BulkItemOutcome> for BulkItemResponse {
    fn from(outcome: BulkItemOutcome) -> Self {
        let request_id = outcome.request_id.to_string();
        match outcome.result {
            Ok(request) => BulkItemResponse {
                request_id,
                success: true,
                request: Some(request.into()),
                error: None,
            },
            Err(err) => BulkItemResponse {
                request_id,
                success: false,
                request: None,
                error: Some(BulkItemError {
                    code: err.code().to_string(),
                    message: client_message(&err),
                }),
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkDecisionResponse {
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BulkItemResponse>,
}

impl From<Vec<BulkItemOutcome>> for BulkDecisionResponse {
    fn from(outcomes: Vec<BulkItemOutcome>) -> Self {
        let results: Vec<BulkItemResponse> = outcomes.into_iter().map(Into::into).collect();
        let succeeded = results.iter().filter(|item| item.success).count();
        BulkDecisionResponse {
            failed: results.len() - succeeded,
            succeeded,
            results,
        }
    }
}

fn client_message(err: &LedgerError) -> String {
    if crate::error::ledger_status(err).is_server_error() {
        tracing::error!(error = ?err, code = err.code(), "Bulk item failed");
        "Internal server error".to_string()
    } else {
        err.to_string()
    }
}

pub async fn submit_leave_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateLeaveRequest>,
) -> Result<(StatusCode, Json<LeaveRequestResponse>), AppError> {
    payload.validate()?;
    let request = state.ledger.submit(payload).await?;
    tracing::debug!(request_id = %request.id, actor_id = %actor.id(), "Submitted via API");
    Ok((StatusCode::CREATED, Json(request.into())))
}

pub async fn list_leave_requests(
    State(state): State<AppState>,
    Query(query): Query<LeaveRequestListQuery>,
) -> Result<Json<LeaveRequestListResponse>, AppError> {
    let filter = LeaveRequestFilter::try_from(query)?;
    let items = state.ledger.list_requests(&filter).await?;
    Ok(Json(LeaveRequestListResponse {
        items: items.into_iter().map(Into::into).collect(),
        limit: filter.limit,
        offset: filter.offset,
    }))
}

pub async fn get_leave_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    let id: LeaveRequestId = parse_id("leave request id", &id)?;
    let request = state.ledger.get_request(id).await?;
    Ok(Json(request.into()))
}

pub async fn approve_leave_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    payload: Option<Json<DecisionPayload>>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    let id: LeaveRequestId = parse_id("leave request id", &id)?;
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    payload.validate()?;
    let request = state
        .ledger
        .approve_one(id, actor.id(), payload.comment)
        .await?;
    Ok(Json(request.into()))
}

pub async fn reject_leave_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    payload: Option<Json<DecisionPayload>>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    let id: LeaveRequestId = parse_id("leave request id", &id)?;
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    payload.validate()?;
    let request = state
        .ledger
        .reject_one(id, actor.id(), payload.comment)
        .await?;
    Ok(Json(request.into()))
}

pub async fn cancel_leave_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    payload: Option<Json<CancelPayload>>,
) -> Result<Json<CancellationResponse>, AppError> {
    let id: LeaveRequestId = parse_id("leave request id", &id)?;
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    payload.validate()?;
    let outcome = state
        .ledger
        .cancel_approved(id, actor.id(), payload.reason)
        .await?;
    Ok(Json(CancellationResponse {
        request: outcome.request.into(),
        restored_days: outcome.restored_days,
    }))
}

pub async fn transition_leave_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(payload): Json<TransitionPayload>,
) -> Result<Json<LeaveRequestResponse>, AppError> {
    let id: LeaveRequestId = parse_id("leave request id", &id)?;
    payload.validate()?;
    let target: RequestStatus = payload.status.parse().map_err(AppError::BadRequest)?;
    let request = state
        .ledger
        .transition(id, target, actor.id(), payload.comment)
        .await?;
    Ok(Json(request.into()))
}

pub async fn bulk_approve(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<BulkDecisionPayload>,
) -> Result<Json<BulkDecisionResponse>, AppError> {
    payload.validate()?;
    let ids = parse_request_ids(&payload.request_ids)?;
    let outcomes = state
        .ledger
        .approve_many(ids, actor.id(), payload.comment)
        .await?;
    Ok(Json(outcomes.into()))
}

pub async fn bulk_reject(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<BulkDecisionPayload>,
) -> Result<Json<BulkDecisionResponse>, AppError> {
    payload.validate()?;
    let ids = parse_request_ids(&payload.request_ids)?;
    let outcomes = state
        .ledger
        .reject_many(ids, actor.id(), payload.comment)
        .await?;
    Ok(Json(outcomes.into()))
}

pub async fn get_leave_request_conflicts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConflictReport>, AppError> {
    let id: LeaveRequestId = parse_id("leave request id", &id)?;
    let report = state.ledger.conflicts_for(id).await?;
    Ok(Json(report))
}

fn parse_request_ids(raw: &[String]) -> Result<Vec<LeaveRequestId>, AppError> {
    raw.iter()
        .map(|id| parse_id("leave request id", id))
        .collect()
}
