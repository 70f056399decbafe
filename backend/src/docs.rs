#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    error::ErrorResponse,
    handlers::{
        balances::SetAllocationPayload,
        coverage::{CoverageQuery, CoverageResponse},
        health::HealthResponse,
        leave_requests::{
            BulkDecisionPayload, BulkDecisionResponse, BulkItemError, BulkItemResponse,
            CancelPayload, CancellationResponse, DecisionPayload, LeaveRequestListResponse,
            TransitionPayload,
        },
    },
    models::{
        coverage::{ConflictLevel, ConflictReport, CoverageSnapshot},
        leave_balance::LeaveBalanceResponse,
        leave_request::{CreateLeaveRequest, LeaveRequestResponse},
        leave_type::LeaveType,
        request_status::RequestStatus,
        LeaveRequestListQuery,
    },
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_doc,
        submit_leave_request_doc,
        list_leave_requests_doc,
        get_leave_request_doc,
        approve_leave_request_doc,
        reject_leave_request_doc,
        cancel_leave_request_doc,
        transition_leave_request_doc,
        bulk_approve_doc,
        bulk_reject_doc,
        leave_request_conflicts_doc,
        team_coverage_doc,
        employee_balances_doc,
        set_allocation_doc,
        list_leave_types_doc
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            // requests
            CreateLeaveRequest,
            LeaveRequestResponse,
            LeaveRequestListResponse,
            RequestStatus,
            DecisionPayload,
            CancelPayload,
            CancellationResponse,
            TransitionPayload,
            BulkDecisionPayload,
            BulkDecisionResponse,
            BulkItemResponse,
            BulkItemError,
            // calendar
            ConflictLevel,
            ConflictReport,
            CoverageSnapshot,
            CoverageResponse,
            // balances
            LeaveBalanceResponse,
            SetAllocationPayload,
            LeaveType
        )
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Requests", description = "Leave request lifecycle"),
        (name = "Calendar", description = "Conflicts and team coverage"),
        (name = "Balances", description = "Leave balances and allocations"),
        (name = "System", description = "Service health")
    ),
    security(("ActorId" = []))
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "ActorId",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-actor-id"))),
        );
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, body = HealthResponse)),
    tag = "System",
    security(())
)]
fn health_doc() {}

#[utoipa::path(
    post,
    path = "/api/leave-requests",
    request_body = CreateLeaveRequest,
    responses(
        (status = 201, description = "Request recorded as pending", body = LeaveRequestResponse),
        (status = 400, description = "Invalid dates or unknown leave type", body = ErrorResponse),
        (status = 401, description = "Missing actor", body = ErrorResponse)
    ),
    tag = "Requests"
)]
fn submit_leave_request_doc() {}

#[utoipa::path(
    get,
    path = "/api/leave-requests",
    params(LeaveRequestListQuery),
    responses(
        (status = 200, body = LeaveRequestListResponse),
        (status = 400, description = "Malformed filter", body = ErrorResponse)
    ),
    tag = "Requests"
)]
fn list_leave_requests_doc() {}

#[utoipa::path(
    get,
    path = "/api/leave-requests/{id}",
    params(("id" = String, Path, description = "Leave request id")),
    responses(
        (status = 200, body = LeaveRequestResponse),
        (status = 404, body = ErrorResponse)
    ),
    tag = "Requests"
)]
fn get_leave_request_doc() {}

#[utoipa::path(
    put,
    path = "/api/leave-requests/{id}/approve",
    params(("id" = String, Path, description = "Leave request id")),
    request_body = DecisionPayload,
    responses(
        (status = 200, description = "Approved and debited", body = LeaveRequestResponse),
        (status = 409, description = "Not pending, or insufficient balance", body = ErrorResponse)
    ),
    tag = "Requests"
)]
fn approve_leave_request_doc() {}

#[utoipa::path(
    put,
    path = "/api/leave-requests/{id}/reject",
    params(("id" = String, Path, description = "Leave request id")),
    request_body = DecisionPayload,
    responses(
        (status = 200, body = LeaveRequestResponse),
        (status = 400, description = "Blank comment", body = ErrorResponse),
        (status = 409, description = "Not pending", body = ErrorResponse)
    ),
    tag = "Requests"
)]
fn reject_leave_request_doc() {}

#[utoipa::path(
    put,
    path = "/api/leave-requests/{id}/cancel",
    params(("id" = String, Path, description = "Leave request id")),
    request_body = CancelPayload,
    responses(
        (status = 200, description = "Cancelled and credited", body = CancellationResponse),
        (status = 400, description = "Blank reason", body = ErrorResponse),
        (status = 409, description = "Not approved", body = ErrorResponse)
    ),
    tag = "Requests"
)]
fn cancel_leave_request_doc() {}

#[utoipa::path(
    put,
    path = "/api/leave-requests/{id}/status",
    params(("id" = String, Path, description = "Leave request id")),
    request_body = TransitionPayload,
    responses(
        (status = 200, body = LeaveRequestResponse),
        (status = 409, description = "Transition not allowed", body = ErrorResponse)
    ),
    tag = "Requests"
)]
fn transition_leave_request_doc() {}

#[utoipa::path(
    post,
    path = "/api/leave-requests/bulk/approve",
    request_body = BulkDecisionPayload,
    responses(
        (status = 200, description = "Per-item results in input order", body = BulkDecisionResponse),
        (status = 400, description = "Empty or oversized batch, or a malformed id; no item is processed", body = ErrorResponse)
    ),
    tag = "Requests"
)]
fn bulk_approve_doc() {}

#[utoipa::path(
    post,
    path = "/api/leave-requests/bulk/reject",
    request_body = BulkDecisionPayload,
    responses(
        (status = 200, description = "Per-item results in input order", body = BulkDecisionResponse),
        (status = 400, description = "Empty or oversized batch, blank comment, or a malformed id; no item is processed", body = ErrorResponse)
    ),
    tag = "Requests"
)]
fn bulk_reject_doc() {}

#[utoipa::path(
    get,
    path = "/api/leave-requests/{id}/conflicts",
    params(("id" = String, Path, description = "Leave request id")),
    responses(
        (status = 200, body = ConflictReport),
        (status = 404, body = ErrorResponse)
    ),
    tag = "Calendar"
)]
fn leave_request_conflicts_doc() {}

#[utoipa::path(
    get,
    path = "/api/teams/{team_id}/coverage",
    params(("team_id" = String, Path, description = "Team id"), CoverageQuery),
    responses(
        (status = 200, body = CoverageResponse),
        (status = 400, description = "Bad window or zero roster", body = ErrorResponse)
    ),
    tag = "Calendar"
)]
fn team_coverage_doc() {}

#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}/balances",
    params(("employee_id" = String, Path, description = "Employee id")),
    responses((status = 200, body = [LeaveBalanceResponse])),
    tag = "Balances"
)]
fn employee_balances_doc() {}

#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}/balances/{leave_type_id}",
    params(
        ("employee_id" = String, Path, description = "Employee id"),
        ("leave_type_id" = String, Path, description = "Leave type code")
    ),
    request_body = SetAllocationPayload,
    responses(
        (status = 200, body = LeaveBalanceResponse),
        (status = 400, description = "Unknown leave type or invalid allocation", body = ErrorResponse),
        (status = 409, description = "Allocation below used days", body = ErrorResponse)
    ),
    tag = "Balances"
)]
fn set_allocation_doc() {}

#[utoipa::path(
    get,
    path = "/api/leave-types",
    responses((status = 200, body = [LeaveType])),
    tag = "Balances"
)]
fn list_leave_types_doc() {}
