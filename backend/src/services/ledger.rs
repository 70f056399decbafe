use std::sync::Arc;

use crate::{
    error::LedgerError,
    models::{
        coverage::{ConflictReport, CoverageSnapshot},
        date_range::DateRange,
        leave_balance::LeaveBalanceResponse,
        leave_request::{CreateLeaveRequest, LeaveRequest},
        leave_type::LeaveType,
        request_status::RequestStatus,
        LeaveRequestFilter,
    },
    repositories::LedgerStore,
    services::{
        conflict,
        request_state::{self, DayCountPolicy},
    },
    types::{EmployeeId, LeaveRequestId, LeaveTypeId, TeamId, UserId},
};

pub const DEFAULT_MAX_BULK_ITEMS: usize = 100;
pub const DEFAULT_MAX_COMMENT_LENGTH: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSettings {
    pub day_count_policy: DayCountPolicy,
    pub max_bulk_items: usize,
    pub max_comment_length: usize,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            day_count_policy: DayCountPolicy::default(),
            max_bulk_items: DEFAULT_MAX_BULK_ITEMS,
            max_comment_length: DEFAULT_MAX_COMMENT_LENGTH,
        }
    }
}

/// Keeps leave requests and balances consistent.
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct LeaveLedger {
    pub(crate) store: Arc<dyn LedgerStore>,
    pub(crate) settings: LedgerSettings,
}

impl LeaveLedger {
    pub fn new(store: Arc<dyn LedgerStore>, settings: LedgerSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    /// Records a new `pending` request. No balance is touched until approval.
    pub async fn submit(&self, payload: CreateLeaveRequest) -> Result<LeaveRequest, LedgerError> {
        let days = request_state::days_for_submission(&payload, self.settings.day_count_policy)?;
        if self
            .store
            .find_balance(payload.employee_id, &payload.leave_type_id)
            .await?
            .is_none()
        {
            return Err(LedgerError::UnknownLeaveType {
                employee_id: payload.employee_id,
                leave_type_id: payload.leave_type_id,
            });
        }

        let payload = CreateLeaveRequest {
            reason: request_state::normalize_reason(payload.reason),
            ..payload
        };
        let request = LeaveRequest::new(payload, days);
        self.store.insert_request(&request).await?;

        tracing::info!(
            request_id = %request.id,
            employee_id = %request.employee_id,
            leave_type_id = %request.leave_type_id,
            days = request.days_requested,
            "Leave request submitted"
        );
        Ok(request)
    }

    /// Moves a request to `target`, going through the same path as the
    /// dedicated approve/reject/cancel operations.
    pub async fn transition(
        &self,
        request_id: LeaveRequestId,
        target: RequestStatus,
        actor_id: UserId,
        comment: Option<String>,
    ) -> Result<LeaveRequest, LedgerError> {
        let current = self.store.get_request(request_id).await?;
        if !current.status.can_transition_to(target) {
            return Err(LedgerError::InvalidTransition {
                request_id,
                from: current.status,
                to: target,
            });
        }

        match target {
            RequestStatus::Approved => self.approve_one(request_id, actor_id, comment).await,
            RequestStatus::Rejected => self.reject_one(request_id, actor_id, comment).await,
            RequestStatus::Cancelled => self
                .cancel_approved(request_id, actor_id, comment)
                .await
                .map(|outcome| outcome.request),
            RequestStatus::Pending => Err(LedgerError::InvalidTransition {
                request_id,
                from: current.status,
                to: target,
            }),
        }
    }

    pub async fn get_request(&self, id: LeaveRequestId) -> Result<LeaveRequest, LedgerError> {
        self.store.get_request(id).await
    }

    pub async fn list_requests(
        &self,
        filter: &LeaveRequestFilter,
    ) -> Result<Vec<LeaveRequest>, LedgerError> {
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            DateRange::new(from, to)?;
        }
        self.store.list_requests(filter).await
    }

    /// Every balance of `employee_id` with the days still awaiting a decision.
    pub async fn balance_summary(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<LeaveBalanceResponse>, LedgerError> {
        let balances = self.store.list_balances(employee_id).await?;
        let pending_days = self.store.pending_days_by_type(employee_id).await?;

        Ok(balances
            .into_iter()
            .map(|balance| {
                let pending = pending_days
                    .get(&balance.leave_type_id)
                    .copied()
                    .unwrap_or_default();
                LeaveBalanceResponse::new(balance, pending)
            })
            .collect())
    }

    /// Creates or updates an allocation and returns the balance as
    /// [`balance_summary`](Self::balance_summary) would report it.
    pub async fn set_allocation(
        &self,
        employee_id: EmployeeId,
        leave_type_id: &LeaveTypeId,
        allocated: i32,
        allow_negative: bool,
    ) -> Result<LeaveBalanceResponse, LedgerError> {
        let balance = self
            .store
            .upsert_allocation(employee_id, leave_type_id, allocated, allow_negative)
            .await?;
        let pending = self
            .store
            .pending_days_by_type(employee_id)
            .await?
            .get(leave_type_id)
            .copied()
            .unwrap_or_default();
        tracing::info!(
            employee_id = %employee_id,
            leave_type_id = %leave_type_id,
            allocated,
            allow_negative,
            pending_days = pending,
            "Leave allocation updated"
        );
        Ok(LeaveBalanceResponse::new(balance, pending))
    }

    pub async fn list_leave_types(&self) -> Result<Vec<LeaveType>, LedgerError> {
        self.store.list_leave_types().await
    }

    /// Conflict level of a request against the team's approved leave.
    pub async fn conflicts_for(
        &self,
        request_id: LeaveRequestId,
    ) -> Result<ConflictReport, LedgerError> {
        let request = self.store.get_request(request_id).await?;
        let siblings = self
            .store
            .list_approved_requests_overlapping(request.team_id, request.date_range())
            .await?;
        Ok(conflict::conflict_report(&request, &siblings))
    }

    /// One coverage snapshot per day of `range` for `team_id`.
    pub async fn team_coverage(
        &self,
        team_id: TeamId,
        range: DateRange,
        roster_size: u32,
    ) -> Result<Vec<CoverageSnapshot>, LedgerError> {
        conflict::ensure_roster(roster_size)?;
        conflict::ensure_coverage_window(&range)?;
        let approved = self
            .store
            .list_approved_requests_overlapping(team_id, range)
            .await?;
        conflict::compute_coverage_range(range, roster_size, &approved)
    }

    /// Trims `comment` and enforces the configured length; blank is `None`.
    pub(crate) fn optional_comment(
        &self,
        comment: Option<String>,
    ) -> Result<Option<String>, LedgerError> {
        let comment = request_state::normalize_reason(comment);
        if let Some(text) = &comment {
            let length = text.chars().count();
            if length > self.settings.max_comment_length {
                return Err(LedgerError::InvalidRequest(format!(
                    "comment has {length} characters, at most {} allowed",
                    self.settings.max_comment_length
                )));
            }
        }
        Ok(comment)
    }

    pub(crate) fn required_comment(
        &self,
        field: &'static str,
        comment: Option<String>,
    ) -> Result<String, LedgerError> {
        self.optional_comment(comment)?
            .ok_or(LedgerError::MissingReason(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{leave_balance::LeaveBalance, leave_request::StatusChange},
        repositories::{
            ledger_store::{LedgerTransaction, MockLedgerStore, MockLedgerTransaction},
            InMemoryLedgerStore,
        },
    };
    use chrono::NaiveDate;
    use mockall::predicate::eq;

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
    }

    fn payload(employee_id: EmployeeId) -> CreateLeaveRequest {
        CreateLeaveRequest {
            employee_id,
            team_id: TeamId::new(),
            leave_type_id: "annual".into(),
            start_date: june(1),
            end_date: june(3),
            reason: Some("  ".into()),
        }
    }

    #[tokio::test]
    async fn submit_requires_a_balance_record() {
        let ledger = LeaveLedger::new(
            Arc::new(InMemoryLedgerStore::new()),
            LedgerSettings::default(),
        );
        let err = ledger.submit(payload(EmployeeId::new())).await.unwrap_err();
        assert!(matches!(err, LedgerError::UnknownLeaveType { .. }));
    }

    #[tokio::test]
    async fn submit_creates_pending_request_without_touching_balance() {
        let store = InMemoryLedgerStore::new();
        let employee = EmployeeId::new();
        store
            .seed_balance(LeaveBalance::new(employee, "annual".into(), 2))
            .await;
        let ledger = LeaveLedger::new(Arc::new(store.clone()), LedgerSettings::default());

        // More days than available is still accepted at submission.
        let request = ledger.submit(payload(employee)).await.unwrap();
        assert!(request.is_pending());
        assert_eq!(request.days_requested, 3);
        assert_eq!(request.reason, None);

        let balance = store
            .find_balance(employee, &"annual".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(balance.used, 0);
    }

    #[tokio::test]
    async fn failed_balance_commit_never_commits_the_transaction() {
        let employee = EmployeeId::new();
        let pending = LeaveRequest::new(payload(employee), 3);
        let request_id = pending.id;

        let mut tx = MockLedgerTransaction::new();
        let locked = pending.clone();
        tx.expect_lock_request()
            .with(eq(request_id))
            .times(1)
            .returning(move |_| Ok(locked.clone()));
        let saved = pending.clone();
        tx.expect_save_request_status()
            .times(1)
            .returning(move |change: &StatusChange| {
                let mut approved = saved.clone();
                approved.apply_status_change(change)?;
                Ok(approved)
            });
        tx.expect_commit_balance_delta()
            .times(1)
            .returning(|employee_id, leave_type_id, delta| {
                Err(LedgerError::InsufficientBalance {
                    employee_id,
                    leave_type_id: leave_type_id.clone(),
                    available: 1,
                    requested: delta,
                })
            });
        tx.expect_commit().times(0);

        let mut store = MockLedgerStore::new();
        store
            .expect_begin()
            .times(1)
            .return_once(move || Ok(Box::new(tx) as Box<dyn LedgerTransaction>));

        let ledger = LeaveLedger::new(Arc::new(store), LedgerSettings::default());
        let err = ledger
            .approve_one(request_id, UserId::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
    }

    #[tokio::test]
    async fn transition_rejects_edges_outside_the_table() {
        let store = InMemoryLedgerStore::new();
        let request = LeaveRequest::new(payload(EmployeeId::new()), 3);
        store.seed_request(request.clone()).await;
        let ledger = LeaveLedger::new(Arc::new(store), LedgerSettings::default());

        let err = ledger
            .transition(request.id, RequestStatus::Cancelled, UserId::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidTransition {
                from: RequestStatus::Pending,
                to: RequestStatus::Cancelled,
                ..
            }
        ));
    }

    #[test]
    fn comments_are_trimmed_and_bounded() {
        let ledger = LeaveLedger::new(
            Arc::new(InMemoryLedgerStore::new()),
            LedgerSettings {
                max_comment_length: 5,
                ..LedgerSettings::default()
            },
        );
        assert_eq!(
            ledger.optional_comment(Some(" ok ".into())).unwrap(),
            Some("ok".into())
        );
        assert!(matches!(
            ledger.required_comment("rejection comment", Some(" ".into())),
            Err(LedgerError::MissingReason("rejection comment"))
        ));
        assert!(matches!(
            ledger.optional_comment(Some("too long".into())),
            Err(LedgerError::InvalidRequest(_))
        ));
    }
}
