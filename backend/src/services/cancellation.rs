use crate::{
    error::LedgerError,
    models::{
        leave_request::{LeaveRequest, StatusChange},
        request_status::RequestStatus,
    },
    services::ledger::LeaveLedger,
    types::{LeaveRequestId, UserId},
};

/// Result of reversing an approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationOutcome {
    pub request: LeaveRequest,
    pub restored_days: i32,
}

impl LeaveLedger {
    /// Cancels an approved request and gives its days back.
    ///
    /// The status check, the status write and the credit share one unit of
    /// work, so an approval is reversed at most once.
    pub async fn cancel_approved(
        &self,
        request_id: LeaveRequestId,
        actor_id: UserId,
        reason: Option<String>,
    ) -> Result<CancellationOutcome, LedgerError> {
        let reason = self.required_comment("cancellation reason", reason)?;

        let mut tx = self.store.begin().await?;
        let request = tx.lock_request(request_id).await?;
        if request.status != RequestStatus::Approved {
            return Err(LedgerError::NotApproved {
                request_id,
                status: request.status,
            });
        }

        let change = StatusChange::new(&request, RequestStatus::Cancelled, actor_id, Some(reason));
        let cancelled = tx.save_request_status(&change).await?;
        let restored_days = cancelled.days_requested;
        let balance = match tx
            .commit_balance_delta(
                cancelled.employee_id,
                &cancelled.leave_type_id,
                -restored_days,
            )
            .await
        {
            Ok(balance) => balance,
            Err(err @ LedgerError::BalanceInconsistency { .. }) => {
                tracing::error!(
                    target: "leave_ledger::integrity",
                    request_id = %request_id,
                    employee_id = %cancelled.employee_id,
                    leave_type_id = %cancelled.leave_type_id,
                    days = restored_days,
                    error = %err,
                    "Cancellation would drive used days below zero"
                );
                return Err(err);
            }
            Err(err) => return Err(err),
        };
        tx.commit().await?;

        tracing::info!(
            request_id = %request_id,
            actor_id = %actor_id,
            restored_days,
            used = balance.used,
            "Approved leave cancelled"
        );
        Ok(CancellationOutcome {
            request: cancelled,
            restored_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::{
        models::{leave_balance::LeaveBalance, leave_request::CreateLeaveRequest},
        repositories::{InMemoryLedgerStore, LedgerStore},
        services::ledger::LedgerSettings,
        types::{EmployeeId, TeamId},
    };

    fn request(employee_id: EmployeeId, status: RequestStatus) -> LeaveRequest {
        let mut request = LeaveRequest::new(
            CreateLeaveRequest {
                employee_id,
                team_id: TeamId::new(),
                leave_type_id: "sick".into(),
                start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
                reason: None,
            },
            2,
        );
        request.status = status;
        request
    }

    async fn setup(used: i32, status: RequestStatus) -> (LeaveLedger, InMemoryLedgerStore, LeaveRequest) {
        let store = InMemoryLedgerStore::new();
        let employee_id = EmployeeId::new();
        store
            .seed_balance(LeaveBalance {
                used,
                ..LeaveBalance::new(employee_id, "sick".into(), 10)
            })
            .await;
        let request = request(employee_id, status);
        store.seed_request(request.clone()).await;
        let ledger = LeaveLedger::new(Arc::new(store.clone()), LedgerSettings::default());
        (ledger, store, request)
    }

    #[tokio::test]
    async fn cancel_restores_exactly_the_approved_days() {
        let (ledger, store, request) = setup(2, RequestStatus::Approved).await;

        let outcome = ledger
            .cancel_approved(request.id, UserId::new(), Some("plans changed".into()))
            .await
            .unwrap();
        assert_eq!(outcome.restored_days, 2);
        assert_eq!(outcome.request.status, RequestStatus::Cancelled);
        assert_eq!(
            outcome.request.cancellation_reason.as_deref(),
            Some("plans changed")
        );

        let err = ledger
            .cancel_approved(request.id, UserId::new(), Some("again".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotApproved { .. }));

        let balance = store
            .find_balance(request.employee_id, &request.leave_type_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(balance.used, 0);
    }

    #[tokio::test]
    async fn blank_reason_is_checked_before_status() {
        let (ledger, _store, request) = setup(0, RequestStatus::Pending).await;
        let err = ledger
            .cancel_approved(request.id, UserId::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::MissingReason(_)));
    }

    #[tokio::test]
    async fn pending_request_cannot_be_cancelled() {
        let (ledger, _store, request) = setup(0, RequestStatus::Pending).await;
        let err = ledger
            .cancel_approved(request.id, UserId::new(), Some("no longer needed".into()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::NotApproved {
                status: RequestStatus::Pending,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn reversal_below_zero_is_reported_not_clamped() {
        let (ledger, store, request) = setup(1, RequestStatus::Approved).await;

        let err = ledger
            .cancel_approved(request.id, UserId::new(), Some("duplicate".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::BalanceInconsistency { .. }));

        assert!(store.get_request(request.id).await.unwrap().is_approved());
        let balance = store
            .find_balance(request.employee_id, &request.leave_type_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(balance.used, 1);
    }
}
