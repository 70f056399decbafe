//! Manager decisions on pending requests, one at a time or in bulk.

use std::future::Future;

use crate::{
    error::LedgerError,
    models::{
        leave_request::{LeaveRequest, StatusChange},
        request_status::RequestStatus,
    },
    services::ledger::LeaveLedger,
    types::{LeaveRequestId, UserId},
};

/// Outcome for one id of a bulk operation.
#[derive(Debug)]
pub struct BulkItemOutcome {
    pub request_id: LeaveRequestId,
    pub result: Result<LeaveRequest, LedgerError>,
}

impl BulkItemOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl LeaveLedger {
    /// Approves a pending request and debits its days in one unit of work.
    /// If the debit fails the status change is rolled back.
    pub async fn approve_one(
        &self,
        request_id: LeaveRequestId,
        actor_id: UserId,
        comment: Option<String>,
    ) -> Result<LeaveRequest, LedgerError> {
        let comment = self.optional_comment(comment)?;

        let mut tx = self.store.begin().await?;
        let request = tx.lock_request(request_id).await?;
        let change = StatusChange::new(&request, RequestStatus::Approved, actor_id, comment);
        let approved = tx.save_request_status(&change).await?;
        let balance = tx
            .commit_balance_delta(
                approved.employee_id,
                &approved.leave_type_id,
                approved.days_requested,
            )
            .await?;
        tx.commit().await?;

        tracing::info!(
            request_id = %approved.id,
            actor_id = %actor_id,
            days = approved.days_requested,
            used = balance.used,
            available = balance.available(),
            "Leave request approved"
        );
        Ok(approved)
    }

    /// Rejects a pending request. Balances are never touched.
    pub async fn reject_one(
        &self,
        request_id: LeaveRequestId,
        actor_id: UserId,
        comment: Option<String>,
    ) -> Result<LeaveRequest, LedgerError> {
        let comment = self.required_comment("rejection comment", comment)?;

        let mut tx = self.store.begin().await?;
        let request = tx.lock_request(request_id).await?;
        let change = StatusChange::new(&request, RequestStatus::Rejected, actor_id, Some(comment));
        let rejected = tx.save_request_status(&change).await?;
        tx.commit().await?;

        tracing::info!(
            request_id = %rejected.id,
            actor_id = %actor_id,
            "Leave request rejected"
        );
        Ok(rejected)
    }

    pub async fn approve_many(
        &self,
        request_ids: Vec<LeaveRequestId>,
        actor_id: UserId,
        comment: Option<String>,
    ) -> Result<Vec<BulkItemOutcome>, LedgerError> {
        let comment = self.optional_comment(comment)?;
        self.run_bulk("approve", request_ids, move |ledger, id| {
            let comment = comment.clone();
            async move { ledger.approve_one(id, actor_id, comment).await }
        })
        .await
    }

    pub async fn reject_many(
        &self,
        request_ids: Vec<LeaveRequestId>,
        actor_id: UserId,
        comment: Option<String>,
    ) -> Result<Vec<BulkItemOutcome>, LedgerError> {
        let comment = self.required_comment("rejection comment", comment)?;
        self.run_bulk("reject", request_ids, move |ledger, id| {
            let comment = Some(comment.clone());
            async move { ledger.reject_one(id, actor_id, comment).await }
        })
        .await
    }

    /// Runs `operation` for every id concurrently. Each item succeeds or
    /// fails on its own; results keep the input order.
    async fn run_bulk<F, Fut>(
        &self,
        action: &'static str,
        request_ids: Vec<LeaveRequestId>,
        operation: F,
    ) -> Result<Vec<BulkItemOutcome>, LedgerError>
    where
        F: Fn(LeaveLedger, LeaveRequestId) -> Fut,
        Fut: Future<Output = Result<LeaveRequest, LedgerError>> + Send + 'static,
    {
        self.ensure_bulk_size(request_ids.len())?;

        let handles: Vec<_> = request_ids
            .iter()
            .map(|id| tokio::spawn(operation(self.clone(), *id)))
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (request_id, handle) in request_ids.into_iter().zip(handles) {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_error) => Err(LedgerError::Storage(anyhow::anyhow!(
                    "bulk {action} task failed: {join_error}"
                ))),
            };
            outcomes.push(BulkItemOutcome { request_id, result });
        }

        let succeeded = outcomes.iter().filter(|outcome| outcome.is_success()).count();
        tracing::info!(
            action,
            total = outcomes.len(),
            succeeded,
            failed = outcomes.len() - succeeded,
            "Bulk leave decision finished"
        );
        Ok(outcomes)
    }

    fn ensure_bulk_size(&self, count: usize) -> Result<(), LedgerError> {
        if count == 0 {
            return Err(LedgerError::InvalidRequest(
                "request_ids must not be empty".to_string(),
            ));
        }
        if count > self.settings.max_bulk_items {
            return Err(LedgerError::InvalidRequest(format!(
                "{count} request ids given, at most {} allowed",
                self.settings.max_bulk_items
            )));
        }
        Ok(())
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

    async fn ledger_with_request(allocated: i32) -> (LeaveLedger, InMemoryLedgerStore, LeaveRequest) {
        let store = InMemoryLedgerStore::new();
        let employee_id = EmployeeId::new();
        store
            .seed_balance(LeaveBalance::new(employee_id, "annual".into(), allocated))
            .await;
        let ledger = LeaveLedger::new(Arc::new(store.clone()), LedgerSettings::default());
        let request = ledger
            .submit(CreateLeaveRequest {
                employee_id,
                team_id: TeamId::new(),
                leave_type_id: "annual".into(),
                start_date: NaiveDate::from_ymd_opt(2026, 7, 6).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 7, 8).unwrap(),
                reason: None,
            })
            .await
            .unwrap();
        (ledger, store, request)
    }

    async fn used(store: &InMemoryLedgerStore, request: &LeaveRequest) -> i32 {
        store
            .find_balance(request.employee_id, &request.leave_type_id)
            .await
            .unwrap()
            .unwrap()
            .used
    }

    #[tokio::test]
    async fn approve_debits_the_balance_once() {
        let (ledger, store, request) = ledger_with_request(10).await;
        let actor = UserId::new();

        let approved = ledger.approve_one(request.id, actor, None).await.unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(approved.decided_by, Some(actor));

        let err = ledger.approve_one(request.id, actor, None).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransition { .. }));
        assert_eq!(used(&store, &request).await, 3);
    }

    #[tokio::test]
    async fn insufficient_balance_leaves_request_pending() {
        let (ledger, store, request) = ledger_with_request(2).await;

        let err = ledger
            .approve_one(request.id, UserId::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert!(store.get_request(request.id).await.unwrap().is_pending());
        assert_eq!(used(&store, &request).await, 0);
    }

    #[tokio::test]
    async fn reject_requires_a_comment() {
        let (ledger, store, request) = ledger_with_request(10).await;

        let err = ledger
            .reject_one(request.id, UserId::new(), Some("   ".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::MissingReason(_)));
        assert!(store.get_request(request.id).await.unwrap().is_pending());

        let rejected = ledger
            .reject_one(request.id, UserId::new(), Some("team offsite".into()))
            .await
            .unwrap();
        assert_eq!(rejected.decision_comment.as_deref(), Some("team offsite"));
        assert_eq!(used(&store, &request).await, 0);
    }

    #[tokio::test]
    async fn bulk_rejects_empty_and_oversized_batches() {
        let (ledger, _store, request) = ledger_with_request(10).await;
        let err = ledger
            .approve_many(Vec::new(), UserId::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRequest(_)));

        let too_many = vec![request.id; ledger.settings().max_bulk_items + 1];
        let err = ledger
            .approve_many(too_many, UserId::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn duplicate_ids_in_one_batch_apply_once() {
        let (ledger, store, request) = ledger_with_request(10).await;
        let outcomes = ledger
            .approve_many(vec![request.id, request.id], UserId::new(), None)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes.iter().filter(|o| o.is_success()).count(), 1);
        assert_eq!(used(&store, &request).await, 3);
    }
}
