//! Process-local ledger store.
//!
//! Backs local runs (`STORAGE_BACKEND=memory`) and the test suite. A
//! transaction holds the store mutex from `begin` until it is dropped, so
//! units of work are fully serialized.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    error::LedgerError,
    models::{
        date_range::DateRange,
        leave_balance::LeaveBalance,
        leave_request::{LeaveRequest, StatusChange},
        leave_type::{default_leave_types, LeaveType},
        request_status::RequestStatus,
        LeaveRequestFilter,
    },
    repositories::ledger_store::{LedgerStore, LedgerTransaction},
    types::{EmployeeId, LeaveRequestId, LeaveTypeId, TeamId},
};

type BalanceKey = (EmployeeId, LeaveTypeId);

#[derive(Debug, Default)]
struct LedgerState {
    leave_types: BTreeMap<LeaveTypeId, LeaveType>,
    balances: HashMap<BalanceKey, LeaveBalance>,
    requests: HashMap<LeaveRequestId, LeaveRequest>,
}

#[derive(Debug, Clone)]
pub struct InMemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedgerStore {
    /// A store preloaded with the default leave types and nothing else.
    pub fn new() -> Self {
        Self::with_leave_types(default_leave_types())
    }

    pub fn with_leave_types(leave_types: Vec<LeaveType>) -> Self {
        let state = LedgerState {
            leave_types: leave_types
                .into_iter()
                .map(|leave_type| (leave_type.id.clone(), leave_type))
                .collect(),
            ..LedgerState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Writes a balance as-is, bypassing allocation checks.
    pub async fn seed_balance(&self, balance: LeaveBalance) {
        let mut state = self.state.lock().await;
        state.balances.insert(
            (balance.employee_id, balance.leave_type_id.clone()),
            balance,
        );
    }

    /// Writes a request as-is, whatever its status.
    pub async fn seed_request(&self, request: LeaveRequest) {
        let mut state = self.state.lock().await;
        state.requests.insert(request.id, request);
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, LedgerError> {
        let guard = self.state.clone().lock_owned().await;
        Ok(Box::new(MemoryTransaction {
            guard,
            requests: HashMap::new(),
            balances: HashMap::new(),
        }))
    }

    async fn find_balance(
        &self,
        employee_id: EmployeeId,
        leave_type_id: &LeaveTypeId,
    ) -> Result<Option<LeaveBalance>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state
            .balances
            .get(&(employee_id, leave_type_id.clone()))
            .cloned())
    }

    async fn list_balances(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<LeaveBalance>, LedgerError> {
        let state = self.state.lock().await;
        let mut balances: Vec<LeaveBalance> = state
            .balances
            .values()
            .filter(|balance| balance.employee_id == employee_id)
            .cloned()
            .collect();
        balances.sort_by(|a, b| a.leave_type_id.cmp(&b.leave_type_id));
        Ok(balances)
    }

    async fn upsert_allocation(
        &self,
        employee_id: EmployeeId,
        leave_type_id: &LeaveTypeId,
        allocated: i32,
        allow_negative: bool,
    ) -> Result<LeaveBalance, LedgerError> {
        let mut state = self.state.lock().await;
        if !state.leave_types.contains_key(leave_type_id) {
            return Err(LedgerError::UnknownLeaveType {
                employee_id,
                leave_type_id: leave_type_id.clone(),
            });
        }
        let key = (employee_id, leave_type_id.clone());
        let current = state
            .balances
            .get(&key)
            .cloned()
            .unwrap_or_else(|| LeaveBalance::new(employee_id, leave_type_id.clone(), 0));
        let next = current.with_allocation(allocated, allow_negative)?;
        state.balances.insert(key, next.clone());
        Ok(next)
    }

    async fn get_request(&self, id: LeaveRequestId) -> Result<LeaveRequest, LedgerError> {
        let state = self.state.lock().await;
        state
            .requests
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::request_not_found(id))
    }

    async fn insert_request(&self, request: &LeaveRequest) -> Result<(), LedgerError> {
        let mut state = self.state.lock().await;
        if state.requests.contains_key(&request.id) {
            return Err(LedgerError::InvalidRequest(format!(
                "leave request {} already exists",
                request.id
            )));
        }
        state.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn list_requests(
        &self,
        filter: &LeaveRequestFilter,
    ) -> Result<Vec<LeaveRequest>, LedgerError> {
        let state = self.state.lock().await;
        let mut requests: Vec<LeaveRequest> = state
            .requests
            .values()
            .filter(|request| filter.matches(request))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests
            .into_iter()
            .skip(usize::try_from(filter.offset).unwrap_or(0))
            .take(usize::try_from(filter.limit).unwrap_or(0))
            .collect())
    }

    async fn pending_days_by_type(
        &self,
        employee_id: EmployeeId,
    ) -> Result<HashMap<LeaveTypeId, i32>, LedgerError> {
        let state = self.state.lock().await;
        let mut totals: HashMap<LeaveTypeId, i32> = HashMap::new();
        for request in state.requests.values().filter(|request| {
            request.employee_id == employee_id && request.status == RequestStatus::Pending
        }) {
            let total = totals.entry(request.leave_type_id.clone()).or_default();
            *total = total.saturating_add(request.days_requested);
        }
        Ok(totals)
    }

    async fn list_approved_requests_overlapping(
        &self,
        team_id: TeamId,
        range: DateRange,
    ) -> Result<Vec<LeaveRequest>, LedgerError> {
        let state = self.state.lock().await;
        let mut requests: Vec<LeaveRequest> = state
            .requests
            .values()
            .filter(|request| {
                request.team_id == team_id
                    && request.status == RequestStatus::Approved
                    && request.date_range().overlaps(&range)
            })
            .cloned()
            .collect();
        requests.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        Ok(requests)
    }

    async fn list_leave_types(&self) -> Result<Vec<LeaveType>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state.leave_types.values().cloned().collect())
    }
}

/// Staged writes over an exclusively held [`LedgerState`].
struct MemoryTransaction {
    guard: OwnedMutexGuard<LedgerState>,
    requests: HashMap<LeaveRequestId, LeaveRequest>,
    balances: HashMap<BalanceKey, LeaveBalance>,
}

#[async_trait]
impl LedgerTransaction for MemoryTransaction {
    async fn lock_request(&mut self, id: LeaveRequestId) -> Result<LeaveRequest, LedgerError> {
        self.requests
            .get(&id)
            .or_else(|| self.guard.requests.get(&id))
            .cloned()
            .ok_or_else(|| LedgerError::request_not_found(id))
    }

    async fn save_request_status(
        &mut self,
        change: &StatusChange,
    ) -> Result<LeaveRequest, LedgerError> {
        let mut request = self.lock_request(change.request_id).await?;
        request.apply_status_change(change)?;
        self.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn commit_balance_delta(
        &mut self,
        employee_id: EmployeeId,
        leave_type_id: &LeaveTypeId,
        delta_days: i32,
    ) -> Result<LeaveBalance, LedgerError> {
        let key = (employee_id, leave_type_id.clone());
        let current = self
            .balances
            .get(&key)
            .or_else(|| self.guard.balances.get(&key))
            .cloned()
            .ok_or_else(|| LedgerError::UnknownLeaveType {
                employee_id,
                leave_type_id: leave_type_id.clone(),
            })?;
        let next = current.apply_delta(delta_days)?;
        self.balances.insert(key, next.clone());
        Ok(next)
    }

    async fn commit(&mut self) -> Result<(), LedgerError> {
        let requests = std::mem::take(&mut self.requests);
        let balances = std::mem::take(&mut self.balances);
        self.guard.requests.extend(requests);
        self.guard.balances.extend(balances);
        Ok(())
    }
}
