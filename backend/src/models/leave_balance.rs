use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::{
    error::LedgerError,
    types::{EmployeeId, LeaveTypeId},
};

/// Per-employee, per-leave-type day accounting.
///
/// `available` is never stored; it is always `allocated - used`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LeaveBalance {
    pub employee_id: EmployeeId,
    pub leave_type_id: LeaveTypeId,
    pub allocated: i32,
    pub used: i32,
    /// Administrative override: lets `available` drop below zero.
    pub allow_negative: bool,
    pub updated_at: DateTime<Utc>,
}

impl LeaveBalance {
    pub fn new(employee_id: EmployeeId, leave_type_id: LeaveTypeId, allocated: i32) -> Self {
        Self {
            employee_id,
            leave_type_id,
            allocated,
            used: 0,
            allow_negative: false,
            updated_at: Utc::now(),
        }
    }

    pub fn available(&self) -> i32 {
        self.allocated - self.used
    }

    /// Returns the balance after moving `delta` days into (positive) or out of
    /// (negative) `used`.
    ///
    /// `used` below zero means a reversal without a matching approval and is
    /// reported as `BalanceInconsistency`. A negative `available` is only
    /// accepted with the override flag.
    pub fn apply_delta(&self, delta: i32) -> Result<LeaveBalance, LedgerError> {
        let used = self
            .used
            .checked_add(delta)
            .filter(|used| *used >= 0)
            .ok_or_else(|| LedgerError::BalanceInconsistency {
                employee_id: self.employee_id,
                leave_type_id: self.leave_type_id.clone(),
                used: self.used,
                delta,
            })?;

        let next = LeaveBalance {
            used,
            updated_at: Utc::now(),
            ..self.clone()
        };

        if delta > 0 && next.available() < 0 && !self.allow_negative {
            return Err(LedgerError::InsufficientBalance {
                employee_id: self.employee_id,
                leave_type_id: self.leave_type_id.clone(),
                available: self.available(),
                requested: delta,
            });
        }

        Ok(next)
    }

    /// Returns the balance with a new allocation; `used` is left alone.
    pub fn with_allocation(
        &self,
        allocated: i32,
        allow_negative: bool,
    ) -> Result<LeaveBalance, LedgerError> {
        if allocated < 0 {
            return Err(LedgerError::InvalidRequest(
                "allocated days must not be negative".to_string(),
            ));
        }
        let next = LeaveBalance {
            allocated,
            allow_negative,
            updated_at: Utc::now(),
            ..self.clone()
        };
        if next.available() < 0 && !allow_negative {
            return Err(LedgerError::InsufficientBalance {
                employee_id: self.employee_id,
                leave_type_id: self.leave_type_id.clone(),
                available: allocated,
                requested: self.used,
            });
        }
        Ok(next)
    }
}

/// Balance view returned to API callers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaveBalanceResponse {
    #[schema(value_type = String)]
    pub employee_id: EmployeeId,
    #[schema(value_type = String, example = "annual")]
    pub leave_type_id: LeaveTypeId,
    pub allocated: i32,
    pub used: i32,
    pub available: i32,
    /// Days sitting in pending requests. Informational; nothing is reserved.
    pub pending_days: i32,
    pub allow_negative: bool,
    pub updated_at: DateTime<Utc>,
}

impl LeaveBalanceResponse {
    pub fn new(balance: LeaveBalance, pending_days: i32) -> Self {
        Self {
            available: balance.available(),
            employee_id: balance.employee_id,
            leave_type_id: balance.leave_type_id,
            allocated: balance.allocated,
            used: balance.used,
            pending_days,
            allow_negative: balance.allow_negative,
            updated_at: balance.updated_at,
        }
    }
}
