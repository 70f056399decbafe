//! Shared identifier types.

pub mod id;

pub use id::{EmployeeId, LeaveRequestId, LeaveTypeId, TeamId, UserId};
