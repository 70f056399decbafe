pub mod approval;
pub mod cancellation;
pub mod conflict;
pub mod ledger;
pub mod request_state;

pub use approval::BulkItemOutcome;
pub use cancellation::CancellationOutcome;
pub use ledger::{LeaveLedger, LedgerSettings};
pub use request_state::DayCountPolicy;
