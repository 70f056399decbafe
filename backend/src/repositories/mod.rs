pub mod leave_balance_repository;
pub mod leave_request_repository;
pub mod ledger_store;
pub mod memory_store;
pub mod postgres_store;
pub mod transaction;

pub use ledger_store::{LedgerStore, LedgerTransaction};
pub use memory_store::InMemoryLedgerStore;
pub use postgres_store::PgLedgerStore;
pub use transaction::PgLedgerTransaction;
