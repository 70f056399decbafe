use std::sync::Arc;

use crate::{config::Config, repositories::LedgerStore, services::LeaveLedger};

#[derive(Clone)]
pub struct AppState {
    pub ledger: LeaveLedger,
    pub config: Config,
}

impl AppState {
    pub fn new(ledger: LeaveLedger, config: Config) -> Self {
        Self { ledger, config }
    }

    /// Builds the ledger from `config` on top of `store`.
    pub fn from_store(store: Arc<dyn LedgerStore>, config: Config) -> Self {
        let ledger = LeaveLedger::new(store, config.ledger_settings());
        Self::new(ledger, config)
    }
}
