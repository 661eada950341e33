use std::sync::Arc;

use crate::backend::InferenceBackend;
use crate::ledger::CreditLedger;

// app's shared state
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<CreditLedger>,
    pub backend: Arc<dyn InferenceBackend>,
}

impl AppState {
    pub fn new(ledger: Arc<CreditLedger>, backend: Arc<dyn InferenceBackend>) -> Self {
        Self { ledger, backend }
    }
}
