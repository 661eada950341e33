pub mod backend;
pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod ledger;
pub mod metrics;
pub mod models;
pub mod startup;
pub mod state;

pub use backend::{InferenceBackend, OllamaBackend};
pub use ledger::{ApprovedKey, CreditLedger};
pub use startup::build_router;
pub use state::AppState;
