//! HTTP API
//!
//! One turn endpoint plus banner and health probes.

mod handlers;
mod types;

pub use handlers::create_router;

use crate::turn::Concierge;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub concierge: Arc<Concierge>,
    /// Curated venues loaded at startup, reported by `/health`
    pub dataset_records: usize,
}

impl AppState {
    pub fn new(concierge: Arc<Concierge>) -> Self {
        let dataset_records = concierge.controller().engine().dataset().len();
        Self {
            concierge,
            dataset_records,
        }
    }
}
