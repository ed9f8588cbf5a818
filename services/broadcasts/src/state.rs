//! Application state shared across handlers

use crate::aggregation::Aggregator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
}
