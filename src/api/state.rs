use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::service::Predictor;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Artifacts and row picker, loaded once at startup
    pub predictor: Arc<Predictor>,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(predictor: Arc<Predictor>) -> Self {
        Self {
            predictor,
            start_time: Utc::now(),
        }
    }

    /// Get system uptime in seconds
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }
}
