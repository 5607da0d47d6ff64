//! Application state management

use super::ServerConfig;
use crate::inference::InferenceService;

/// Application state shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    pub service: InferenceService,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig, service: InferenceService) -> Self {
        Self {
            config,
            service,
            started_at: chrono::Utc::now(),
        }
    }
}
