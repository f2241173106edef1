use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Result of a single health probe. Every probe gets its own id.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub id: Uuid,
    pub status: HealthStatus,
    pub checked_at: DateTime<Utc>,
}

impl HealthReport {
    fn new(status: HealthStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            status,
            checked_at: Utc::now(),
        }
    }

    pub fn healthy() -> Self {
        Self::new(HealthStatus::Healthy)
    }

    pub fn unhealthy() -> Self {
        Self::new(HealthStatus::Unhealthy)
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}
