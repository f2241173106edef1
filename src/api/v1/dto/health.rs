/*
 * Responsibility
 * - Health の response DTO
 * - domain の enum を wire 表現 (snake_case) に写す
 */
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::health::{HealthReport, HealthStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatusDto {
    Healthy,
    Unhealthy,
}

impl From<HealthStatus> for HealthStatusDto {
    fn from(status: HealthStatus) -> Self {
        match status {
            HealthStatus::Healthy => Self::Healthy,
            HealthStatus::Unhealthy => Self::Unhealthy,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub id: Uuid,
    pub status: HealthStatusDto,
    pub timestamp: DateTime<Utc>,
}

impl From<HealthReport> for HealthResponse {
    fn from(report: HealthReport) -> Self {
        Self {
            id: report.id,
            status: report.status.into(),
            timestamp: report.checked_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_in_snake_case() {
        let body = serde_json::to_value(HealthResponse::from(HealthReport::unhealthy())).unwrap();

        assert_eq!(body["status"], "unhealthy");
        assert!(body["id"].as_str().is_some_and(|id| Uuid::parse_str(id).is_ok()));
        assert!(body["timestamp"].is_string());
    }
}
