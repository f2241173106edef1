//! Health use cases.
use tracing::warn;

use crate::db::{Session, SessionProvider};
use crate::domain::health::HealthReport;
use crate::repos::error::RepoResult;

/// Liveness: the process is up and serving requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct HealthCheckUseCase;

impl HealthCheckUseCase {
    pub async fn execute(&self) -> HealthReport {
        HealthReport::healthy()
    }
}

/// Readiness: a session can be opened and the database answers.
#[derive(Debug, Clone)]
pub struct DatabaseCheckUseCase {
    sessions: SessionProvider,
}

impl DatabaseCheckUseCase {
    pub fn new(sessions: SessionProvider) -> Self {
        Self { sessions }
    }

    pub async fn execute(&self) -> HealthReport {
        match self.sessions.provide(ping).call(()).await {
            Ok(()) => HealthReport::healthy(),
            Err(err) => {
                warn!(error = ?err, "database health check failed");
                HealthReport::unhealthy()
            }
        }
    }
}

async fn ping(session: Session, (): ()) -> RepoResult<()> {
    session.lock().await?.ping().await
}
