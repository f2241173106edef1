//! Postgres backend for the session provider (sqlx).
use std::any::Any;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Executor, PgConnection, PgPool, Postgres};

use crate::config::Config;
use crate::db::connection::{Connection, SessionFactory};
use crate::repos::error::{RepoError, RepoResult};

#[derive(Clone, Debug)]
pub struct PgSessionFactory {
    pool: PgPool,
}

impl PgSessionFactory {
    /// Build the pool without connecting; the first session opens the first connection.
    pub fn connect_lazy(config: &Config) -> RepoResult<Self> {
        let options = PgConnectOptions::from_str(&config.database_url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .min_connections(0)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_seconds))
            .connect_lazy_with(options);

        Ok(Self { pool })
    }
}

#[async_trait]
impl SessionFactory for PgSessionFactory {
    async fn open(&self) -> RepoResult<Box<dyn Connection>> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(PgSession {
            conn: Some(conn),
            in_transaction: false,
        }))
    }
}

/// A pooled connection driven with explicit `BEGIN` / `COMMIT` / `ROLLBACK`.
pub struct PgSession {
    conn: Option<PoolConnection<Postgres>>,
    in_transaction: bool,
}

impl PgSession {
    pub fn executor(&mut self) -> RepoResult<&mut PgConnection> {
        self.conn.as_deref_mut().ok_or(RepoError::SessionClosed)
    }

    async fn simple(&mut self, statement: &'static str) -> RepoResult<()> {
        self.executor()?.execute(statement).await?;
        Ok(())
    }
}

#[async_trait]
impl Connection for PgSession {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn begin(&mut self) -> RepoResult<()> {
        self.simple("BEGIN").await?;
        self.in_transaction = true;
        Ok(())
    }

    async fn commit(&mut self) -> RepoResult<()> {
        self.simple("COMMIT").await?;
        self.in_transaction = false;
        Ok(())
    }

    async fn rollback(&mut self) -> RepoResult<()> {
        self.simple("ROLLBACK").await?;
        self.in_transaction = false;
        Ok(())
    }

    async fn ping(&mut self) -> RepoResult<()> {
        self.simple("SELECT 1").await
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Drop for PgSession {
    fn drop(&mut self) {
        // Never hand an open transaction back to the pool. Dropping the detached
        // connection closes the socket and the server aborts the transaction.
        if self.in_transaction
            && let Some(conn) = self.conn.take()
        {
            tracing::warn!("discarding connection with an open transaction");
            drop(conn.detach());
        }
    }
}

/// Reach the Postgres connection behind a locked session.
pub fn pg_connection<'a>(
    conn: &'a mut (dyn Connection + 'static),
) -> RepoResult<&'a mut PgConnection> {
    let backend = conn.backend_name();
    conn.downcast_mut::<PgSession>()
        .ok_or(RepoError::UnsupportedBackend(backend))?
        .executor()
}
