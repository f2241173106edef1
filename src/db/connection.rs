//! Backend interface used by the session provider.
use std::any::Any;

use async_trait::async_trait;

use crate::repos::error::RepoResult;

/// A single connection-bound transactional context.
///
/// The provider drives the transaction lifecycle (`begin` → `commit` / `rollback`);
/// units of work only run queries on it.
///
/// Implementations must release their underlying resources on drop, including
/// when dropped in the middle of a transaction (cancellation).
#[async_trait]
pub trait Connection: Send + 'static {
    // Returns the backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn begin(&mut self) -> RepoResult<()>;

    async fn commit(&mut self) -> RepoResult<()>;

    async fn rollback(&mut self) -> RepoResult<()>;

    // Cheap round trip used by readiness checks.
    async fn ping(&mut self) -> RepoResult<()>;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Connection {
    /// Access the concrete backend (e.g. to reach the raw `PgConnection`).
    pub fn downcast_mut<T: Connection>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Produces independent connections.
///
/// Each call to `open` must return a fresh, usable connection; implementations
/// are shared behind `Arc` by the provider.
#[async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    async fn open(&self) -> RepoResult<Box<dyn Connection>>;
}
