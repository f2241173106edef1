//! Ambient database sessions.
//!
//! A unit of work declares the session as a parameter; [`SessionProvider`] hides it
//! from callers and supplies it at call time:
//!
//! - If the current call chain already has a session, that session is reused
//!   (no new transaction, no commit/rollback).
//! - Otherwise a connection is opened from the [`SessionFactory`], a transaction
//!   is started, the session is made ambient for the duration of the call, and the
//!   transaction is committed on `Ok` / rolled back on `Err`.
//!
//! The ambient slot is task-local and scoped to the owning future, so chains that
//! run concurrently (even inside one `tokio::join!`) never see each other's
//! session. `tokio::spawn` starts a new chain, and provided calls are `Send` so
//! they can be spawned.
//!
//! ```ignore
//! async fn rename(session: Session, (id, name): (Uuid, String)) -> RepoResult<()> { ... }
//!
//! let rename = provider.provide(rename);
//! rename.call((id, "new".into())).await?;
//! ```
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, trace};
use uuid::Uuid;

use crate::db::connection::{Connection, SessionFactory};
use crate::repos::error::{RepoError, RepoResult};

tokio::task_local! {
    static CURRENT_SESSION: Session;
}

/// Exclusive access to the session's connection. Owned, so it can be held across
/// `.await` in a spawned task.
pub type SessionGuard = OwnedMutexGuard<Box<dyn Connection>>;

/// Handle to the connection owned by the outermost provided call.
///
/// Cheap to clone. Nested calls receive clones of the same handle; only the
/// owning call commits, rolls back and releases the connection.
#[derive(Clone)]
pub struct Session {
    id: Uuid,
    conn: Arc<Mutex<Box<dyn Connection>>>,
}

impl Session {
    fn new(conn: Box<dyn Connection>) -> Self {
        Self {
            id: Uuid::new_v4(),
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The session active in the current call chain, if any.
    pub fn current() -> Option<Session> {
        CURRENT_SESSION.try_with(Session::clone).ok()
    }

    /// Lock the connection for a query.
    ///
    /// Hold the guard only for the query itself: a nested provided call waits on
    /// the same lock, so awaiting one while holding the guard never completes.
    pub fn lock(&self) -> impl Future<Output = RepoResult<SessionGuard>> + Send + use<> {
        let id = self.id;
        let conn = Arc::clone(&self.conn);

        async move {
            let mut guard = match Arc::clone(&conn).try_lock_owned() {
                Ok(guard) => guard,
                Err(_) => {
                    debug!(session_id = %id, "session busy, waiting for the held guard");
                    conn.lock_owned().await
                }
            };

            if guard.as_any_mut().is::<Released>() {
                Err(RepoError::SessionClosed)
            } else {
                Ok(guard)
            }
        }
    }

    /// Commit or roll back according to `outcome`, then drop the connection even
    /// if clones of this handle escaped the call.
    async fn close<T, E>(self, outcome: Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>,
    {
        let Session { id, conn } = self;
        let mut conn = conn.lock_owned().await;

        let result = match outcome {
            Ok(value) => match conn.commit().await {
                Ok(()) => {
                    debug!(session_id = %id, "session committed");
                    Ok(value)
                }
                Err(e) => Err(E::from(e)),
            },
            Err(err) => {
                match conn.rollback().await {
                    Ok(()) => debug!(session_id = %id, "session rolled back"),
                    // The caller gets its own error, not this one.
                    Err(e) => error!(session_id = %id, error = ?e, "rollback failed"),
                }
                Err(err)
            }
        };

        *conn = Box::new(Released);
        trace!(session_id = %id, "session released");
        result
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Stands in for the connection once the owning call has returned.
struct Released;

#[async_trait]
impl Connection for Released {
    fn backend_name(&self) -> &'static str {
        "released"
    }

    async fn begin(&mut self) -> RepoResult<()> {
        Err(RepoError::SessionClosed)
    }

    async fn commit(&mut self) -> RepoResult<()> {
        Err(RepoError::SessionClosed)
    }

    async fn rollback(&mut self) -> RepoResult<()> {
        Err(RepoError::SessionClosed)
    }

    async fn ping(&mut self) -> RepoResult<()> {
        Err(RepoError::SessionClosed)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Supplies sessions to units of work.
#[derive(Clone)]
pub struct SessionProvider {
    factory: Arc<dyn SessionFactory>,
}

impl SessionProvider {
    pub fn new(factory: impl SessionFactory) -> Self {
        Self {
            factory: Arc::new(factory),
        }
    }

    /// Wrap a function whose first parameter is the session.
    pub fn provide<F>(&self, target: F) -> Provided<Plain, F> {
        Provided::new(self.clone(), target)
    }

    /// Wrap a method-shaped function: receiver first, session second.
    pub fn provide_method<F>(&self, target: F) -> Provided<Method, F> {
        Provided::new(self.clone(), target)
    }

    /// Run `work` with the ambient session, opening (and owning) one if the chain
    /// has none.
    ///
    /// Errors from `work` are returned unchanged. Factory and transaction errors
    /// are converted through `From<RepoError>`.
    pub fn run<W, Fut, T, E>(
        &self,
        work: W,
    ) -> impl Future<Output = Result<T, E>> + Send + use<W, Fut, T, E>
    where
        W: FnOnce(Session) -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: From<RepoError> + Send,
    {
        run_in_session(Arc::clone(&self.factory), work)
    }
}

impl fmt::Debug for SessionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionProvider").finish_non_exhaustive()
    }
}

async fn run_in_session<W, Fut, T, E>(factory: Arc<dyn SessionFactory>, work: W) -> Result<T, E>
where
    W: FnOnce(Session) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<RepoError>,
{
    if let Some(session) = Session::current() {
        trace!(session_id = %session.id(), "reusing ambient session");
        return work(session).await;
    }

    let mut conn = factory.open().await?;
    let backend = conn.backend_name();
    conn.begin().await?;

    let session = Session::new(conn);
    debug!(session_id = %session.id, backend, "session opened");

    let borrowed = session.clone();
    let outcome = CURRENT_SESSION
        .scope(session.clone(), async move { work(borrowed).await })
        .await;

    session.close(outcome).await
}

/// Where the session goes in the wrapped function's parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `f(session, args)`
    Plain,
    /// `f(receiver, session, args)`
    Method,
}

pub trait ShapeKind {
    const SHAPE: Shape;
}

pub enum Plain {}
pub enum Method {}

impl ShapeKind for Plain {
    const SHAPE: Shape = Shape::Plain;
}

impl ShapeKind for Method {
    const SHAPE: Shape = Shape::Method;
}

/// A unit of work with its session parameter elided.
///
/// The shape is fixed when wrapping; a target whose parameters don't fit the shape
/// is rejected by the `call` bounds.
pub struct Provided<S, F> {
    provider: SessionProvider,
    target: F,
    _shape: PhantomData<fn() -> S>,
}

impl<S, F> Provided<S, F> {
    fn new(provider: SessionProvider, target: F) -> Self {
        Self {
            provider,
            target,
            _shape: PhantomData,
        }
    }
}

impl<S: ShapeKind, F> Provided<S, F> {
    pub fn shape(&self) -> Shape {
        S::SHAPE
    }
}

impl<F> Provided<Plain, F> {
    pub fn call<A, Fut, T, E>(&self, args: A) -> impl Future<Output = Result<T, E>> + Send
    where
        F: Fn(Session, A) -> Fut + Sync,
        A: Send,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: From<RepoError> + Send,
    {
        let target = &self.target;
        self.provider.run(move |session| target(session, args))
    }
}

impl<F> Provided<Method, F> {
    pub fn call<R, A, Fut, T, E>(
        &self,
        receiver: R,
        args: A,
    ) -> impl Future<Output = Result<T, E>> + Send
    where
        F: Fn(R, Session, A) -> Fut + Sync,
        R: Send,
        A: Send,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: From<RepoError> + Send,
    {
        let target = &self.target;
        self.provider.run(move |session| target(receiver, session, args))
    }
}

impl<S, F: Clone> Clone for Provided<S, F> {
    fn clone(&self) -> Self {
        Self::new(self.provider.clone(), self.target.clone())
    }
}

impl<S: ShapeKind, F> fmt::Debug for Provided<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provided")
            .field("shape", &S::SHAPE)
            .finish_non_exhaustive()
    }
}
