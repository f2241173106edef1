//! In-memory backend that records what the provider did to each connection.
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::db::connection::{Connection, SessionFactory};
use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Default)]
pub struct Ledger {
    opened: AtomicUsize,
    begun: AtomicUsize,
    committed: AtomicUsize,
    rolled_back: AtomicUsize,
    pinged: AtomicUsize,
    released: AtomicUsize,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

impl Ledger {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }

    pub fn committed(&self) -> usize {
        self.committed.load(Ordering::SeqCst)
    }

    pub fn rolled_back(&self) -> usize {
        self.rolled_back.load(Ordering::SeqCst)
    }

    pub fn pinged(&self) -> usize {
        self.pinged.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Faults {
    open: bool,
    begin: bool,
    commit: bool,
    rollback: bool,
    ping: bool,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryFactory {
    ledger: Arc<Ledger>,
    faults: Faults,
}

impl MemoryFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> Arc<Ledger> {
        self.ledger.clone()
    }

    pub fn fail_open(mut self) -> Self {
        self.faults.open = true;
        self
    }

    pub fn fail_begin(mut self) -> Self {
        self.faults.begin = true;
        self
    }

    pub fn fail_commit(mut self) -> Self {
        self.faults.commit = true;
        self
    }

    pub fn fail_rollback(mut self) -> Self {
        self.faults.rollback = true;
        self
    }

    pub fn fail_ping(mut self) -> Self {
        self.faults.ping = true;
        self
    }
}

#[async_trait]
impl SessionFactory for MemoryFactory {
    async fn open(&self) -> RepoResult<Box<dyn Connection>> {
        if self.faults.open {
            return Err(RepoError::Db(sqlx::Error::PoolTimedOut));
        }
        bump(&self.ledger.opened);

        Ok(Box::new(MemoryConnection {
            ledger: self.ledger.clone(),
            faults: self.faults,
        }))
    }
}

struct MemoryConnection {
    ledger: Arc<Ledger>,
    faults: Faults,
}

fn injected(what: &str) -> RepoError {
    RepoError::Db(sqlx::Error::Protocol(format!("injected {what} failure")))
}

#[async_trait]
impl Connection for MemoryConnection {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn begin(&mut self) -> RepoResult<()> {
        if self.faults.begin {
            return Err(injected("begin"));
        }
        bump(&self.ledger.begun);
        Ok(())
    }

    async fn commit(&mut self) -> RepoResult<()> {
        if self.faults.commit {
            return Err(injected("commit"));
        }
        bump(&self.ledger.committed);
        Ok(())
    }

    async fn rollback(&mut self) -> RepoResult<()> {
        if self.faults.rollback {
            return Err(injected("rollback"));
        }
        bump(&self.ledger.rolled_back);
        Ok(())
    }

    async fn ping(&mut self) -> RepoResult<()> {
        if self.faults.ping {
            return Err(injected("ping"));
        }
        bump(&self.ledger.pinged);
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        bump(&self.ledger.released);
    }
}
