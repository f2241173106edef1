/*
 * Responsibility
 * - Session provider (ambient session + transaction) と backend の公開インターフェース
 */
pub mod connection;
pub mod model;
pub mod postgres;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::{Connection, SessionFactory};
pub use session::{Method, Plain, Provided, Session, SessionGuard, SessionProvider, Shape};
