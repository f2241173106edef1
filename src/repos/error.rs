/*
 * Responsibility
 * - repo / session 層が上位に伝える意味の定義
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    // The owning call already released the connection.
    #[error("session already closed")]
    SessionClosed,
    #[error("operation not supported by the {0} backend")]
    UnsupportedBackend(&'static str),
}

pub type RepoResult<T> = Result<T, RepoError>;
