/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - ex: sessions: SessionProvider (PgPool を内包)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use crate::db::SessionProvider;

#[derive(Clone, Debug)]
pub struct AppState {
    pub sessions: SessionProvider,
}

impl AppState {
    pub fn new(sessions: SessionProvider) -> Self {
        Self { sessions }
    }
}
