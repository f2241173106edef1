/*
 * Responsibility
 * - use case (application layer) の公開
 * - handler は use case だけを呼ぶ
 */
pub mod health;
