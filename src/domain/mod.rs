/*
 * Responsibility
 * - HTTP / DB に依存しない domain 型
 */
pub mod health;
