/*
 * Responsibility
 * - middleware の公開インターフェース
 * - pub fn apply(...) を module ごとに持つ
 */
pub mod cors;
pub mod http;
