/*
 * Responsibility
 * - Model (RecordMeta を持つ行) 向けの汎用 SQLx 操作
 * - ambient session の connection 上で実行する (transaction は provider が管理)
 */
use uuid::Uuid;

use crate::db::model::Model;
use crate::db::postgres::pg_connection;
use crate::db::session::Session;
use crate::repos::error::RepoResult;

fn select_by_id_sql(table: &str) -> String {
    format!(r#"SELECT * FROM "{table}" WHERE id = $1"#)
}

fn delete_by_id_sql(table: &str) -> String {
    format!(r#"DELETE FROM "{table}" WHERE id = $1"#)
}

pub async fn find<M: Model>(session: &Session, id: Uuid) -> RepoResult<Option<M>> {
    let sql = select_by_id_sql(M::TABLE);
    let mut conn = session.lock().await?;

    let row = sqlx::query_as::<_, M>(&sql)
        .bind(id)
        .fetch_optional(pg_connection(&mut **conn)?)
        .await?;

    Ok(row)
}

pub async fn delete<M: Model>(session: &Session, id: Uuid) -> RepoResult<bool> {
    let sql = delete_by_id_sql(M::TABLE);
    let mut conn = session.lock().await?;

    let result = sqlx::query(&sql)
        .bind(id)
        .execute(pg_connection(&mut **conn)?)
        .await?;

    Ok(result.rows_affected() > 0)
}
