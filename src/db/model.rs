//! Columns shared by every persisted record.
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use sqlx::postgres::PgRow;
use uuid::Uuid;

/// `id` / `created_at` / `updated_at`.
///
/// Embed it with `#[sqlx(flatten)]`. The database fills both timestamps on insert
/// and bumps `updated_at` on update.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct RecordMeta {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecordMeta {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for RecordMeta {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Model: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    const TABLE: &'static str;

    fn meta(&self) -> &RecordMeta;

    fn id(&self) -> Uuid {
        self.meta().id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, FromRow, Serialize)]
    struct Widget {
        #[sqlx(flatten)]
        #[serde(flatten)]
        meta: RecordMeta,
        label: String,
    }

    impl Model for Widget {
        const TABLE: &'static str = "widgets";

        fn meta(&self) -> &RecordMeta {
            &self.meta
        }
    }

    #[test]
    fn new_meta_has_fresh_id_and_equal_timestamps() {
        let a = RecordMeta::new();
        let b = RecordMeta::new();

        assert_ne!(a.id, b.id);
        assert_eq!(a.id.get_version_num(), 4);
        assert_eq!(a.created_at, a.updated_at);
    }

    #[test]
    fn model_exposes_meta_id_and_serializes_flat() {
        let widget = Widget {
            meta: RecordMeta::new(),
            label: "gear".into(),
        };

        assert_eq!(widget.id(), widget.meta.id);

        let json = serde_json::to_value(&widget).unwrap();
        assert_eq!(json["id"], widget.meta.id.to_string());
        assert!(json.get("created_at").is_some());
        assert!(json.get("updated_at").is_some());
        assert_eq!(json["label"], "gear");
    }
}
