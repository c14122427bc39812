//! Marker repository.

use chrono::{DateTime, Utc};
use tracing::warn;

use super::NotificationMarker;
use crate::datetime::parse_datetime;
use crate::db::DbPool;
use crate::Result;

/// Row type for a marker from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct MarkerRow {
    topic: String,
    link: String,
    title: String,
    notified_at: String,
}

impl From<MarkerRow> for NotificationMarker {
    /// An unreadable `notified_at` is logged and read as the epoch. The link
    /// is still returned, so novelty checks keep working.
    fn from(row: MarkerRow) -> Self {
        let notified_at = parse_datetime(&row.notified_at).unwrap_or_else(|| {
            warn!(
                "Marker for topic {} has unreadable notified_at {:?}",
                row.topic, row.notified_at
            );
            DateTime::default()
        });
        NotificationMarker {
            topic: row.topic,
            link: row.link,
            title: row.title,
            notified_at,
        }
    }
}

/// Repository for per-topic notification markers.
pub struct MarkerRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> MarkerRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Get the marker for a topic.
    pub async fn get(&self, topic: &str) -> Result<Option<NotificationMarker>> {
        let row = sqlx::query_as::<_, MarkerRow>(
            r#"
            SELECT topic, link, title, notified_at
            FROM notification_markers
            WHERE topic = $1
            "#,
        )
        .bind(topic)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(NotificationMarker::from))
    }

    /// Insert or overwrite the marker for a topic.
    pub async fn upsert(
        &self,
        topic: &str,
        link: &str,
        title: &str,
        notified_at: DateTime<Utc>,
    ) -> Result<NotificationMarker> {
        sqlx::query(
            r#"
            INSERT INTO notification_markers (topic, link, title, notified_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT(topic) DO UPDATE SET
                link = excluded.link,
                title = excluded.title,
                notified_at = excluded.notified_at
            "#,
        )
        .bind(topic)
        .bind(link)
        .bind(title)
        .bind(notified_at.to_rfc3339())
        .execute(self.pool)
        .await?;

        Ok(NotificationMarker {
            topic: topic.to_string(),
            link: link.to_string(),
            title: title.to_string(),
            notified_at,
        })
    }

    /// List all markers ordered by topic.
    pub async fn list(&self) -> Result<Vec<NotificationMarker>> {
        let rows = sqlx::query_as::<_, MarkerRow>(
            r#"
            SELECT topic, link, title, notified_at
            FROM notification_markers
            ORDER BY topic ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(NotificationMarker::from).collect())
    }
}
