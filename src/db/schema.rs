//! Embedded schema migrations. Each entry is applied once, in order.

/// Migration scripts indexed by version - 1.
pub const MIGRATIONS: &[&str] = &[
    // v1: per-topic "last notified" marker
    r#"
    CREATE TABLE notification_markers (
        topic        TEXT PRIMARY KEY,
        link         TEXT NOT NULL,
        title        TEXT NOT NULL,
        notified_at  TEXT NOT NULL
    );
    "#,
];
