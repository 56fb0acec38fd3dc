use chrono::{DateTime, Utc};

/// Single timestamp source for `created_at`/`updated_at` stamps.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
