use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cached session row. Validity is decided at query time: a session is
/// live iff `expires_at` is strictly in the future.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
