use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Daily water tally. At most one row exists per (user_id, day); repeated
/// saves for the same day replace `glasses` in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterIntake {
    pub id: i64,
    pub user_id: i64,
    pub glasses: i64,
    pub day: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for WaterIntake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} glasses", self.day, self.glasses)
    }
}
