use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use super::{format_datetime, parse_datetime, StoreError};
use crate::models::WaterIntake;

pub struct WaterIntakeRepository {
    pool: SqlitePool,
    // Serializes the check-then-write below so two saves for the same
    // (user, day) cannot both observe "no row" and insert twice.
    upsert_lock: Mutex<()>,
}

#[derive(sqlx::FromRow)]
struct WaterIntakeRow {
    id: i64,
    user_id: i64,
    glasses: i64,
    day: String,
    created_at: String,
    updated_at: String,
}

impl From<WaterIntakeRow> for WaterIntake {
    fn from(row: WaterIntakeRow) -> Self {
        WaterIntake {
            id: row.id,
            user_id: row.user_id,
            glasses: row.glasses,
            day: NaiveDate::parse_from_str(&row.day, "%Y-%m-%d")
                .unwrap_or_else(|_| Utc::now().date_naive()),
            created_at: parse_datetime(&row.created_at),
            updated_at: parse_datetime(&row.updated_at),
        }
    }
}

impl WaterIntakeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            upsert_lock: Mutex::new(()),
        }
    }

    /// Sets the day's tally. The first save of a day inserts the row;
    /// every later save replaces `glasses` in place, so the table never
    /// holds two rows for one (user, day).
    pub async fn upsert(
        &self,
        user_id: i64,
        glasses: i64,
        day: NaiveDate,
    ) -> Result<WaterIntake, StoreError> {
        let _guard = self.upsert_lock.lock().await;
        let now = format_datetime(Utc::now());

        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM water_intake WHERE user_id = ? AND day = ?")
                .bind(user_id)
                .bind(day.to_string())
                .fetch_optional(&self.pool)
                .await?;

        match existing {
            Some((id,)) => {
                sqlx::query("UPDATE water_intake SET glasses = ?, updated_at = ? WHERE id = ?")
                    .bind(glasses)
                    .bind(&now)
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO water_intake (user_id, glasses, day, created_at, updated_at)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(user_id)
                .bind(glasses)
                .bind(day.to_string())
                .bind(&now)
                .bind(&now)
                .execute(&self.pool)
                .await?;
            }
        }

        self.get_for_day(user_id, day)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn get_for_day(
        &self,
        user_id: i64,
        day: NaiveDate,
    ) -> Result<Option<WaterIntake>, StoreError> {
        let row: Option<WaterIntakeRow> =
            sqlx::query_as("SELECT * FROM water_intake WHERE user_id = ? AND day = ?")
                .bind(user_id)
                .bind(day.to_string())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(WaterIntake::from))
    }

    /// The tally for a day, 0 when nothing was saved.
    pub async fn glasses_for_day(&self, user_id: i64, day: NaiveDate) -> Result<i64, StoreError> {
        Ok(self
            .get_for_day(user_id, day)
            .await?
            .map(|intake| intake.glasses)
            .unwrap_or(0))
    }
}
