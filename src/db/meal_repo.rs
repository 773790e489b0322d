use chrono::NaiveDate;
use sqlx::SqlitePool;

use super::{format_datetime, parse_datetime, StoreError};
use crate::models::{MealLog, MealType};

pub struct MealLogRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct MealLogRow {
    id: i64,
    user_id: i64,
    meal_type: String,
    meal_option_id: i64,
    meal_option_name: String,
    meal_option_description: Option<String>,
    portion_size: f64,
    calories: i64,
    is_custom: i64,
    logged_at: String,
}

impl From<MealLogRow> for MealLog {
    fn from(row: MealLogRow) -> Self {
        MealLog {
            id: row.id,
            user_id: row.user_id,
            meal_type: row.meal_type.parse().unwrap_or(MealType::Dinner),
            meal_option_id: row.meal_option_id,
            meal_option_name: row.meal_option_name,
            meal_option_description: row.meal_option_description,
            portion_size: row.portion_size,
            calories: row.calories,
            is_custom: row.is_custom != 0,
            logged_at: parse_datetime(&row.logged_at),
        }
    }
}

impl MealLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a log and returns it with the assigned row id.
    pub async fn insert(&self, log: &MealLog) -> Result<MealLog, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO meal_logs (
                user_id, meal_type, meal_option_id, meal_option_name,
                meal_option_description, portion_size, calories, is_custom, logged_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(log.user_id)
        .bind(log.meal_type.as_str())
        .bind(log.meal_option_id)
        .bind(&log.meal_option_name)
        .bind(&log.meal_option_description)
        .bind(log.portion_size)
        .bind(log.calories)
        .bind(log.is_custom as i64)
        .bind(format_datetime(log.logged_at))
        .execute(&self.pool)
        .await?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<MealLog>, StoreError> {
        let row: Option<MealLogRow> = sqlx::query_as("SELECT * FROM meal_logs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(MealLog::from))
    }

    pub async fn for_day(&self, user_id: i64, day: NaiveDate) -> Result<Vec<MealLog>, StoreError> {
        let rows: Vec<MealLogRow> = sqlx::query_as(
            "SELECT * FROM meal_logs WHERE user_id = ? AND DATE(logged_at) = ? ORDER BY logged_at",
        )
        .bind(user_id)
        .bind(day.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MealLog::from).collect())
    }

    pub async fn for_month(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<MealLog>, StoreError> {
        let rows: Vec<MealLogRow> = sqlx::query_as(
            r#"
            SELECT * FROM meal_logs
            WHERE user_id = ?
              AND strftime('%Y', logged_at) = ?
              AND strftime('%m', logged_at) = ?
            ORDER BY logged_at
            "#,
        )
        .bind(user_id)
        .bind(format!("{:04}", year))
        .bind(format!("{:02}", month))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MealLog::from).collect())
    }

    /// Newest-first page of everything the user has logged.
    pub async fn history(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MealLog>, StoreError> {
        let rows: Vec<MealLogRow> = sqlx::query_as(
            "SELECT * FROM meal_logs WHERE user_id = ? ORDER BY logged_at DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MealLog::from).collect())
    }
}
