use sqlx::SqlitePool;

use super::{format_datetime, parse_datetime, StoreError};
use crate::models::{ProfileUpdate, User};

pub struct UserRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    phone: String,
    date_of_birth: String,
    gender: String,
    height: Option<f64>,
    weight: Option<f64>,
    blood_pressure_systolic: Option<i64>,
    blood_pressure_diastolic: Option<i64>,
    diabetes_type: Option<String>,
    treatment_type: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            date_of_birth: row.date_of_birth,
            gender: row.gender,
            height: row.height,
            weight: row.weight,
            blood_pressure_systolic: row.blood_pressure_systolic,
            blood_pressure_diastolic: row.blood_pressure_diastolic,
            diabetes_type: row.diabetes_type,
            treatment_type: row.treatment_type,
            created_at: parse_datetime(&row.created_at),
            updated_at: parse_datetime(&row.updated_at),
        }
    }
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a user under its server-assigned id.
    pub async fn insert(&self, user: &User) -> Result<User, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, password_hash, first_name, last_name,
                phone, date_of_birth, gender, height, weight,
                blood_pressure_systolic, blood_pressure_diastolic,
                diabetes_type, treatment_type, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(&user.date_of_birth)
        .bind(&user.gender)
        .bind(user.height)
        .bind(user.weight)
        .bind(user.blood_pressure_systolic)
        .bind(user.blood_pressure_diastolic)
        .bind(&user.diabetes_type)
        .bind(&user.treatment_type)
        .bind(format_datetime(user.created_at))
        .bind(format_datetime(user.updated_at))
        .execute(&self.pool)
        .await?;

        self.find_by_id(user.id).await?.ok_or(StoreError::NotFound)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    /// True if either the username or the email is already taken.
    pub async fn exists(&self, username: &str, email: &str) -> Result<bool, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ? OR email = ?")
                .bind(username)
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Applies a partial edit; untouched fields keep their value and
    /// updated_at is refreshed.
    pub async fn update(&self, id: i64, update: &ProfileUpdate) -> Result<User, StoreError> {
        let existing = self.find_by_id(id).await?.ok_or(StoreError::NotFound)?;

        let merged = User {
            first_name: update.first_name.clone().unwrap_or(existing.first_name),
            last_name: update.last_name.clone().unwrap_or(existing.last_name),
            phone: update.phone.clone().unwrap_or(existing.phone),
            date_of_birth: update
                .date_of_birth
                .clone()
                .unwrap_or(existing.date_of_birth),
            gender: update.gender.clone().unwrap_or(existing.gender),
            height: update.height.or(existing.height),
            weight: update.weight.or(existing.weight),
            blood_pressure_systolic: update
                .blood_pressure_systolic
                .or(existing.blood_pressure_systolic),
            blood_pressure_diastolic: update
                .blood_pressure_diastolic
                .or(existing.blood_pressure_diastolic),
            diabetes_type: update.diabetes_type.clone().or(existing.diabetes_type),
            treatment_type: update.treatment_type.clone().or(existing.treatment_type),
            ..existing
        };

        sqlx::query(
            r#"
            UPDATE users
            SET first_name = ?, last_name = ?, phone = ?, date_of_birth = ?,
                gender = ?, height = ?, weight = ?, blood_pressure_systolic = ?,
                blood_pressure_diastolic = ?, diabetes_type = ?, treatment_type = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&merged.first_name)
        .bind(&merged.last_name)
        .bind(&merged.phone)
        .bind(&merged.date_of_birth)
        .bind(&merged.gender)
        .bind(merged.height)
        .bind(merged.weight)
        .bind(merged.blood_pressure_systolic)
        .bind(merged.blood_pressure_diastolic)
        .bind(&merged.diabetes_type)
        .bind(&merged.treatment_type)
        .bind(format_datetime(chrono::Utc::now()))
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or(StoreError::NotFound)
    }

    /// Insert-or-update a profile fetched from the backend. Remote
    /// payloads never carry a password hash; an empty hash on `user`
    /// keeps whatever hash the row already has.
    pub async fn cache_profile(&self, user: &User) -> Result<User, StoreError> {
        match self.find_by_id(user.id).await? {
            None => self.insert(user).await,
            Some(existing) => {
                let password_hash = if user.password_hash.is_empty() {
                    existing.password_hash
                } else {
                    user.password_hash.clone()
                };

                sqlx::query(
                    r#"
                    UPDATE users
                    SET username = ?, email = ?, password_hash = ?, first_name = ?,
                        last_name = ?, phone = ?, date_of_birth = ?, gender = ?,
                        height = ?, weight = ?, blood_pressure_systolic = ?,
                        blood_pressure_diastolic = ?, diabetes_type = ?,
                        treatment_type = ?, updated_at = ?
                    WHERE id = ?
                    "#,
                )
                .bind(&user.username)
                .bind(&user.email)
                .bind(&password_hash)
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(&user.phone)
                .bind(&user.date_of_birth)
                .bind(&user.gender)
                .bind(user.height)
                .bind(user.weight)
                .bind(user.blood_pressure_systolic)
                .bind(user.blood_pressure_diastolic)
                .bind(&user.diabetes_type)
                .bind(&user.treatment_type)
                .bind(format_datetime(chrono::Utc::now()))
                .bind(user.id)
                .execute(&self.pool)
                .await?;

                self.find_by_id(user.id).await?.ok_or(StoreError::NotFound)
            }
        }
    }
}
