use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::{format_datetime, parse_datetime, StoreError};
use crate::models::Session;

pub struct SessionRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: i64,
    user_id: i64,
    session_token: String,
    expires_at: String,
    created_at: String,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            user_id: row.user_id,
            session_token: row.session_token,
            expires_at: parse_datetime(&row.expires_at),
            created_at: parse_datetime(&row.created_at),
        }
    }
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (user_id, session_token, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(format_datetime(expires_at))
        .bind(format_datetime(Utc::now()))
        .execute(&self.pool)
        .await?;

        self.find_by_token(token).await?.ok_or(StoreError::NotFound)
    }

    /// Looks a session up regardless of expiry.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let row: Option<SessionRow> =
            sqlx::query_as("SELECT * FROM sessions WHERE session_token = ?")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Session::from))
    }

    /// The validity check: the row must exist and expires_at must still be
    /// in the future at the moment of the query.
    pub async fn find_valid(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT * FROM sessions WHERE session_token = ? AND expires_at > ?",
        )
        .bind(token)
        .bind(format_datetime(Utc::now()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Session::from))
    }

    pub async fn delete(&self, token: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE session_token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Removes every session a user holds. Login calls this before
    /// creating the replacement, so one session exists per user.
    pub async fn delete_for_user(&self, user_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_db, UserRepository};
    use crate::models::User;
    use chrono::Duration;
    use tempfile::TempDir;

    struct TestContext {
        repo: SessionRepository,
        pool: SqlitePool,
        _temp_dir: TempDir,
    }

    async fn setup() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(temp_dir.path().join("test.db")).await.unwrap();

        // Sessions join to users through a foreign key
        let users = UserRepository::new(pool.clone());
        for (id, name) in [(1, "jdoe"), (2, "asmith")] {
            users
                .insert(&User {
                    id,
                    username: name.to_string(),
                    email: format!("{}@example.com", name),
                    password_hash: "$2b$12$sample".to_string(),
                    first_name: "Test".to_string(),
                    last_name: "User".to_string(),
                    phone: String::new(),
                    date_of_birth: String::new(),
                    gender: String::new(),
                    height: None,
                    weight: None,
                    blood_pressure_systolic: None,
                    blood_pressure_diastolic: None,
                    diabetes_type: None,
                    treatment_type: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        TestContext {
            repo: SessionRepository::new(pool.clone()),
            pool,
            _temp_dir: temp_dir,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_valid() {
        let ctx = setup().await;
        let expires = Utc::now() + Duration::days(30);

        let created = ctx.repo.create(1, "token-a", expires).await.unwrap();
        assert_eq!(created.user_id, 1);

        let found = ctx.repo.find_valid("token-a").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);

        assert!(ctx.repo.find_valid("token-b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_invisible_to_find_valid() {
        let ctx = setup().await;
        let expired = Utc::now() - Duration::hours(1);

        ctx.repo.create(1, "stale", expired).await.unwrap();

        assert!(ctx.repo.find_valid("stale").await.unwrap().is_none());
        // still physically present
        assert!(ctx.repo.find_by_token("stale").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_mutating_expiry_invalidates_token() {
        let ctx = setup().await;
        ctx.repo
            .create(1, "token-a", Utc::now() + Duration::days(30))
            .await
            .unwrap();
        assert!(ctx.repo.find_valid("token-a").await.unwrap().is_some());

        sqlx::query("UPDATE sessions SET expires_at = ? WHERE session_token = ?")
            .bind(format_datetime(Utc::now() - Duration::days(1)))
            .bind("token-a")
            .execute(&ctx.pool)
            .await
            .unwrap();

        assert!(ctx.repo.find_valid("token-a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_for_user_leaves_other_users_alone() {
        let ctx = setup().await;
        let expires = Utc::now() + Duration::days(30);
        ctx.repo.create(1, "first", expires).await.unwrap();
        ctx.repo.create(1, "second", expires).await.unwrap();
        ctx.repo.create(2, "other", expires).await.unwrap();

        let removed = ctx.repo.delete_for_user(1).await.unwrap();
        assert_eq!(removed, 2);

        assert!(ctx.repo.find_valid("first").await.unwrap().is_none());
        assert!(ctx.repo.find_valid("second").await.unwrap().is_none());
        assert!(ctx.repo.find_valid("other").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_token_is_rejected() {
        let ctx = setup().await;
        let expires = Utc::now() + Duration::days(30);
        ctx.repo.create(1, "token-a", expires).await.unwrap();

        let err = ctx.repo.create(2, "token-a", expires).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(_)));
    }
}
