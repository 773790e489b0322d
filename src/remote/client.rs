//! HTTP gateway to the backend API.
//!
//! One reqwest client with a fixed per-request timeout and no retries.
//! Each method maps a single endpoint; deciding what a failure means
//! (offline vs. rejected) is the coordinator's job, not this layer's.

use std::time::Duration;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::ApiError;
use super::protocol::{
    AuthData, CalendarAction, CalendarMeal, DashboardData, Envelope, FlagEnvelope, HistoryData,
    MealsEnvelope, ProfileData, RemoteMealLog, SaveMealRequest, TodayData, UserAction, VerifyData,
    WaterLevel, WaterSaved,
};
use crate::models::{MealLog, MealOption, MealType, NewUser, ProfileUpdate};

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// The reachability probe either answers fast or counts as down.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// Client for the backend's JSON API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<(u16, String), ApiError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok((status, text))
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<(u16, String), ApiError> {
        let response = self.http.get(self.url(path)).query(query).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok((status, text))
    }

    /// Register a new account. Returns the identity block with a fresh
    /// session token.
    pub async fn register(&self, user: &NewUser) -> Result<AuthData, ApiError> {
        let (status, body) = self.post_json("/users", &UserAction::register(user)).await?;
        parse_envelope(status, &body)
    }

    /// Log in with a username or email plus password.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AuthData, ApiError> {
        let action = UserAction::Login {
            username: identifier.to_string(),
            password: password.to_string(),
        };
        let (status, body) = self.post_json("/users", &action).await?;
        parse_envelope(status, &body)
    }

    /// Invalidate a session token server-side.
    pub async fn logout(&self, session_token: &str) -> Result<(), ApiError> {
        let action = UserAction::Logout {
            session_token: session_token.to_string(),
        };
        let (status, body) = self.post_json("/users", &action).await?;
        envelope_ack(status, &body)
    }

    /// Check a session token and get the refreshed profile back.
    pub async fn verify(&self, session_token: &str) -> Result<VerifyData, ApiError> {
        let query = [
            ("action", "verify".to_string()),
            ("session_token", session_token.to_string()),
        ];
        let (status, body) = self.get("/users", &query).await?;
        parse_envelope(status, &body)
    }

    /// Fetch the full profile for the session's user.
    pub async fn profile(&self, session_token: &str) -> Result<ProfileData, ApiError> {
        let query = [
            ("action", "profile".to_string()),
            ("session_token", session_token.to_string()),
        ];
        let (status, body) = self.get("/users", &query).await?;
        parse_envelope(status, &body)
    }

    /// Apply a partial profile edit. Returns the profile as the server
    /// now sees it.
    pub async fn update_profile(
        &self,
        session_token: &str,
        fields: &ProfileUpdate,
    ) -> Result<ProfileData, ApiError> {
        let action = UserAction::UpdateProfile {
            session_token: session_token.to_string(),
            fields: fields.clone(),
        };
        let (status, body) = self.post_json("/users", &action).await?;
        parse_envelope(status, &body)
    }

    /// Save a meal log. The server answers 201 with the stored row.
    pub async fn save_meal(&self, log: &MealLog) -> Result<RemoteMealLog, ApiError> {
        let request = SaveMealRequest::from_log(log);
        let (status, body) = self.post_json("/meals/save", &request).await?;
        parse_flag_envelope(status, &body)
    }

    /// List the food catalog, optionally narrowed to one meal type.
    pub async fn meal_options(
        &self,
        meal_type: Option<MealType>,
    ) -> Result<Vec<MealOption>, ApiError> {
        let mut query = Vec::new();
        if let Some(t) = meal_type {
            query.push(("type", t.as_str().to_string()));
        }
        let (status, body) = self.get("/meals", &query).await?;
        parse_flag_envelope(status, &body)
    }

    /// Today's meals plus the computed summary block.
    pub async fn meals_today(&self, user_id: i64) -> Result<TodayData, ApiError> {
        let query = [("user_id", user_id.to_string())];
        let (status, body) = self.get("/meals/today", &query).await?;
        parse_flag_envelope(status, &body)
    }

    /// Meals for a calendar month.
    pub async fn month_meals(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<CalendarMeal>, ApiError> {
        let query = [
            ("action", "month_meals".to_string()),
            ("user_id", user_id.to_string()),
            ("year", year.to_string()),
            ("month", month.to_string()),
        ];
        let (status, body) = self.get("/calendar", &query).await?;
        parse_meals_envelope(status, &body)
    }

    /// Meals for a single date.
    pub async fn date_meals(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<CalendarMeal>, ApiError> {
        let query = [
            ("action", "get_date_meals".to_string()),
            ("user_id", user_id.to_string()),
            ("date", date.format("%Y-%m-%d").to_string()),
        ];
        let (status, body) = self.get("/calendar", &query).await?;
        parse_meals_envelope(status, &body)
    }

    /// Glasses recorded for a date; zero when no row exists.
    pub async fn water_intake(&self, user_id: i64, date: NaiveDate) -> Result<WaterLevel, ApiError> {
        let query = [
            ("action", "water_intake".to_string()),
            ("user_id", user_id.to_string()),
            ("date", date.format("%Y-%m-%d").to_string()),
        ];
        let (status, body) = self.get("/calendar", &query).await?;
        parse_flag_envelope(status, &body)
    }

    /// Set today's glass count. The server upserts per user and day.
    pub async fn save_water(&self, user_id: i64, glasses: i64) -> Result<WaterSaved, ApiError> {
        let action = CalendarAction::SaveWater { user_id, glasses };
        let (status, body) = self.post_json("/calendar", &action).await?;
        parse_flag_envelope(status, &body)
    }

    /// Home screen aggregate: meal status, progress, goals.
    pub async fn dashboard(&self, session_token: &str) -> Result<DashboardData, ApiError> {
        let query = [
            ("action", "dashboard_data".to_string()),
            ("session_token", session_token.to_string()),
        ];
        let (status, body) = self.get("/home", &query).await?;
        parse_envelope(status, &body)
    }

    /// Paginated meal history with display-ready rows.
    pub async fn meal_history(
        &self,
        session_token: &str,
        limit: i64,
        offset: i64,
    ) -> Result<HistoryData, ApiError> {
        let query = [
            ("action", "meal_history".to_string()),
            ("session_token", session_token.to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        let (status, body) = self.get("/home", &query).await?;
        parse_envelope(status, &body)
    }

    /// Cheap reachability probe. Never errors; unreachable means false.
    pub async fn health(&self) -> bool {
        let result = self
            .http
            .get(self.url("/health"))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await;
        matches!(result, Ok(response) if response.status().is_success())
    }
}

fn is_http_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Pull a human-readable message out of an error body. The user and home
/// endpoints use `message`, the meal and calendar endpoints use `error`.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(String::from))
}

fn server_error(status: u16, body: &str) -> ApiError {
    let message = extract_message(body).unwrap_or_else(|| format!("HTTP {}", status));
    ApiError::Server { status, message }
}

fn parse_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    if !is_http_success(status) {
        return Err(server_error(status, body));
    }
    let envelope: Envelope<T> =
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
    if !envelope.is_success() {
        return Err(ApiError::Server {
            status,
            message: envelope.message,
        });
    }
    envelope
        .data
        .ok_or_else(|| ApiError::InvalidResponse("reply carried no data".to_string()))
}

/// Like `parse_envelope` but for replies whose data block is noise
/// (logout sends an empty array).
fn envelope_ack(status: u16, body: &str) -> Result<(), ApiError> {
    if !is_http_success(status) {
        return Err(server_error(status, body));
    }
    let envelope: Envelope<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
    if !envelope.is_success() {
        return Err(ApiError::Server {
            status,
            message: envelope.message,
        });
    }
    Ok(())
}

fn parse_flag_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    if !is_http_success(status) {
        return Err(server_error(status, body));
    }
    let envelope: FlagEnvelope<T> =
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
    if !envelope.success {
        return Err(ApiError::Server {
            status,
            message: envelope
                .message
                .unwrap_or_else(|| "request failed".to_string()),
        });
    }
    envelope
        .data
        .ok_or_else(|| ApiError::InvalidResponse("reply carried no data".to_string()))
}

fn parse_meals_envelope(status: u16, body: &str) -> Result<Vec<CalendarMeal>, ApiError> {
    if !is_http_success(status) {
        return Err(server_error(status, body));
    }
    let envelope: MealsEnvelope =
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
    if !envelope.success {
        return Err(ApiError::Server {
            status,
            message: "request failed".to_string(),
        });
    }
    Ok(envelope.meals)
}
