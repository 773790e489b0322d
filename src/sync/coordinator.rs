//! Decides, per operation, which side answers and what an unreachable
//! server means.
//!
//! Writes that must be authoritative (registration, meal logging, water)
//! go to the server or fail with `NoConnectivity`. Reads that have a
//! local mirror (session verification, meal history, today's meals) fall
//! back to the cache and say so through [`DataSource`]. Custom foods are
//! the one local-first write: the row lands in the store immediately and
//! a spawned task pushes it upstream when the server can be reached.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::auth::credentials;
use crate::auth::{SessionContext, SessionHandle};
use crate::db::{
    parse_datetime, MealLogRepository, SessionRepository, StoreError, UserRepository,
};
use crate::models::{MealLog, MealOption, MealType, NewUser, ProfileUpdate, User};
use crate::remote::protocol::{AuthData, CalendarMeal, DashboardData, HistoryMeal, WaterLevel, WaterSaved};
use crate::remote::{ApiClient, ApiError};

use super::error::SyncError;

/// Where an answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Remote,
    LocalCache,
}

impl DataSource {
    /// True when the server never confirmed this result.
    pub fn is_offline(self) -> bool {
        matches!(self, DataSource::LocalCache)
    }
}

/// A session check that passed, with the profile that backs it.
#[derive(Debug)]
pub struct VerifiedSession {
    pub user: User,
    pub source: DataSource,
}

#[derive(Debug)]
pub struct ProfileOutcome {
    pub user: User,
    pub source: DataSource,
}

/// Logout always succeeds; this says how far it reached.
#[derive(Debug)]
pub struct LogoutOutcome {
    /// False when the server was never told; the token dies with the
    /// local state either way.
    pub remote_invalidated: bool,
}

/// Today's meals plus the running calorie total.
#[derive(Debug)]
pub struct TodayMeals {
    pub meals: Vec<MealLog>,
    pub total_calories: i64,
    pub source: DataSource,
}

/// One logged meal, normalized from either side's representation.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub meal_type: MealType,
    pub name: String,
    pub description: Option<String>,
    pub portion_size: f64,
    pub calories: i64,
    pub is_custom: bool,
    pub logged_at: DateTime<Utc>,
}

impl From<MealLog> for HistoryEntry {
    fn from(log: MealLog) -> Self {
        Self {
            meal_type: log.meal_type,
            name: log.meal_option_name,
            description: log.meal_option_description,
            portion_size: log.portion_size,
            calories: log.calories,
            is_custom: log.is_custom,
            logged_at: log.logged_at,
        }
    }
}

impl From<HistoryMeal> for HistoryEntry {
    fn from(meal: HistoryMeal) -> Self {
        Self {
            meal_type: meal.meal_type.parse().unwrap_or(MealType::Dinner),
            name: meal.meal_name,
            description: if meal.description.is_empty() {
                None
            } else {
                Some(meal.description)
            },
            portion_size: meal.portion_size,
            calories: meal.calories,
            is_custom: meal.is_custom,
            logged_at: parse_datetime(&meal.logged_at),
        }
    }
}

/// A page of history, with pagination known only when the server answered.
#[derive(Debug)]
pub struct MealHistoryPage {
    pub entries: Vec<HistoryEntry>,
    pub total: Option<i64>,
    pub has_more: Option<bool>,
    pub source: DataSource,
}

/// One meal on the calendar views.
#[derive(Debug, Clone)]
pub struct CalendarEntry {
    pub meal_type: MealType,
    pub name: String,
    pub description: Option<String>,
    pub portion_size: f64,
    pub calories: i64,
    pub is_custom: bool,
    pub date: Option<NaiveDate>,
    pub logged_at: DateTime<Utc>,
}

impl From<CalendarMeal> for CalendarEntry {
    fn from(meal: CalendarMeal) -> Self {
        Self {
            meal_type: meal.meal_type.parse().unwrap_or(MealType::Dinner),
            name: meal.meal_option_name,
            description: meal.meal_option_description,
            portion_size: meal.portion_size,
            calories: meal.calories,
            is_custom: meal.is_custom,
            date: meal
                .date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
            logged_at: DateTime::from_timestamp_millis(meal.logged_at).unwrap_or_else(Utc::now),
        }
    }
}

fn remote_error(e: ApiError) -> SyncError {
    if e.is_transport() {
        return SyncError::NoConnectivity;
    }
    match e {
        ApiError::Server { message, .. } => SyncError::Rejected(message),
        other => SyncError::Rejected(other.to_string()),
    }
}

fn login_error(e: ApiError) -> SyncError {
    match e.status() {
        Some(401) => SyncError::InvalidCredentials,
        _ => remote_error(e),
    }
}

fn register_error(e: ApiError) -> SyncError {
    match e {
        ApiError::Server {
            status: 409,
            message,
        } => SyncError::DuplicateUser(message),
        other => remote_error(other),
    }
}

fn session_error(e: ApiError) -> SyncError {
    match e.status() {
        Some(401) => SyncError::SessionExpired,
        _ => remote_error(e),
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn validate_registration(user: &NewUser) -> Result<(), SyncError> {
    let username = user.username.trim();
    if username.len() < 3 || username.len() > 50 {
        return Err(SyncError::validation(
            "username",
            "must be between 3 and 50 characters",
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(SyncError::validation(
            "username",
            "may only contain letters, digits and underscores",
        ));
    }
    if !is_valid_email(user.email.trim()) {
        return Err(SyncError::validation("email", "is not a valid address"));
    }
    if user.password.len() < 8 {
        return Err(SyncError::validation(
            "password",
            "must be at least 8 characters",
        ));
    }
    if user.password != user.confirm_password {
        return Err(SyncError::validation(
            "confirm_password",
            "does not match the password",
        ));
    }
    if user.first_name.trim().is_empty() {
        return Err(SyncError::validation("first_name", "is required"));
    }
    if user.last_name.trim().is_empty() {
        return Err(SyncError::validation("last_name", "is required"));
    }
    Ok(())
}

/// Routes every account and food-log operation between the API client
/// and the local store according to the operation's offline policy.
pub struct SyncCoordinator {
    api: ApiClient,
    users: UserRepository,
    sessions: SessionRepository,
    meals: MealLogRepository,
    context: SessionContext,
}

impl SyncCoordinator {
    pub fn new(api: ApiClient, pool: SqlitePool, context: SessionContext) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool.clone()),
            meals: MealLogRepository::new(pool),
            api,
            context,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    fn require_session(&self) -> Result<SessionHandle, SyncError> {
        self.context.current().ok_or(SyncError::SessionExpired)
    }

    /// Creates the account on the server, then caches the confirmed
    /// identity locally and signs the context in.
    pub async fn register(&self, new_user: &NewUser) -> Result<User, SyncError> {
        validate_registration(new_user)?;
        let data = self
            .api
            .register(new_user)
            .await
            .map_err(register_error)?;
        tracing::info!("Registered {} (user id {})", data.username, data.user_id);
        self.cache_authenticated(data, &new_user.password).await
    }

    /// Authenticates against the server. The identifier may be a
    /// username or an email address.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<User, SyncError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(SyncError::validation("username", "is required"));
        }
        if password.is_empty() {
            return Err(SyncError::validation("password", "is required"));
        }
        let data = self
            .api
            .login(identifier, password)
            .await
            .map_err(login_error)?;
        tracing::info!("Logged in as {}", data.username);
        self.cache_authenticated(data, password).await
    }

    /// Mirrors a fresh login into the store and the session file.
    ///
    /// The auth reply carries only the identity block, so health fields
    /// already cached for this user survive a re-login untouched. Only
    /// the bcrypt hash of the password is stored.
    async fn cache_authenticated(&self, data: AuthData, password: &str) -> Result<User, SyncError> {
        let password_hash = credentials::hash_password(password)
            .map_err(|e| SyncError::StorageUnavailable(e.to_string()))?;

        let cached = self.users.find_by_id(data.user_id).await?;
        let now = Utc::now();
        let mut user = User {
            id: data.user_id,
            username: data.username,
            email: data.email,
            password_hash,
            first_name: data.first_name,
            last_name: data.last_name,
            phone: data.phone,
            date_of_birth: data.date_of_birth,
            gender: data.gender,
            height: None,
            weight: None,
            blood_pressure_systolic: None,
            blood_pressure_diastolic: None,
            diabetes_type: None,
            treatment_type: None,
            created_at: now,
            updated_at: now,
        };
        if let Some(existing) = cached {
            user.height = existing.height;
            user.weight = existing.weight;
            user.blood_pressure_systolic = existing.blood_pressure_systolic;
            user.blood_pressure_diastolic = existing.blood_pressure_diastolic;
            user.diabetes_type = existing.diabetes_type;
            user.treatment_type = existing.treatment_type;
            user.created_at = existing.created_at;
        }
        let user = self.users.cache_profile(&user).await?;

        // The server invalidates prior sessions on login; drop ours too.
        self.sessions.delete_for_user(user.id).await?;
        self.sessions
            .create(user.id, &data.session_token, parse_datetime(&data.expires_at))
            .await?;

        self.context.set(SessionHandle {
            session_token: data.session_token,
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        })?;

        Ok(user)
    }

    /// Clears local state first, then tells the server. Nothing here can
    /// fail from the caller's point of view.
    pub async fn logout(&self) -> LogoutOutcome {
        let Some(handle) = self.context.current() else {
            return LogoutOutcome {
                remote_invalidated: false,
            };
        };
        self.context.clear();
        if let Err(e) = self.sessions.delete(&handle.session_token).await {
            tracing::warn!("Could not drop local session row: {}", e);
        }
        match self.api.logout(&handle.session_token).await {
            Ok(()) => {
                tracing::info!("Logged out {}", handle.username);
                LogoutOutcome {
                    remote_invalidated: true,
                }
            }
            Err(e) => {
                tracing::debug!("Server logout skipped: {}", e);
                LogoutOutcome {
                    remote_invalidated: false,
                }
            }
        }
    }

    /// Checks the current session against the server, refreshing the
    /// cached profile on success. When the server cannot confirm it, a
    /// locally stored unexpired session keeps the user signed in and the
    /// result says the profile came from the cache.
    pub async fn verify_session(&self) -> Result<VerifiedSession, SyncError> {
        let handle = self.require_session()?;
        match self.api.verify(&handle.session_token).await {
            Ok(data) => {
                let expires_at = parse_datetime(&data.expires_at);
                let user = User::from(data.profile);
                if let Err(e) = self
                    .refresh_local_session(&user, &handle.session_token, expires_at)
                    .await
                {
                    tracing::warn!("Could not refresh session cache: {}", e);
                }
                let refreshed = SessionHandle {
                    session_token: handle.session_token.clone(),
                    user_id: user.id,
                    username: user.username.clone(),
                    email: user.email.clone(),
                    first_name: user.first_name.clone(),
                    last_name: user.last_name.clone(),
                };
                if refreshed != handle {
                    if let Err(e) = self.context.set(refreshed) {
                        tracing::warn!("Could not refresh session file: {}", e);
                    }
                }
                Ok(VerifiedSession {
                    user,
                    source: DataSource::Remote,
                })
            }
            Err(e) => {
                tracing::debug!("Remote verify failed, checking local session: {}", e);
                match self.sessions.find_valid(&handle.session_token).await? {
                    Some(session) => {
                        let user = self
                            .users
                            .find_by_id(session.user_id)
                            .await?
                            .ok_or(SyncError::SessionExpired)?;
                        Ok(VerifiedSession {
                            user,
                            source: DataSource::LocalCache,
                        })
                    }
                    None => Err(SyncError::SessionExpired),
                }
            }
        }
    }

    async fn refresh_local_session(
        &self,
        user: &User,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.users.cache_profile(user).await?;
        if self.sessions.find_by_token(token).await?.is_none() {
            self.sessions.create(user.id, token, expires_at).await?;
        }
        Ok(())
    }

    /// Logs a meal from the predefined catalog. The server is the only
    /// writer for these; calories are computed client-side as
    /// round(base calories x portion) and echoed back.
    pub async fn save_meal(
        &self,
        meal_type: MealType,
        option: &MealOption,
        portion: f64,
    ) -> Result<MealLog, SyncError> {
        let handle = self.require_session()?;
        if portion <= 0.0 {
            return Err(SyncError::validation(
                "portion_size",
                "must be greater than zero",
            ));
        }
        let log = MealLog::predefined(handle.user_id, meal_type, option, portion);
        let saved = self.api.save_meal(&log).await.map_err(remote_error)?;
        tracing::info!("Logged {} ({} cal)", saved.meal_option_name, saved.calories);
        Ok(saved.into())
    }

    /// Saves a user-defined food locally and reports success right away.
    /// A spawned task pushes the same row upstream; its outcome is
    /// logged, never surfaced.
    pub async fn save_custom_food(
        &self,
        meal_type: MealType,
        name: &str,
        description: Option<String>,
        portion: f64,
        calories: i64,
    ) -> Result<MealLog, SyncError> {
        let handle = self.require_session()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(SyncError::validation("name", "is required"));
        }
        if portion <= 0.0 {
            return Err(SyncError::validation(
                "portion_size",
                "must be greater than zero",
            ));
        }
        if calories < 0 {
            return Err(SyncError::validation("calories", "cannot be negative"));
        }

        let log = MealLog::custom(handle.user_id, meal_type, name, description, portion, calories);
        let saved = self.meals.insert(&log).await?;
        tracing::info!("Saved custom food {} locally", saved.meal_option_name);

        let api = self.api.clone();
        let push = saved.clone();
        tokio::spawn(async move {
            if !api.health().await {
                tracing::debug!("Server unreachable, custom food push skipped");
                return;
            }
            match api.save_meal(&push).await {
                Ok(_) => tracing::debug!("Custom food {} pushed", push.meal_option_name),
                Err(e) => tracing::warn!("Custom food push failed: {}", e),
            }
        });

        Ok(saved)
    }

    /// Sets today's water total on the server.
    pub async fn save_water(&self, glasses: i64) -> Result<WaterSaved, SyncError> {
        let handle = self.require_session()?;
        if glasses < 0 {
            return Err(SyncError::validation("glasses", "cannot be negative"));
        }
        let saved = self
            .api
            .save_water(handle.user_id, glasses)
            .await
            .map_err(remote_error)?;
        tracing::info!("Water intake set to {} glasses", saved.glasses);
        Ok(saved)
    }

    pub async fn water_for_date(&self, date: NaiveDate) -> Result<WaterLevel, SyncError> {
        let handle = self.require_session()?;
        self.api
            .water_intake(handle.user_id, date)
            .await
            .map_err(remote_error)
    }

    pub async fn dashboard(&self) -> Result<DashboardData, SyncError> {
        let handle = self.require_session()?;
        self.api
            .dashboard(&handle.session_token)
            .await
            .map_err(session_error)
    }

    /// Today's log, from the server when possible and the local store
    /// otherwise.
    pub async fn meals_today(&self) -> Result<TodayMeals, SyncError> {
        let handle = self.require_session()?;
        match self.api.meals_today(handle.user_id).await {
            Ok(data) => Ok(TodayMeals {
                total_calories: data.summary.total_calories,
                meals: data.meals.into_iter().map(MealLog::from).collect(),
                source: DataSource::Remote,
            }),
            Err(e) => {
                tracing::debug!("Remote today view unavailable, serving local cache: {}", e);
                let meals = self
                    .meals
                    .for_day(handle.user_id, Utc::now().date_naive())
                    .await?;
                let total_calories = meals.iter().map(|m| m.calories).sum();
                Ok(TodayMeals {
                    meals,
                    total_calories,
                    source: DataSource::LocalCache,
                })
            }
        }
    }

    /// The predefined food catalog. Browsing it needs no session.
    pub async fn meal_options(
        &self,
        meal_type: Option<MealType>,
    ) -> Result<Vec<MealOption>, SyncError> {
        self.api.meal_options(meal_type).await.map_err(remote_error)
    }

    pub async fn meals_for_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<CalendarEntry>, SyncError> {
        let handle = self.require_session()?;
        if !(1..=12).contains(&month) {
            return Err(SyncError::validation("month", "must be between 1 and 12"));
        }
        let meals = self
            .api
            .month_meals(handle.user_id, year, month)
            .await
            .map_err(remote_error)?;
        Ok(meals.into_iter().map(CalendarEntry::from).collect())
    }

    pub async fn meals_for_date(&self, date: NaiveDate) -> Result<Vec<CalendarEntry>, SyncError> {
        let handle = self.require_session()?;
        let meals = self
            .api
            .date_meals(handle.user_id, date)
            .await
            .map_err(remote_error)?;
        Ok(meals.into_iter().map(CalendarEntry::from).collect())
    }

    /// Everything the user has logged, newest first. Served from the
    /// server with pagination when reachable, from the cache without it
    /// otherwise.
    pub async fn meal_history(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<MealHistoryPage, SyncError> {
        let handle = self.require_session()?;
        match self
            .api
            .meal_history(&handle.session_token, limit, offset)
            .await
        {
            Ok(data) => Ok(MealHistoryPage {
                entries: data.meals.into_iter().map(HistoryEntry::from).collect(),
                total: Some(data.pagination.total),
                has_more: Some(data.pagination.has_more),
                source: DataSource::Remote,
            }),
            Err(e) => {
                tracing::debug!("Remote history unavailable, serving local cache: {}", e);
                let logs = self.meals.history(handle.user_id, limit, offset).await?;
                Ok(MealHistoryPage {
                    entries: logs.into_iter().map(HistoryEntry::from).collect(),
                    total: None,
                    has_more: None,
                    source: DataSource::LocalCache,
                })
            }
        }
    }

    /// The server's copy of the profile. `verify_session` is the path
    /// that refreshes the cache; this read passes straight through.
    pub async fn profile(&self) -> Result<User, SyncError> {
        let handle = self.require_session()?;
        let profile = self
            .api
            .profile(&handle.session_token)
            .await
            .map_err(session_error)?;
        Ok(profile.into())
    }

    /// Applies profile changes on the server and mirrors them locally.
    /// When the server cannot take the write, the cache takes it instead
    /// and the outcome is marked offline.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<ProfileOutcome, SyncError> {
        let handle = self.require_session()?;
        if update.is_empty() {
            return Err(SyncError::validation("profile", "no fields to update"));
        }
        match self.api.update_profile(&handle.session_token, update).await {
            Ok(profile) => {
                let user = User::from(profile);
                if let Err(e) = self.users.cache_profile(&user).await {
                    tracing::warn!("Could not mirror profile update locally: {}", e);
                }
                tracing::info!("Profile updated");
                Ok(ProfileOutcome {
                    user,
                    source: DataSource::Remote,
                })
            }
            Err(e) => {
                tracing::debug!("Remote profile update failed, writing cache: {}", e);
                match self.users.update(handle.user_id, update).await {
                    Ok(user) => {
                        tracing::info!("Profile updated in local cache only");
                        Ok(ProfileOutcome {
                            user,
                            source: DataSource::LocalCache,
                        })
                    }
                    Err(StoreError::NotFound) => Err(SyncError::StorageUnavailable(
                        "no cached profile to update".to_string(),
                    )),
                    Err(e) => Err(SyncError::StorageUnavailable(e.to_string())),
                }
            }
        }
    }
}
