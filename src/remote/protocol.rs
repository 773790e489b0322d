//! Wire types for the backend's JSON API.
//!
//! The user and home endpoints wrap replies in `{status, message, data}`;
//! the meal and calendar endpoints use a `{success, ...}` flag envelope.
//! Both shapes are modeled here so the client never digs through loose
//! JSON maps. Field names use snake_case to match the backend.

use serde::{Deserialize, Serialize};

use crate::db::parse_datetime;
use crate::models::{MealLog, MealType, NewUser, ProfileUpdate, User};

/// Actions accepted by `POST /users`. The backend dispatches on the
/// `action` field of the JSON body.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UserAction {
    Register {
        username: String,
        email: String,
        password: String,
        confirm_password: String,
        first_name: String,
        last_name: String,
        phone: String,
        date_of_birth: String,
        gender: String,
    },
    Login {
        username: String,
        password: String,
    },
    Logout {
        session_token: String,
    },
    UpdateProfile {
        session_token: String,
        #[serde(flatten)]
        fields: ProfileUpdate,
    },
}

impl UserAction {
    /// Build a register action from the raw signup input. `NewUser` is
    /// deliberately not serializable; the plaintext password only goes
    /// on the wire through this type.
    pub fn register(user: &NewUser) -> Self {
        UserAction::Register {
            username: user.username.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            confirm_password: user.confirm_password.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            date_of_birth: user.date_of_birth.clone(),
            gender: user.gender.clone(),
        }
    }
}

/// Actions accepted by `POST /calendar`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CalendarAction {
    SaveWater { user_id: i64, glasses: i64 },
}

/// Body for `POST /meals/save`. Predefined foods reference a catalog
/// option by id; custom foods use id -1 and carry their own name.
#[derive(Debug, Clone, Serialize)]
pub struct SaveMealRequest {
    pub user_id: i64,
    pub meal_type: String,
    pub portion_size: f64,
    pub calories: i64,
    pub is_custom: bool,
    pub meal_option: MealOptionRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealOptionRef {
    pub id: i64,
    pub name: String,
    pub description: String,
}

impl SaveMealRequest {
    pub fn from_log(log: &MealLog) -> Self {
        SaveMealRequest {
            user_id: log.user_id,
            meal_type: log.meal_type.as_str().to_string(),
            portion_size: log.portion_size,
            calories: log.calories,
            is_custom: log.is_custom,
            meal_option: MealOptionRef {
                id: log.meal_option_id,
                name: log.meal_option_name.clone(),
                description: log.meal_option_description.clone().unwrap_or_default(),
            },
        }
    }
}

/// `{status, message, data}` reply used by the user and home endpoints.
/// Error replies omit `data` entirely.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// `{success, message, data}` reply used by the meal and calendar
/// endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct FlagEnvelope<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Calendar list replies put the rows under `meals` instead of `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct MealsEnvelope {
    pub success: bool,
    #[serde(default)]
    pub meals: Vec<CalendarMeal>,
    #[serde(default)]
    pub count: i64,
}

/// Payload of a successful register or login. Carries the identity block
/// plus the freshly minted session.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthData {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub gender: String,
    pub session_token: String,
    pub expires_at: String,
}

/// Full profile as returned by `action=profile` and `update_profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileData {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub gender: String,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub blood_pressure_systolic: Option<i64>,
    pub blood_pressure_diastolic: Option<i64>,
    pub diabetes_type: Option<String>,
    pub treatment_type: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl From<ProfileData> for User {
    fn from(p: ProfileData) -> Self {
        User {
            id: p.id,
            username: p.username,
            email: p.email,
            // The backend never ships password hashes.
            password_hash: String::new(),
            first_name: p.first_name,
            last_name: p.last_name,
            phone: p.phone,
            date_of_birth: p.date_of_birth,
            gender: p.gender,
            height: p.height,
            weight: p.weight,
            blood_pressure_systolic: p.blood_pressure_systolic,
            blood_pressure_diastolic: p.blood_pressure_diastolic,
            diabetes_type: p.diabetes_type,
            treatment_type: p.treatment_type,
            created_at: parse_datetime(&p.created_at),
            updated_at: parse_datetime(&p.updated_at),
        }
    }
}

/// Payload of `action=verify`: the profile plus the session expiry, so a
/// single round trip can refresh both caches.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyData {
    #[serde(flatten)]
    pub profile: ProfileData,
    pub expires_at: String,
}

/// A meal log row as the meal endpoints return it.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteMealLog {
    pub id: i64,
    pub user_id: i64,
    pub meal_type: String,
    pub meal_option_id: i64,
    pub meal_option_name: String,
    pub meal_option_description: Option<String>,
    pub portion_size: f64,
    pub calories: i64,
    pub is_custom: bool,
    pub logged_at: String,
}

impl From<RemoteMealLog> for MealLog {
    fn from(r: RemoteMealLog) -> Self {
        MealLog {
            id: r.id,
            user_id: r.user_id,
            meal_type: r.meal_type.parse().unwrap_or(MealType::Dinner),
            meal_option_id: r.meal_option_id,
            meal_option_name: r.meal_option_name,
            meal_option_description: r.meal_option_description,
            portion_size: r.portion_size,
            calories: r.calories,
            is_custom: r.is_custom,
            logged_at: parse_datetime(&r.logged_at),
        }
    }
}

/// Calendar view of a meal. `logged_at` is epoch milliseconds; `date`
/// is only present on month queries.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarMeal {
    pub id: i64,
    pub meal_type: String,
    pub meal_option_name: String,
    pub meal_option_description: Option<String>,
    pub portion_size: f64,
    pub calories: i64,
    pub is_custom: bool,
    pub date: Option<String>,
    pub logged_at: i64,
}

/// Payload of `GET /meals/today`.
#[derive(Debug, Clone, Deserialize)]
pub struct TodayData {
    pub meals: Vec<RemoteMealLog>,
    pub summary: TodaySummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TodaySummary {
    pub total_calories: i64,
    pub meals_count: i64,
    #[serde(default)]
    pub breakfast: Vec<RemoteMealLog>,
    #[serde(default)]
    pub lunch: Vec<RemoteMealLog>,
    #[serde(default)]
    pub dinner: Vec<RemoteMealLog>,
}

/// History row from `GET /home?action=meal_history`. The backend
/// pre-splits the timestamp into `date` and `time` for display.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryMeal {
    pub id: i64,
    pub meal_type: String,
    pub meal_name: String,
    #[serde(default)]
    pub description: String,
    pub portion_size: f64,
    pub calories: i64,
    pub is_custom: bool,
    pub logged_at: String,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryData {
    pub meals: Vec<HistoryMeal>,
    pub pagination: Pagination,
}

/// Payload of `GET /home?action=dashboard_data`.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardData {
    pub user: DashboardUser,
    pub meal_status: MealStatus,
    pub progress: Progress,
    pub date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardUser {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MealStatus {
    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Progress {
    pub calories_consumed: i64,
    pub calories_goal: i64,
    pub water_intake: i64,
    pub water_goal: i64,
    pub meals_completed: i64,
    pub meals_total: i64,
}

/// Payload of `action=water_intake`. The backend reports zero glasses
/// when no row exists for the day.
#[derive(Debug, Clone, Deserialize)]
pub struct WaterLevel {
    pub glasses: i64,
    pub date: String,
}

/// Payload of a successful `save_water`.
#[derive(Debug, Clone, Deserialize)]
pub struct WaterSaved {
    pub user_id: i64,
    pub glasses: i64,
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_action_serializes_tag() {
        let action = UserAction::Login {
            username: "jdoe".to_string(),
            password: "hunter22".to_string(),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], "login");
        assert_eq!(json["username"], "jdoe");
        assert_eq!(json["password"], "hunter22");
    }

    #[test]
    fn test_update_profile_flattens_fields() {
        let action = UserAction::UpdateProfile {
            session_token: "tok".to_string(),
            fields: ProfileUpdate {
                phone: Some("555-0100".to_string()),
                weight: Some(150.0),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], "update_profile");
        assert_eq!(json["session_token"], "tok");
        assert_eq!(json["phone"], "555-0100");
        assert_eq!(json["weight"], 150.0);
        // None fields stay off the wire
        assert!(json.get("first_name").is_none());
    }

    #[test]
    fn test_save_water_action() {
        let action = CalendarAction::SaveWater {
            user_id: 7,
            glasses: 5,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], "save_water");
        assert_eq!(json["user_id"], 7);
        assert_eq!(json["glasses"], 5);
    }

    #[test]
    fn test_save_meal_request_from_custom_log() {
        let log = MealLog::custom(3, MealType::Lunch, "Leftover stew", None, 1.0, 420);
        let req = SaveMealRequest::from_log(&log);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["meal_type"], "lunch");
        assert_eq!(json["is_custom"], true);
        assert_eq!(json["meal_option"]["id"], -1);
        assert_eq!(json["meal_option"]["name"], "Leftover stew");
        assert_eq!(json["meal_option"]["description"], "");
    }

    #[test]
    fn test_envelope_error_has_no_data() {
        let body = r#"{"status":"error","message":"Invalid username or password"}"#;
        let env: Envelope<AuthData> = serde_json::from_str(body).unwrap();
        assert!(!env.is_success());
        assert_eq!(env.message, "Invalid username or password");
        assert!(env.data.is_none());
    }

    #[test]
    fn test_auth_data_parses_login_reply() {
        let body = r#"{
            "status": "success",
            "message": "Login successful",
            "data": {
                "user_id": 12,
                "username": "jdoe",
                "email": "jdoe@example.com",
                "first_name": "Jane",
                "last_name": "Doe",
                "phone": "555-0100",
                "date_of_birth": "1990-04-02",
                "gender": "Female",
                "session_token": "abc123",
                "expires_at": "2025-07-01 12:00:00"
            }
        }"#;
        let env: Envelope<AuthData> = serde_json::from_str(body).unwrap();
        assert!(env.is_success());
        let data = env.data.unwrap();
        assert_eq!(data.user_id, 12);
        assert_eq!(data.session_token, "abc123");
        assert_eq!(data.expires_at, "2025-07-01 12:00:00");
    }

    #[test]
    fn test_profile_data_hydrates_user() {
        let body = r#"{
            "id": 12,
            "username": "jdoe",
            "email": "jdoe@example.com",
            "first_name": "Jane",
            "last_name": "Doe",
            "phone": "",
            "date_of_birth": "1990-04-02",
            "gender": "Female",
            "height": 66.0,
            "weight": null,
            "blood_pressure_systolic": 118,
            "blood_pressure_diastolic": null,
            "diabetes_type": "none",
            "treatment_type": "",
            "created_at": "2025-01-10 09:30:00",
            "updated_at": "2025-02-01 10:00:00"
        }"#;
        let profile: ProfileData = serde_json::from_str(body).unwrap();
        let user: User = profile.into();
        assert_eq!(user.id, 12);
        assert_eq!(user.height, Some(66.0));
        assert_eq!(user.weight, None);
        assert_eq!(user.blood_pressure_systolic, Some(118));
        assert!(user.password_hash.is_empty());
        assert_eq!(user.created_at.format("%Y-%m-%d").to_string(), "2025-01-10");
    }

    #[test]
    fn test_verify_data_flattens_profile() {
        let body = r#"{
            "id": 12,
            "username": "jdoe",
            "email": "jdoe@example.com",
            "first_name": "Jane",
            "last_name": "Doe",
            "height": null,
            "weight": null,
            "blood_pressure_systolic": null,
            "blood_pressure_diastolic": null,
            "expires_at": "2025-07-01 12:00:00"
        }"#;
        let verify: VerifyData = serde_json::from_str(body).unwrap();
        assert_eq!(verify.profile.username, "jdoe");
        assert_eq!(verify.expires_at, "2025-07-01 12:00:00");
    }

    #[test]
    fn test_remote_meal_log_hydrates_model() {
        let body = r#"{
            "id": 44,
            "user_id": 12,
            "meal_type": "breakfast",
            "meal_option_id": 3,
            "meal_option_name": "Oatmeal",
            "meal_option_description": "Steel cut oats",
            "portion_size": 1.5,
            "calories": 525,
            "is_custom": false,
            "logged_at": "2025-03-04 08:15:00"
        }"#;
        let remote: RemoteMealLog = serde_json::from_str(body).unwrap();
        let log: MealLog = remote.into();
        assert_eq!(log.meal_type, MealType::Breakfast);
        assert_eq!(log.calories, 525);
        assert_eq!(log.logged_at.format("%H:%M").to_string(), "08:15");
    }

    #[test]
    fn test_meals_envelope_with_epoch_timestamps() {
        let body = r#"{
            "success": true,
            "meals": [{
                "id": 9,
                "meal_type": "dinner",
                "meal_option_name": "Grilled salmon",
                "meal_option_description": null,
                "portion_size": 1.0,
                "calories": 450,
                "is_custom": false,
                "date": "2025-03-04",
                "logged_at": 1741075200000
            }],
            "count": 1
        }"#;
        let env: MealsEnvelope = serde_json::from_str(body).unwrap();
        assert!(env.success);
        assert_eq!(env.count, 1);
        assert_eq!(env.meals[0].logged_at, 1741075200000);
        assert_eq!(env.meals[0].date.as_deref(), Some("2025-03-04"));
    }

    #[test]
    fn test_date_meals_omit_date_field() {
        let body = r#"{
            "success": true,
            "meals": [{
                "id": 9,
                "meal_type": "dinner",
                "meal_option_name": "Grilled salmon",
                "meal_option_description": null,
                "portion_size": 1.0,
                "calories": 450,
                "is_custom": false,
                "logged_at": 1741075200000
            }],
            "count": 1
        }"#;
        let env: MealsEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(env.meals[0].date, None);
    }

    #[test]
    fn test_dashboard_data_parses() {
        let body = r#"{
            "user": {"id": 12, "username": "jdoe", "first_name": "Jane", "last_name": "Doe"},
            "meal_status": {"breakfast": true, "lunch": false, "dinner": false},
            "progress": {
                "calories_consumed": 320,
                "calories_goal": 2000,
                "water_intake": 3,
                "water_goal": 8,
                "meals_completed": 1,
                "meals_total": 3
            },
            "date": "2025-03-04"
        }"#;
        let dash: DashboardData = serde_json::from_str(body).unwrap();
        assert!(dash.meal_status.breakfast);
        assert!(!dash.meal_status.dinner);
        assert_eq!(dash.progress.calories_goal, 2000);
        assert_eq!(dash.progress.water_goal, 8);
    }

    #[test]
    fn test_history_data_pagination() {
        let body = r#"{
            "meals": [{
                "id": 5,
                "meal_type": "lunch",
                "meal_name": "Custom Meal",
                "description": "",
                "portion_size": 1.0,
                "calories": 600,
                "is_custom": true,
                "logged_at": "2025-03-03 12:30:00",
                "date": "2025-03-03",
                "time": "12:30"
            }],
            "pagination": {"total": 41, "limit": 20, "offset": 20, "has_more": true}
        }"#;
        let history: HistoryData = serde_json::from_str(body).unwrap();
        assert_eq!(history.meals.len(), 1);
        assert_eq!(history.meals[0].meal_name, "Custom Meal");
        assert!(history.pagination.has_more);
        assert_eq!(history.pagination.total, 41);
    }

    #[test]
    fn test_water_level_defaults_to_zero_row() {
        let body = r#"{"success": true, "data": {"glasses": 0, "date": "2025-03-04"}}"#;
        let env: FlagEnvelope<WaterLevel> = serde_json::from_str(body).unwrap();
        assert!(env.success);
        assert_eq!(env.data.unwrap().glasses, 0);
    }
}
