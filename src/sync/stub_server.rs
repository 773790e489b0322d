//! In-process stand-in for the backend, used by coordinator tests.
//!
//! Implements just enough of each endpoint to exercise the sync policies:
//! duplicate checks and token rotation on `/users`, recorded writes on
//! `/meals/save` and `/calendar`, and computed aggregates on `/home`.
//! Sessions never expire here; expiry behavior is tested against the
//! local store.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

pub(crate) type SharedState = Arc<Mutex<StubState>>;

#[derive(Debug, Default)]
pub(crate) struct StubState {
    pub users: Vec<StubUser>,
    /// token -> user id
    pub sessions: HashMap<String, i64>,
    minted: usize,
    /// Raw bodies received on /meals/save, in arrival order.
    pub saved_meals: Vec<Value>,
    /// user id -> glasses for "today"
    pub water: HashMap<i64, i64>,
}

#[derive(Debug, Clone)]
pub(crate) struct StubUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub height: Option<f64>,
}

/// Binds an ephemeral port, serves the stand-in on it, and returns the
/// base URL plus a handle for poking at server-side state.
pub(crate) async fn spawn_stub() -> (String, SharedState) {
    let state: SharedState = Arc::new(Mutex::new(StubState::default()));
    let app = Router::new()
        .route("/health", get(health_get))
        .route("/users", post(users_post).get(users_get))
        .route("/meals", get(meal_options_get))
        .route("/meals/save", post(meals_save))
        .route("/meals/today", get(meals_today_get))
        .route("/calendar", get(calendar_get).post(calendar_post))
        .route("/home", get(home_get))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (base_url, state)
}

fn ok_env(data: Value, message: &str) -> Response {
    Json(json!({"status": "success", "message": message, "data": data})).into_response()
}

fn err_env(code: StatusCode, message: &str) -> Response {
    (code, Json(json!({"status": "error", "message": message}))).into_response()
}

fn now_str() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn today_str() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

fn far_expiry() -> String {
    (Utc::now() + Duration::days(30))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn mint_token(st: &mut StubState, user_id: i64) -> String {
    st.minted += 1;
    let token = format!("{:064}", st.minted);
    st.sessions.insert(token.clone(), user_id);
    token
}

fn auth_data(user: &StubUser, token: &str) -> Value {
    json!({
        "user_id": user.id,
        "username": user.username,
        "email": user.email,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "phone": user.phone,
        "date_of_birth": "",
        "gender": "",
        "session_token": token,
        "expires_at": far_expiry()
    })
}

fn profile_json(user: &StubUser) -> Value {
    json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "phone": user.phone,
        "date_of_birth": "",
        "gender": "",
        "height": user.height,
        "weight": null,
        "blood_pressure_systolic": null,
        "blood_pressure_diastolic": null,
        "diabetes_type": "none",
        "treatment_type": "",
        "created_at": "2025-01-01 00:00:00",
        "updated_at": now_str()
    })
}

fn meal_row(id: i64, body: &Value) -> Value {
    json!({
        "id": id,
        "user_id": body["user_id"],
        "meal_type": body["meal_type"],
        "meal_option_id": body["meal_option"]["id"],
        "meal_option_name": body["meal_option"]["name"],
        "meal_option_description": body["meal_option"]["description"],
        "portion_size": body["portion_size"],
        "calories": body["calories"],
        "is_custom": body["is_custom"],
        "logged_at": now_str()
    })
}

async fn health_get() -> StatusCode {
    StatusCode::OK
}

async fn users_post(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let mut st = state.lock().unwrap();
    match body["action"].as_str().unwrap_or("") {
        "register" => {
            let username = body["username"].as_str().unwrap_or("").to_string();
            let email = body["email"].as_str().unwrap_or("").to_string();
            if st.users.iter().any(|u| u.username == username) {
                return err_env(StatusCode::CONFLICT, "Username already exists");
            }
            if st.users.iter().any(|u| u.email == email) {
                return err_env(StatusCode::CONFLICT, "Email already exists");
            }
            let user = StubUser {
                id: st.users.len() as i64 + 1,
                username,
                email,
                password: body["password"].as_str().unwrap_or("").to_string(),
                first_name: body["first_name"].as_str().unwrap_or("").to_string(),
                last_name: body["last_name"].as_str().unwrap_or("").to_string(),
                phone: body["phone"].as_str().unwrap_or("").to_string(),
                height: None,
            };
            st.users.push(user.clone());
            let token = mint_token(&mut st, user.id);
            ok_env(auth_data(&user, &token), "User registered successfully")
        }
        "login" => {
            let identifier = body["username"].as_str().unwrap_or("");
            let password = body["password"].as_str().unwrap_or("");
            let found = st
                .users
                .iter()
                .find(|u| u.username == identifier || u.email == identifier)
                .cloned();
            match found {
                Some(user) if user.password == password => {
                    // The backend replaces all prior sessions on login.
                    st.sessions.retain(|_, uid| *uid != user.id);
                    let token = mint_token(&mut st, user.id);
                    ok_env(auth_data(&user, &token), "Login successful")
                }
                _ => err_env(StatusCode::UNAUTHORIZED, "Invalid username or password"),
            }
        }
        "logout" => {
            let token = body["session_token"].as_str().unwrap_or("");
            st.sessions.remove(token);
            ok_env(json!([]), "Logout successful")
        }
        "update_profile" => {
            let token = body["session_token"].as_str().unwrap_or("").to_string();
            let Some(&uid) = st.sessions.get(&token) else {
                return err_env(StatusCode::UNAUTHORIZED, "Invalid or expired session");
            };
            let user = st.users.iter_mut().find(|u| u.id == uid).unwrap();
            if let Some(v) = body["first_name"].as_str() {
                user.first_name = v.to_string();
            }
            if let Some(v) = body["last_name"].as_str() {
                user.last_name = v.to_string();
            }
            if let Some(v) = body["phone"].as_str() {
                user.phone = v.to_string();
            }
            if let Some(v) = body["height"].as_f64() {
                user.height = Some(v);
            }
            let user = user.clone();
            ok_env(profile_json(&user), "Profile updated successfully")
        }
        _ => err_env(StatusCode::BAD_REQUEST, "Invalid action"),
    }
}

async fn users_get(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let st = state.lock().unwrap();
    let token = params.get("session_token").cloned().unwrap_or_default();
    let Some(&uid) = st.sessions.get(&token) else {
        return err_env(StatusCode::UNAUTHORIZED, "Invalid or expired session");
    };
    let user = st.users.iter().find(|u| u.id == uid).unwrap().clone();
    match params.get("action").map(String::as_str) {
        Some("verify") => {
            let mut data = profile_json(&user);
            data["expires_at"] = json!(far_expiry());
            ok_env(data, "Session valid")
        }
        Some("profile") => ok_env(profile_json(&user), "Profile retrieved successfully"),
        _ => err_env(StatusCode::BAD_REQUEST, "Invalid action"),
    }
}

async fn meal_options_get(Query(params): Query<HashMap<String, String>>) -> Response {
    let catalog = vec![
        json!({"id": 1, "name": "Oatmeal", "description": "Steel cut oats", "calories": 350, "meal_type": "breakfast"}),
        json!({"id": 2, "name": "Grilled salmon", "description": null, "calories": 450, "meal_type": "dinner"}),
    ];
    let options: Vec<Value> = match params.get("type") {
        Some(t) => catalog
            .into_iter()
            .filter(|o| o["meal_type"] == t.as_str())
            .collect(),
        None => catalog,
    };
    Json(json!({"success": true, "data": options})).into_response()
}

async fn meals_save(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let mut st = state.lock().unwrap();
    st.saved_meals.push(body.clone());
    let id = st.saved_meals.len() as i64;
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Meal logged successfully",
            "data": meal_row(id, &body)
        })),
    )
        .into_response()
}

async fn meals_today_get(State(state): State<SharedState>) -> Response {
    let st = state.lock().unwrap();
    let meals: Vec<Value> = st
        .saved_meals
        .iter()
        .enumerate()
        .map(|(i, m)| meal_row(i as i64 + 1, m))
        .collect();
    let total: i64 = st
        .saved_meals
        .iter()
        .filter_map(|m| m["calories"].as_i64())
        .sum();
    Json(json!({
        "success": true,
        "data": {
            "meals": meals,
            "summary": {
                "total_calories": total,
                "meals_count": meals.len(),
                "breakfast": [],
                "lunch": [],
                "dinner": []
            }
        }
    }))
    .into_response()
}

async fn calendar_get(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let st = state.lock().unwrap();
    match params.get("action").map(String::as_str) {
        Some("water_intake") => {
            let uid: i64 = params
                .get("user_id")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            let glasses = st.water.get(&uid).copied().unwrap_or(0);
            let date = params.get("date").cloned().unwrap_or_else(today_str);
            Json(json!({"success": true, "data": {"glasses": glasses, "date": date}}))
                .into_response()
        }
        Some("month_meals") | Some("get_date_meals") => {
            let meals: Vec<Value> = st
                .saved_meals
                .iter()
                .enumerate()
                .map(|(i, m)| {
                    json!({
                        "id": i as i64 + 1,
                        "meal_type": m["meal_type"],
                        "meal_option_name": m["meal_option"]["name"],
                        "meal_option_description": m["meal_option"]["description"],
                        "portion_size": m["portion_size"],
                        "calories": m["calories"],
                        "is_custom": m["is_custom"],
                        "date": today_str(),
                        "logged_at": 1741075200000i64
                    })
                })
                .collect();
            Json(json!({"success": true, "meals": meals, "count": meals.len()})).into_response()
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Endpoint not found"})),
        )
            .into_response(),
    }
}

async fn calendar_post(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    if body["action"] != "save_water" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Endpoint not found"})),
        )
            .into_response();
    }
    let uid = body["user_id"].as_i64().unwrap_or(0);
    let glasses = body["glasses"].as_i64().unwrap_or(0);
    let mut st = state.lock().unwrap();
    st.water.insert(uid, glasses);
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Water intake saved successfully",
            "data": {"user_id": uid, "glasses": glasses, "date": today_str()}
        })),
    )
        .into_response()
}

async fn home_get(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let st = state.lock().unwrap();
    let token = params.get("session_token").cloned().unwrap_or_default();
    let Some(&uid) = st.sessions.get(&token) else {
        return err_env(StatusCode::UNAUTHORIZED, "Invalid or expired session");
    };
    let user = st.users.iter().find(|u| u.id == uid).unwrap().clone();
    match params.get("action").map(String::as_str) {
        Some("dashboard_data") => {
            let calories: i64 = st
                .saved_meals
                .iter()
                .filter_map(|m| m["calories"].as_i64())
                .sum();
            let logged: HashSet<&str> = st
                .saved_meals
                .iter()
                .filter_map(|m| m["meal_type"].as_str())
                .collect();
            ok_env(
                json!({
                    "user": {
                        "id": user.id,
                        "username": user.username,
                        "first_name": user.first_name,
                        "last_name": user.last_name
                    },
                    "meal_status": {
                        "breakfast": logged.contains("breakfast"),
                        "lunch": logged.contains("lunch"),
                        "dinner": logged.contains("dinner")
                    },
                    "progress": {
                        "calories_consumed": calories,
                        "calories_goal": 2000,
                        "water_intake": st.water.get(&uid).copied().unwrap_or(0),
                        "water_goal": 8,
                        "meals_completed": logged.len(),
                        "meals_total": 3
                    },
                    "date": today_str()
                }),
                "Dashboard data retrieved successfully",
            )
        }
        Some("meal_history") => {
            let limit: i64 = params
                .get("limit")
                .and_then(|v| v.parse().ok())
                .unwrap_or(20);
            let offset: i64 = params
                .get("offset")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            let total = st.saved_meals.len() as i64;
            let meals: Vec<Value> = st
                .saved_meals
                .iter()
                .enumerate()
                .rev()
                .skip(offset as usize)
                .take(limit as usize)
                .map(|(i, m)| {
                    json!({
                        "id": i as i64 + 1,
                        "meal_type": m["meal_type"],
                        "meal_name": m["meal_option"]["name"],
                        "description": m["meal_option"]["description"].as_str().unwrap_or(""),
                        "portion_size": m["portion_size"],
                        "calories": m["calories"],
                        "is_custom": m["is_custom"],
                        "logged_at": now_str(),
                        "date": today_str(),
                        "time": "12:00"
                    })
                })
                .collect();
            ok_env(
                json!({
                    "meals": meals,
                    "pagination": {
                        "total": total,
                        "limit": limit,
                        "offset": offset,
                        "has_more": offset + limit < total
                    }
                }),
                "Meal history retrieved successfully",
            )
        }
        _ => err_env(StatusCode::BAD_REQUEST, "Invalid action"),
    }
}
