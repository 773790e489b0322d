//! Vitalog Client Library
//!
//! Session handling, the local SQLite cache, the HTTP gateway to the
//! backend, and the sync coordinator that decides which side answers.

pub mod auth;
pub mod db;
pub mod models;
pub mod remote;
pub mod sync;

pub use auth::{SessionContext, SessionHandle};
pub use db::{
    init_db, MealLogRepository, SessionRepository, StoreError, UserRepository,
    WaterIntakeRepository,
};
pub use models::{
    MealLog, MealOption, MealType, NewUser, ProfileUpdate, Session, User, WaterIntake,
};
pub use remote::{ApiClient, ApiError};
pub use sync::{DataSource, SyncCoordinator, SyncError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
