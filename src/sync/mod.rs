//! Offline-aware orchestration between the API client and the local store.
//!
//! The coordinator owns the per-operation policy: which side is asked
//! first, what a transport failure turns into, and which results get
//! marked as served from the cache.

mod coordinator;
mod error;
#[cfg(test)]
pub(crate) mod stub_server;

pub use coordinator::{
    CalendarEntry, DataSource, HistoryEntry, LogoutOutcome, MealHistoryPage, ProfileOutcome,
    SyncCoordinator, TodayMeals, VerifiedSession,
};
pub use error::SyncError;
