//! Remote gateway for the backend API.
//!
//! This module owns everything that touches the network: the reqwest
//! client, the endpoint wire types, and the error split between
//! transport failures and server rejections.
//!
//! ## Envelopes
//!
//! The backend grew two reply conventions and both are kept:
//! 1. `/users` and `/home` wrap payloads in `{status, message, data}`
//! 2. `/meals` and `/calendar` use `{success, ...}` with the payload
//!    under `data` or `meals`
//!
//! The gateway normalizes both into typed results; callers never see an
//! envelope.

mod client;
mod error;
pub mod protocol;

pub use client::{ApiClient, DEFAULT_TIMEOUT_SECS};
pub use error::ApiError;
