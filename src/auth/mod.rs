pub mod context;
pub mod credentials;

pub use context::{SessionContext, SessionHandle};
