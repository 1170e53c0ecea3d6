//! Offline-first livestock movement recording: a durable local store, a
//! read-through reference-data cache and an outbound sync engine that
//! reconciles locally-created movements with the remote API once
//! connectivity returns.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
mod state;

pub use shared::config::AppConfig;
pub use shared::error::{AppError, Result};
pub use shared::logging::init_logging;
pub use state::AppContext;
