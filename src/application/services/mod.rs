pub mod auth_service;
pub mod reference_service;
pub mod sync_service;

pub use auth_service::{AuthService, LoginOutcome};
pub use reference_service::ReferenceService;
pub use sync_service::SyncEngine;
