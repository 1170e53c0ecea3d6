pub mod movement;
pub mod reference;
pub mod sync;
pub mod user;

pub use movement::{Gender, Movement, MovementDetail, MovementMedia, MovementStats};
pub use reference::{
    AgeGroup, AnimalType, Breed, Event, EventDetail, Farm, Pasture, ReferenceKind, UnitOfMeasure,
};
pub use sync::{SyncPhase, SyncQueueItem, SyncReport, SyncStatusEvent};
pub use user::{LoginRequest, LoginResponse, TenantAccount, TokenPair, UserData};
