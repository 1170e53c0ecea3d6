use crate::domain::entities::{AgeGroup, AnimalType, Breed, Event, Farm, UnitOfMeasure};
use crate::shared::error::Result;
use async_trait::async_trait;

/// Remote source of the six independently-fetched reference data sets.
/// Pastures and event details are never fetched on their own; they arrive
/// embedded in farms and events respectively.
#[async_trait]
pub trait ReferenceGateway: Send + Sync {
    async fn fetch_farms(&self) -> Result<Vec<Farm>>;
    async fn fetch_events(&self) -> Result<Vec<Event>>;
    async fn fetch_breeds(&self) -> Result<Vec<Breed>>;
    async fn fetch_animal_types(&self) -> Result<Vec<AnimalType>>;
    async fn fetch_age_groups(&self) -> Result<Vec<AgeGroup>>;
    async fn fetch_unit_of_measures(&self) -> Result<Vec<UnitOfMeasure>>;
}
