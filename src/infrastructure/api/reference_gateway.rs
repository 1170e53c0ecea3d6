use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::client::{expect_success, ApiClient};
use crate::application::ports::ReferenceGateway;
use crate::domain::entities::{AgeGroup, AnimalType, Breed, Event, Farm, UnitOfMeasure};
use crate::shared::error::Result;

/// Reference data reads against the remote `/{resource}/search` endpoints.
/// The `loadRelated` values are pipe-delimited relation lists; reqwest
/// percent-encodes the pipes on the wire.
pub struct HttpReferenceGateway {
    client: Arc<ApiClient>,
}

impl HttpReferenceGateway {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    async fn search<T: DeserializeOwned>(
        &self,
        path: &str,
        load_related: Option<&str>,
    ) -> Result<Vec<T>> {
        let query: Vec<(&str, &str)> = match load_related {
            Some(relations) => vec![("loadRelated", relations)],
            None => Vec::new(),
        };

        let response = self.client.get(path, &query).await?;
        let response = expect_success(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ReferenceGateway for HttpReferenceGateway {
    async fn fetch_farms(&self) -> Result<Vec<Farm>> {
        self.search("/farms/search", Some("|pastures|unitOfMeasure|"))
            .await
    }

    async fn fetch_events(&self) -> Result<Vec<Event>> {
        self.search("/events/search", Some("|eventDetails|")).await
    }

    async fn fetch_breeds(&self) -> Result<Vec<Breed>> {
        self.search("/breeds/search", Some("|animalType|")).await
    }

    async fn fetch_animal_types(&self) -> Result<Vec<AnimalType>> {
        self.search("/animal-types/search", Some("|breeds|ageGroups|"))
            .await
    }

    async fn fetch_age_groups(&self) -> Result<Vec<AgeGroup>> {
        self.search("/age-groups/search", Some("|animalType|")).await
    }

    async fn fetch_unit_of_measures(&self) -> Result<Vec<UnitOfMeasure>> {
        self.search("/unit-of-measures/search", None).await
    }
}
