use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::application::ports::ReferenceGateway;
use crate::domain::entities::{
    AgeGroup, AnimalType, Breed, Event, EventDetail, Farm, Pasture, ReferenceKind, UnitOfMeasure,
};
use crate::infrastructure::database::LocalStore;
use crate::shared::error::Result;

/// Read-through cache over the reference data sets: persistent cache first,
/// network fallback second, and an empty list when both are unavailable, so
/// list-consuming UI degrades instead of erroring. Pastures and event
/// details are never fetched on their own; they are extracted from farms and
/// events and cached under their own keys.
pub struct ReferenceService {
    store: Arc<LocalStore>,
    gateway: Arc<dyn ReferenceGateway>,
}

impl ReferenceService {
    pub fn new(store: Arc<LocalStore>, gateway: Arc<dyn ReferenceGateway>) -> Self {
        Self { store, gateway }
    }

    /// Fetch all six independent data sets concurrently and cache them,
    /// then extract the two dependent sets. One failed fetch degrades that
    /// set to empty without blocking the rest; a cache write failure is
    /// surfaced to the caller.
    pub async fn load_all_reference_data(&self) -> Result<()> {
        info!("loading reference data from API");

        let (farms, events, breeds, animal_types, age_groups, units) = tokio::join!(
            fetch_or_empty(self.gateway.fetch_farms(), ReferenceKind::Farms),
            fetch_or_empty(self.gateway.fetch_events(), ReferenceKind::Events),
            fetch_or_empty(self.gateway.fetch_breeds(), ReferenceKind::Breeds),
            fetch_or_empty(self.gateway.fetch_animal_types(), ReferenceKind::AnimalTypes),
            fetch_or_empty(self.gateway.fetch_age_groups(), ReferenceKind::AgeGroups),
            fetch_or_empty(self.gateway.fetch_unit_of_measures(), ReferenceKind::UnitOfMeasures),
        );

        let payloads = vec![
            (ReferenceKind::Farms, serde_json::to_string(&farms)?),
            (ReferenceKind::Events, serde_json::to_string(&events)?),
            (ReferenceKind::Breeds, serde_json::to_string(&breeds)?),
            (ReferenceKind::AnimalTypes, serde_json::to_string(&animal_types)?),
            (ReferenceKind::AgeGroups, serde_json::to_string(&age_groups)?),
            (ReferenceKind::UnitOfMeasures, serde_json::to_string(&units)?),
        ];
        let writes = join_all(
            payloads
                .iter()
                .map(|(kind, json)| self.store.save_reference_data(*kind, json)),
        )
        .await;
        for write in writes {
            write?;
        }

        self.extract_pastures(&farms).await?;
        self.extract_event_details(&events).await?;

        info!("reference data cached");
        Ok(())
    }

    pub async fn get_farms(&self) -> Vec<Farm> {
        match self.farms_through_cache().await {
            Ok(farms) => farms,
            Err(err) => {
                error!("reference cache unavailable for farms: {err}");
                fetch_or_empty(self.gateway.fetch_farms(), ReferenceKind::Farms).await
            }
        }
    }

    async fn farms_through_cache(&self) -> Result<Vec<Farm>> {
        if let Some(farms) = self.cached::<Farm>(ReferenceKind::Farms).await? {
            return Ok(farms);
        }

        debug!("farms cache empty, fetching from API");
        let farms = fetch_or_empty(self.gateway.fetch_farms(), ReferenceKind::Farms).await;
        self.persist(ReferenceKind::Farms, &farms).await?;
        // Pastures arrive embedded in the farms; cache them too.
        self.extract_pastures(&farms).await?;
        Ok(farms)
    }

    pub async fn get_events(&self) -> Vec<Event> {
        match self.events_through_cache().await {
            Ok(events) => events,
            Err(err) => {
                error!("reference cache unavailable for events: {err}");
                fetch_or_empty(self.gateway.fetch_events(), ReferenceKind::Events).await
            }
        }
    }

    async fn events_through_cache(&self) -> Result<Vec<Event>> {
        if let Some(events) = self.cached::<Event>(ReferenceKind::Events).await? {
            return Ok(events);
        }

        debug!("events cache empty, fetching from API");
        let events = fetch_or_empty(self.gateway.fetch_events(), ReferenceKind::Events).await;
        self.persist(ReferenceKind::Events, &events).await?;
        self.extract_event_details(&events).await?;
        Ok(events)
    }

    /// Cache-only read of the pasture set extracted from farms, optionally
    /// narrowed to one farm.
    pub async fn get_pastures(&self, farm_id: Option<i64>) -> Vec<Pasture> {
        let pastures = match self.cached::<Pasture>(ReferenceKind::Pastures).await {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(err) => {
                error!("reference cache unavailable for pastures: {err}");
                Vec::new()
            }
        };

        match farm_id {
            Some(id) => pastures.into_iter().filter(|p| p.farm_id == id).collect(),
            None => pastures,
        }
    }

    /// Cache-only read of the event detail set extracted from events.
    pub async fn get_event_details(&self, event_id: Option<i64>) -> Vec<EventDetail> {
        let details = match self.cached::<EventDetail>(ReferenceKind::EventDetails).await {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(err) => {
                error!("reference cache unavailable for event details: {err}");
                Vec::new()
            }
        };

        match event_id {
            Some(id) => details.into_iter().filter(|d| d.event_id == id).collect(),
            None => details,
        }
    }

    pub async fn get_breeds(&self, animal_type_id: Option<i64>) -> Vec<Breed> {
        let breeds = self
            .simple_set(ReferenceKind::Breeds, self.gateway.fetch_breeds())
            .await;
        match animal_type_id {
            Some(id) => breeds
                .into_iter()
                .filter(|b| b.animal_type_id == id)
                .collect(),
            None => breeds,
        }
    }

    pub async fn get_animal_types(&self) -> Vec<AnimalType> {
        self.simple_set(ReferenceKind::AnimalTypes, self.gateway.fetch_animal_types())
            .await
    }

    pub async fn get_age_groups(&self, animal_type_id: Option<i64>) -> Vec<AgeGroup> {
        let age_groups = self
            .simple_set(ReferenceKind::AgeGroups, self.gateway.fetch_age_groups())
            .await;
        match animal_type_id {
            Some(id) => age_groups
                .into_iter()
                .filter(|g| g.animal_type_id == id)
                .collect(),
            None => age_groups,
        }
    }

    pub async fn get_unit_of_measures(&self) -> Vec<UnitOfMeasure> {
        self.simple_set(
            ReferenceKind::UnitOfMeasures,
            self.gateway.fetch_unit_of_measures(),
        )
        .await
    }

    pub async fn clear_cache(&self) -> Result<()> {
        self.store.clear_reference_data().await
    }

    /// Read-through for the sets with no dependent extraction. Falls back
    /// to a direct fetch when the cache itself is broken.
    async fn simple_set<T>(
        &self,
        kind: ReferenceKind,
        fetch: impl Future<Output = Result<Vec<T>>>,
    ) -> Vec<T>
    where
        T: Serialize + DeserializeOwned,
    {
        match self.through_cache(kind, fetch).await {
            Ok(items) => items,
            Err(err) => {
                error!(kind = %kind, "reference cache unavailable: {err}");
                Vec::new()
            }
        }
    }

    async fn through_cache<T>(
        &self,
        kind: ReferenceKind,
        fetch: impl Future<Output = Result<Vec<T>>>,
    ) -> Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        if let Some(items) = self.cached::<T>(kind).await? {
            return Ok(items);
        }

        debug!(kind = %kind, "cache empty, fetching from API");
        let items = fetch_or_empty(fetch, kind).await;
        self.persist(kind, &items).await?;
        Ok(items)
    }

    /// A cached empty list counts the same as no cache at all, so the next
    /// read attempts the network again.
    async fn cached<T: DeserializeOwned>(&self, kind: ReferenceKind) -> Result<Option<Vec<T>>> {
        let Some(raw) = self.store.get_reference_data(kind).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) if !items.is_empty() => Ok(Some(items)),
            Ok(_) => Ok(None),
            Err(err) => {
                warn!(kind = %kind, "discarding unreadable cache blob: {err}");
                Ok(None)
            }
        }
    }

    async fn persist<T: Serialize>(&self, kind: ReferenceKind, items: &[T]) -> Result<()> {
        self.store
            .save_reference_data(kind, &serde_json::to_string(items)?)
            .await
    }

    async fn extract_pastures(&self, farms: &[Farm]) -> Result<()> {
        let pastures: Vec<Pasture> = farms
            .iter()
            .flat_map(|farm| farm.pastures.iter().cloned())
            .collect();
        debug!(count = pastures.len(), "caching pastures embedded in farms");
        self.persist(ReferenceKind::Pastures, &pastures).await
    }

    async fn extract_event_details(&self, events: &[Event]) -> Result<()> {
        let details: Vec<EventDetail> = events
            .iter()
            .flat_map(|event| event.event_details.iter().cloned())
            .collect();
        debug!(count = details.len(), "caching event details embedded in events");
        self.persist(ReferenceKind::EventDetails, &details).await
    }
}

async fn fetch_or_empty<T>(
    fetch: impl Future<Output = Result<Vec<T>>>,
    kind: ReferenceKind,
) -> Vec<T> {
    match fetch.await {
        Ok(items) => items,
        Err(err) => {
            error!(kind = %kind, "reference fetch failed: {err}");
            Vec::new()
        }
    }
}
