use serde::{Deserialize, Serialize};
use std::fmt;

/// Type key a reference data set is cached under. At most one cache row per
/// kind; refresh replaces the whole blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Farms,
    Pastures,
    Events,
    EventDetails,
    Breeds,
    AnimalTypes,
    AgeGroups,
    UnitOfMeasures,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Farms => "farms",
            ReferenceKind::Pastures => "pastures",
            ReferenceKind::Events => "events",
            ReferenceKind::EventDetails => "eventDetails",
            ReferenceKind::Breeds => "breeds",
            ReferenceKind::AnimalTypes => "animalTypes",
            ReferenceKind::AgeGroups => "ageGroups",
            ReferenceKind::UnitOfMeasures => "unitOfMeasures",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Wire shapes below mirror the remote contract; the server speaks camelCase
// and embeds related entities when asked to via `loadRelated`.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub farm_id: i64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
    #[serde(default)]
    pub area_size: Option<String>,
    #[serde(default)]
    pub unit_of_measure: Option<UnitOfMeasure>,
    pub status: String,
    #[serde(default)]
    pub pastures: Vec<Pasture>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pasture {
    pub pasture_id: i64,
    pub description: String,
    pub farm_id: i64,
    #[serde(default)]
    pub farm_name: Option<String>,
    #[serde(default)]
    pub capacity: i64,
    #[serde(default)]
    pub capacity_description: String,
    #[serde(default)]
    pub area_size: f64,
    #[serde(default)]
    pub unit_of_measure: Option<UnitOfMeasure>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_id: i64,
    pub description: String,
    pub operation: String,
    #[serde(default)]
    pub event_details: Vec<EventDetail>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    pub event_detail_id: i64,
    pub event_id: i64,
    pub description: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Breed {
    pub breed_id: i64,
    pub name: String,
    pub animal_type_id: i64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimalType {
    pub animal_type_id: i64,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub breeds: Vec<Breed>,
    #[serde(default)]
    pub age_groups: Vec<AgeGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgeGroup {
    pub age_group_id: i64,
    pub name: String,
    pub animal_type_id: i64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnitOfMeasure {
    pub unit_of_measure_id: i64,
    pub name: String,
    pub abbreviation: String,
    #[serde(default)]
    pub status: Option<String>,
}
