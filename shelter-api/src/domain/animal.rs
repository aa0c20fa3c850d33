//! Core animal types shared by the search subsystem and its adapters.

use serde::{Deserialize, Serialize};
use sqlx::Type;
use strum::{Display, EnumIter, EnumString};
use time::{Date, Month};

use super::search::AllowedFields;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Type,
    Display,
    EnumIter,
    EnumString,
)]
#[sqlx(type_name = "species", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Species {
    Bird,
    Cat,
    Dog,
    Reptile,
    Rodent,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Type,
    Display,
    EnumString,
)]
#[sqlx(type_name = "animal_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum AnimalStatus {
    Adopted,
    Deceased,
    Free,
    Lost,
    OpenToAdoption,
    Reserved,
    Returned,
    Unavailable,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Type,
    Display,
    EnumString,
)]
#[sqlx(type_name = "gender", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Gender {
    Female,
    Male,
}

/// Coarse age category, resolved to a birthdate window per species.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum AgeBucket {
    Junior,
    Adult,
    Senior,
}

/// Tri-state sterilization filter. Distinguishes "not sterilized yet" from
/// "sterilization is not required for this animal at all".
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SterilizationFilter {
    Sterilized,
    NotSterilized,
    NotMandatory,
}

impl SterilizationFilter {
    /// Underlying two-boolean combination stored on the animal row:
    /// `(is_sterilized, sterilization_mandatory)`.
    pub fn as_booleans(self) -> (bool, bool) {
        match self {
            SterilizationFilter::Sterilized => (true, true),
            SterilizationFilter::NotSterilized => (false, true),
            SterilizationFilter::NotMandatory => (false, false),
        }
    }
}

/// Birthdate window corresponding to an age bucket at a given reference date.
/// Open-ended buckets leave one side unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeWindow {
    /// `birthdate` must be strictly after this (younger than the max age).
    pub born_after: Option<Date>,
    /// `birthdate` must be on or before this (at least the min age).
    pub born_until: Option<Date>,
}

/// `[min_months, max_months)` half-open interval for a bucket, or `None` when
/// the species has no defined bucket table.
fn bucket_months(species: Species, bucket: AgeBucket) -> Option<(u32, Option<u32>)> {
    match species {
        Species::Cat | Species::Dog => Some(match bucket {
            AgeBucket::Junior => (0, Some(12)),
            AgeBucket::Adult => (12, Some(108)),
            AgeBucket::Senior => (108, None),
        }),
        Species::Rodent => Some(match bucket {
            AgeBucket::Junior => (0, Some(12)),
            AgeBucket::Adult => (12, Some(60)),
            AgeBucket::Senior => (60, None),
        }),
        Species::Bird | Species::Reptile => None,
    }
}

/// Resolve a bucket against `today`. Returns `None` for species without a
/// bucket table.
pub fn age_window(species: Species, bucket: AgeBucket, today: Date) -> Option<AgeWindow> {
    let (min_months, max_months) = bucket_months(species, bucket)?;

    Some(AgeWindow {
        born_after: max_months.map(|months| months_before(today, months)),
        born_until: (min_months > 0).then(|| months_before(today, min_months)),
    })
}

/// Calendar-correct "`months` months before `date`", clamping the day to the
/// length of the target month.
pub fn months_before(date: Date, months: u32) -> Date {
    let total = date.year() * 12 + i32::from(u8::from(date.month())) - 1 - months as i32;
    let year = total.div_euclid(12);
    let month = Month::try_from((total.rem_euclid(12) + 1) as u8)
        .expect("month index is always in 1..=12");
    let day = date.day().min(time::util::days_in_month(month, year));

    Date::from_calendar_date(year, month, day).expect("day is clamped to the target month")
}

/// Full animal row as stored in the relational store.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AnimalRecord {
    pub id: i32,
    pub name: String,
    pub alias: Option<String>,
    pub species: Species,
    pub breed_name: Option<String>,
    pub gender: Gender,
    pub status: AnimalStatus,
    pub birthdate: Date,
    pub pick_up_date: Date,
    pub pick_up_location: Option<String>,
    pub manager_id: Option<i32>,
    pub foster_family_id: Option<i32>,
    pub is_sterilized: bool,
    pub sterilization_mandatory: bool,
    pub next_vaccination_date: Option<Date>,
    pub avatar_url: Option<String>,
}

/// Health fields only elevated callers may see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSummary {
    pub is_sterilized: bool,
    pub sterilization_mandatory: bool,
    pub next_vaccination_date: Option<Date>,
}

/// Projection of an [`AnimalRecord`] returned to a caller. Fields outside the
/// caller's [`AllowedFields`] are omitted from the JSON entirely, not
/// null-filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalSummary {
    pub id: i32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub species: Species,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed_name: Option<String>,
    pub gender: Gender,
    pub status: AnimalStatus,
    pub birthdate: Date,
    pub pick_up_date: Date,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pick_up_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// `None` when the caller may not see foster-family data; `Some(None)`
    /// when the caller may, and the animal has no foster family.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foster_family_id: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthSummary>,
}

impl AnimalSummary {
    pub fn project(record: AnimalRecord, allowed: &AllowedFields) -> Self {
        Self {
            id: record.id,
            name: record.name,
            alias: record.alias,
            species: record.species,
            breed_name: record.breed_name,
            gender: record.gender,
            status: record.status,
            birthdate: record.birthdate,
            pick_up_date: record.pick_up_date,
            pick_up_location: record.pick_up_location,
            manager_id: record.manager_id,
            avatar_url: record.avatar_url,
            foster_family_id: allowed.foster_family.then_some(record.foster_family_id),
            health: allowed.health.then_some(HealthSummary {
                is_sterilized: record.is_sterilized,
                sterilization_mandatory: record.sterilization_mandatory,
                next_vaccination_date: record.next_vaccination_date,
            }),
        }
    }
}
