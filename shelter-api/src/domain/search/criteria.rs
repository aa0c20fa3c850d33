//! Search criteria: the typed, validated form of an animal-search query
//! string, plus the codec that round-trips it.
//!
//! Parsing is lossy-tolerant: unknown or malformed values fall back to their
//! defaults so the caller always gets a renderable criteria value.
//! Serialization is minimal and deterministic so the representation is stable
//! for caching and bookmarking.

use std::collections::BTreeSet;
use std::str::FromStr;

use strum::{Display, EnumString};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use crate::domain::animal::{AgeBucket, AnimalStatus, Species, SterilizationFilter};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

const KEY_SPECIES: &str = "species";
const KEY_AGE: &str = "age";
const KEY_STATUS: &str = "status";
const KEY_MANAGERS_ID: &str = "managersId";
const KEY_FOSTER_FAMILIES_ID: &str = "fosterFamiliesId";
const KEY_PICK_UP_LOCATION: &str = "pickUpLocation";
const KEY_MIN_BIRTHDATE: &str = "minBirthdate";
const KEY_MAX_BIRTHDATE: &str = "maxBirthdate";
const KEY_MIN_PICK_UP_DATE: &str = "minPickUpDate";
const KEY_MAX_PICK_UP_DATE: &str = "maxPickUpDate";
const KEY_MIN_VACCINATION_DATE: &str = "minVaccinationDate";
const KEY_MAX_VACCINATION_DATE: &str = "maxVaccinationDate";
const KEY_NO_VACCINATION: &str = "noVaccination";
const KEY_IS_STERILIZED: &str = "isSterilized";
const KEY_FREE_TEXT: &str = "q";
const KEY_SORT: &str = "sort";
const KEY_PAGE: &str = "page";

/// Requested result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SortMode {
    Relevance,
    Name,
    BirthdateDesc,
    #[default]
    PickUpDateDesc,
    VaccinationAsc,
}

/// Optional date bounds; an absent bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub min: Option<Date>,
    pub max: Option<Date>,
}

impl DateRange {
    pub fn is_unset(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Immutable search intent for one request. Constructed fresh per request,
/// never mutated in place; every setter yields a new value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchCriteria {
    pub species: BTreeSet<Species>,
    pub age_buckets: BTreeSet<AgeBucket>,
    pub statuses: BTreeSet<AnimalStatus>,
    pub manager_ids: BTreeSet<i32>,
    pub foster_family_ids: BTreeSet<i32>,
    /// Normalized to lowercase; matched case-insensitively.
    pub pick_up_locations: BTreeSet<String>,
    pub birthdate: DateRange,
    pub pick_up_date: DateRange,
    pub vaccination_date: DateRange,
    pub sterilization: BTreeSet<SterilizationFilter>,
    pub no_scheduled_vaccination: bool,
    pub free_text: Option<String>,
    pub sort: SortMode,
    pub page: u32,
}

/// Sort mode used when the query string does not name one.
fn default_sort(has_free_text: bool) -> SortMode {
    if has_free_text {
        SortMode::Relevance
    } else {
        SortMode::PickUpDateDesc
    }
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat key/value query representation. Never fails: unknown keys
    /// and unparsable values are dropped to their defaults.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut criteria = Self::default();
        let mut explicit_sort = None;

        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                KEY_SPECIES => insert_parsed(&mut criteria.species, value),
                KEY_AGE => insert_parsed(&mut criteria.age_buckets, value),
                KEY_STATUS => insert_parsed(&mut criteria.statuses, value),
                KEY_MANAGERS_ID => insert_parsed(&mut criteria.manager_ids, value),
                KEY_FOSTER_FAMILIES_ID => insert_parsed(&mut criteria.foster_family_ids, value),
                KEY_PICK_UP_LOCATION => {
                    let location = value.trim().to_lowercase();
                    if !location.is_empty() {
                        criteria.pick_up_locations.insert(location);
                    }
                }
                KEY_MIN_BIRTHDATE => criteria.birthdate.min = parse_date(value),
                KEY_MAX_BIRTHDATE => criteria.birthdate.max = parse_date(value),
                KEY_MIN_PICK_UP_DATE => criteria.pick_up_date.min = parse_date(value),
                KEY_MAX_PICK_UP_DATE => criteria.pick_up_date.max = parse_date(value),
                KEY_MIN_VACCINATION_DATE => criteria.vaccination_date.min = parse_date(value),
                KEY_MAX_VACCINATION_DATE => criteria.vaccination_date.max = parse_date(value),
                KEY_NO_VACCINATION => {
                    criteria.no_scheduled_vaccination = matches!(value, "true" | "1" | "on")
                }
                KEY_IS_STERILIZED => insert_parsed(&mut criteria.sterilization, value),
                KEY_FREE_TEXT => {
                    let text = value.trim();
                    criteria.free_text = (!text.is_empty()).then(|| text.to_string());
                }
                KEY_SORT => explicit_sort = SortMode::from_str(value).ok(),
                KEY_PAGE => {
                    criteria.page = value.trim().parse::<u32>().unwrap_or(0);
                }
                _ => {}
            }
        }

        criteria.sort = explicit_sort.unwrap_or_else(|| default_sort(criteria.free_text.is_some()));
        criteria.normalized()
    }

    /// Centralized defaulting: `RELEVANCE` without free text silently falls
    /// back to `PICK_UP_DATE_DESC`. Every consumer sees the resolved value.
    pub fn normalized(mut self) -> Self {
        if self.sort == SortMode::Relevance && self.free_text.is_none() {
            self.sort = SortMode::PickUpDateDesc;
        }
        self
    }

    /// Serialize back to key/value pairs with a fixed key order, omitting
    /// every field at its default value.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        push_set(&mut pairs, KEY_SPECIES, &self.species);
        push_set(&mut pairs, KEY_AGE, &self.age_buckets);
        push_set(&mut pairs, KEY_STATUS, &self.statuses);
        push_set(&mut pairs, KEY_MANAGERS_ID, &self.manager_ids);
        push_set(&mut pairs, KEY_FOSTER_FAMILIES_ID, &self.foster_family_ids);
        for location in &self.pick_up_locations {
            pairs.push((KEY_PICK_UP_LOCATION.to_string(), location.clone()));
        }
        push_date(&mut pairs, KEY_MIN_BIRTHDATE, self.birthdate.min);
        push_date(&mut pairs, KEY_MAX_BIRTHDATE, self.birthdate.max);
        push_date(&mut pairs, KEY_MIN_PICK_UP_DATE, self.pick_up_date.min);
        push_date(&mut pairs, KEY_MAX_PICK_UP_DATE, self.pick_up_date.max);
        push_date(&mut pairs, KEY_MIN_VACCINATION_DATE, self.vaccination_date.min);
        push_date(&mut pairs, KEY_MAX_VACCINATION_DATE, self.vaccination_date.max);
        if self.no_scheduled_vaccination {
            pairs.push((KEY_NO_VACCINATION.to_string(), "true".to_string()));
        }
        push_set(&mut pairs, KEY_IS_STERILIZED, &self.sterilization);
        if let Some(text) = &self.free_text {
            pairs.push((KEY_FREE_TEXT.to_string(), text.clone()));
        }
        if self.sort != default_sort(self.free_text.is_some()) {
            pairs.push((KEY_SORT.to_string(), self.sort.to_string()));
        }
        if self.page > 0 {
            pairs.push((KEY_PAGE.to_string(), self.page.to_string()));
        }

        pairs
    }

    /// URL-encoded form of [`Self::to_query_pairs`].
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.to_query_pairs() {
            serializer.append_pair(&key, &value);
        }
        serializer.finish()
    }

    // Functional updates; each yields a new value.

    pub fn with_species(mut self, species: BTreeSet<Species>) -> Self {
        self.species = species;
        self
    }

    pub fn with_age_buckets(mut self, age_buckets: BTreeSet<AgeBucket>) -> Self {
        self.age_buckets = age_buckets;
        self
    }

    pub fn with_statuses(mut self, statuses: BTreeSet<AnimalStatus>) -> Self {
        self.statuses = statuses;
        self
    }

    pub fn with_manager_ids(mut self, manager_ids: BTreeSet<i32>) -> Self {
        self.manager_ids = manager_ids;
        self
    }

    pub fn with_foster_family_ids(mut self, foster_family_ids: BTreeSet<i32>) -> Self {
        self.foster_family_ids = foster_family_ids;
        self
    }

    pub fn with_pick_up_locations(mut self, locations: BTreeSet<String>) -> Self {
        self.pick_up_locations = locations.into_iter().map(|l| l.to_lowercase()).collect();
        self
    }

    pub fn with_birthdate(mut self, range: DateRange) -> Self {
        self.birthdate = range;
        self
    }

    pub fn with_pick_up_date(mut self, range: DateRange) -> Self {
        self.pick_up_date = range;
        self
    }

    pub fn with_vaccination_date(mut self, range: DateRange) -> Self {
        self.vaccination_date = range;
        self
    }

    pub fn with_sterilization(mut self, sterilization: BTreeSet<SterilizationFilter>) -> Self {
        self.sterilization = sterilization;
        self
    }

    pub fn with_no_scheduled_vaccination(mut self, flag: bool) -> Self {
        self.no_scheduled_vaccination = flag;
        self
    }

    pub fn with_free_text(mut self, text: Option<String>) -> Self {
        self.free_text = text.and_then(|t| {
            let t = t.trim().to_string();
            (!t.is_empty()).then_some(t)
        });
        self
    }

    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

fn insert_parsed<T: FromStr + Ord>(set: &mut BTreeSet<T>, value: &str) {
    if let Ok(parsed) = value.trim().parse::<T>() {
        set.insert(parsed);
    }
}

fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), DATE_FORMAT).ok()
}

fn push_set<T: ToString>(pairs: &mut Vec<(String, String)>, key: &str, set: &BTreeSet<T>) {
    for value in set {
        pairs.push((key.to_string(), value.to_string()));
    }
}

fn push_date(pairs: &mut Vec<(String, String)>, key: &str, date: Option<Date>) {
    if let Some(date) = date {
        if let Ok(formatted) = date.format(DATE_FORMAT) {
            pairs.push((key.to_string(), formatted));
        }
    }
}
