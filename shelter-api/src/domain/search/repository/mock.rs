//! In-memory store for testing. Evaluates predicate groups over a plain
//! `Vec<AnimalRecord>` with the same semantics as the Postgres adapter.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::domain::animal::AnimalRecord;
use crate::domain::search::predicates::{DateField, Predicate, PredicateGroup};
use crate::domain::search::traits::{AnimalStore, Result, StoreOrder};

#[derive(Clone, Default)]
pub struct MockAnimalStore {
    animals: Arc<RwLock<Vec<AnimalRecord>>>,
    /// Id order for `fetch_unordered`, to simulate whatever internal order
    /// the store happens to return.
    unordered_override: Arc<RwLock<Option<Vec<i32>>>>,
    fetch_calls: Arc<AtomicUsize>,
    count_calls: Arc<AtomicUsize>,
}

impl MockAnimalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_animals(self, animals: Vec<AnimalRecord>) -> Self {
        *self.animals.write().unwrap() = animals;
        self
    }

    /// Force `fetch_unordered` to return records in this id order.
    pub fn with_unordered_override(self, ids: Vec<i32>) -> Self {
        *self.unordered_override.write().unwrap() = Some(ids);
        self
    }

    /// Number of page/unordered fetches issued.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(AtomicOrdering::SeqCst)
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(AtomicOrdering::SeqCst)
    }

    fn matching(&self, groups: &[PredicateGroup]) -> Vec<AnimalRecord> {
        self.animals
            .read()
            .unwrap()
            .iter()
            .filter(|record| matches_groups(record, groups))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AnimalStore for MockAnimalStore {
    async fn fetch_page(
        &self,
        groups: &[PredicateGroup],
        order: StoreOrder,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AnimalRecord>> {
        self.fetch_calls.fetch_add(1, AtomicOrdering::SeqCst);

        let mut records = self.matching(groups);
        records.sort_by(|a, b| compare(a, b, order));

        Ok(records
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn fetch_unordered(&self, groups: &[PredicateGroup]) -> Result<Vec<AnimalRecord>> {
        self.fetch_calls.fetch_add(1, AtomicOrdering::SeqCst);

        let mut records = self.matching(groups);
        if let Some(ids) = self.unordered_override.read().unwrap().as_ref() {
            records.sort_by_key(|record| {
                ids.iter().position(|&id| id == record.id).unwrap_or(usize::MAX)
            });
        }
        Ok(records)
    }

    async fn count(&self, groups: &[PredicateGroup]) -> Result<i64> {
        self.count_calls.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(self.matching(groups).len() as i64)
    }

    async fn distinct_pick_up_locations(&self) -> Result<Vec<String>> {
        let locations: BTreeSet<String> = self
            .animals
            .read()
            .unwrap()
            .iter()
            .filter_map(|record| record.pick_up_location.as_deref())
            .map(str::to_lowercase)
            .collect();
        Ok(locations.into_iter().collect())
    }
}

fn matches_groups(record: &AnimalRecord, groups: &[PredicateGroup]) -> bool {
    groups.iter().all(|group| {
        group
            .alternatives()
            .iter()
            .any(|predicate| matches_predicate(record, predicate))
    })
}

fn matches_predicate(record: &AnimalRecord, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::SpeciesAnyOf(species) => species.contains(&record.species),
        Predicate::StatusAnyOf(statuses) => statuses.contains(&record.status),
        Predicate::ManagerAnyOf(ids) => {
            record.manager_id.map_or(false, |id| ids.contains(&id))
        }
        Predicate::FosterFamilyAnyOf(ids) => {
            record.foster_family_id.map_or(false, |id| ids.contains(&id))
        }
        Predicate::PickUpLocationAnyOf(locations) => record
            .pick_up_location
            .as_deref()
            .map_or(false, |location| {
                locations.iter().any(|l| l == &location.to_lowercase())
            }),
        Predicate::IdAnyOf(ids) => ids.contains(&record.id),
        Predicate::DateWithin { field, min, max } => {
            let value = match field {
                DateField::Birthdate => Some(record.birthdate),
                DateField::PickUpDate => Some(record.pick_up_date),
                DateField::VaccinationDate => record.next_vaccination_date,
            };
            value.map_or(false, |date| {
                min.map_or(true, |m| date >= m) && max.map_or(true, |m| date <= m)
            })
        }
        Predicate::AgeWindow {
            species,
            born_after,
            born_until,
        } => {
            record.species == *species
                && born_after.map_or(true, |after| record.birthdate > after)
                && born_until.map_or(true, |until| record.birthdate <= until)
        }
        Predicate::Sterilization {
            is_sterilized,
            mandatory,
        } => {
            record.is_sterilized == *is_sterilized
                && record.sterilization_mandatory == *mandatory
        }
        Predicate::NoVaccinationScheduled => record.next_vaccination_date.is_none(),
        Predicate::NameMatches(text) => {
            let needle = text.to_lowercase();
            record.name.to_lowercase().contains(&needle)
                || record
                    .alias
                    .as_deref()
                    .map_or(false, |alias| alias.to_lowercase().contains(&needle))
        }
    }
}

fn compare(a: &AnimalRecord, b: &AnimalRecord, order: StoreOrder) -> Ordering {
    let primary = match order {
        StoreOrder::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        StoreOrder::BirthdateDesc => b.birthdate.cmp(&a.birthdate),
        StoreOrder::PickUpDateDesc => b.pick_up_date.cmp(&a.pick_up_date),
        StoreOrder::VaccinationAsc => {
            // Nulls last.
            let key = |record: &AnimalRecord| {
                (
                    record.next_vaccination_date.is_none(),
                    record.next_vaccination_date,
                )
            };
            key(a).cmp(&key(b))
        }
    };
    primary.then(a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::animal::{AnimalStatus, Gender, Species, SterilizationFilter};
    use crate::domain::search::criteria::SearchCriteria;
    use crate::domain::search::predicates::{build_predicate_groups, FreeTextPlan};
    use time::macros::date;

    fn animal(id: i32, species: Species, sterilized: bool, mandatory: bool) -> AnimalRecord {
        AnimalRecord {
            id,
            name: format!("animal-{id}"),
            alias: None,
            species,
            breed_name: None,
            gender: Gender::Male,
            status: AnimalStatus::OpenToAdoption,
            birthdate: date!(2020 - 01 - 01),
            pick_up_date: date!(2023 - 05 - 01),
            pick_up_location: Some("Lyon".to_string()),
            manager_id: None,
            foster_family_id: None,
            is_sterilized: sterilized,
            sterilization_mandatory: mandatory,
            next_vaccination_date: None,
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn tri_state_union_equals_no_filter() {
        // Selecting all three tri-state values must match the same population
        // as no sterilization filter at all.
        let store = MockAnimalStore::new().with_animals(vec![
            animal(1, Species::Cat, true, true),
            animal(2, Species::Cat, false, true),
            animal(3, Species::Cat, false, false),
        ]);

        let all_filters = SearchCriteria::new().with_sterilization(
            [
                SterilizationFilter::Sterilized,
                SterilizationFilter::NotSterilized,
                SterilizationFilter::NotMandatory,
            ]
            .into(),
        );
        let today = date!(2024 - 06 - 01);

        let union = store
            .count(&build_predicate_groups(&all_filters, FreeTextPlan::None, today))
            .await
            .unwrap();
        let unfiltered = store
            .count(&build_predicate_groups(
                &SearchCriteria::new(),
                FreeTextPlan::None,
                today,
            ))
            .await
            .unwrap();

        assert_eq!(union, unfiltered);
        assert_eq!(union, 3);
    }

    #[tokio::test]
    async fn pick_up_location_matches_case_insensitively() {
        let store = MockAnimalStore::new()
            .with_animals(vec![animal(1, Species::Cat, true, true)]);

        let criteria = SearchCriteria::new()
            .with_pick_up_locations(["LYON".to_string()].into());
        let groups = build_predicate_groups(&criteria, FreeTextPlan::None, date!(2024 - 06 - 01));

        assert_eq!(store.count(&groups).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn distinct_locations_are_lowercased_and_sorted() {
        let mut a = animal(1, Species::Cat, true, true);
        a.pick_up_location = Some("Paris".to_string());
        let mut b = animal(2, Species::Dog, true, true);
        b.pick_up_location = Some("lyon".to_string());
        let mut c = animal(3, Species::Dog, true, true);
        c.pick_up_location = Some("LYON".to_string());

        let store = MockAnimalStore::new().with_animals(vec![a, b, c]);
        assert_eq!(
            store.distinct_pick_up_locations().await.unwrap(),
            vec!["lyon".to_string(), "paris".to_string()]
        );
    }
}
