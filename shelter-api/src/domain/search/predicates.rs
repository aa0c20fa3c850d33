//! Translation of effective criteria into an immutable list of predicate
//! groups.
//!
//! Groups are conjoined (`AND`) by the store adapter; each group is internally
//! a disjunction (`OR`) of alternatives. Keeping this a pure value
//! transformation keeps filter logic testable without a live database.

use strum::IntoEnumIterator;
use time::Date;

use crate::domain::animal::{age_window, AnimalStatus, Species};

use super::criteria::{DateRange, SearchCriteria};

/// Date column a range predicate applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Birthdate,
    PickUpDate,
    VaccinationDate,
}

/// One simple comparison the relational store can evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    SpeciesAnyOf(Vec<Species>),
    StatusAnyOf(Vec<AnimalStatus>),
    ManagerAnyOf(Vec<i32>),
    FosterFamilyAnyOf(Vec<i32>),
    /// Lowercased values, matched case-insensitively.
    PickUpLocationAnyOf(Vec<String>),
    IdAnyOf(Vec<i32>),
    /// Inclusive bounds; an absent bound is unbounded on that side.
    DateWithin {
        field: DateField,
        min: Option<Date>,
        max: Option<Date>,
    },
    /// Per-species birthdate window resolved from an age bucket:
    /// `species = s AND birthdate > born_after AND birthdate <= born_until`.
    AgeWindow {
        species: Species,
        born_after: Option<Date>,
        born_until: Option<Date>,
    },
    Sterilization {
        is_sterilized: bool,
        mandatory: bool,
    },
    NoVaccinationScheduled,
    /// Case-insensitive substring match over name and alias. Used as the
    /// store-side fallback when the fuzzy index is unavailable.
    NameMatches(String),
}

/// An independent filter condition: a disjunction of alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateGroup(Vec<Predicate>);

impl PredicateGroup {
    pub fn of(alternatives: Vec<Predicate>) -> Self {
        Self(alternatives)
    }

    pub fn single(predicate: Predicate) -> Self {
        Self(vec![predicate])
    }

    pub fn alternatives(&self) -> &[Predicate] {
        &self.0
    }
}

/// How free text participates in the structured query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeTextPlan<'a> {
    /// No free text, or it is handled entirely outside the store.
    None,
    /// Membership is restricted to the ranked identifiers from the fuzzy
    /// index. Ranking itself never comes from the store.
    RankedIds(&'a [i32]),
    /// Fuzzy index unavailable: match the text against the columns the store
    /// can compare directly.
    StoreMatch(&'a str),
}

/// Build the ordered predicate-group list for `criteria`. Age buckets resolve
/// against `today`.
pub fn build_predicate_groups(
    criteria: &SearchCriteria,
    free_text: FreeTextPlan<'_>,
    today: Date,
) -> Vec<PredicateGroup> {
    let mut groups = Vec::new();

    if !criteria.species.is_empty() {
        groups.push(PredicateGroup::single(Predicate::SpeciesAnyOf(
            criteria.species.iter().copied().collect(),
        )));
    }

    if !criteria.age_buckets.is_empty() {
        // Buckets are species-specific; without a species filter they expand
        // over every species that has a bucket table.
        let species_scope: Vec<Species> = if criteria.species.is_empty() {
            Species::iter().collect()
        } else {
            criteria.species.iter().copied().collect()
        };
        let windows: Vec<Predicate> = species_scope
            .into_iter()
            .flat_map(|species| {
                criteria.age_buckets.iter().filter_map(move |&bucket| {
                    age_window(species, bucket, today).map(|window| Predicate::AgeWindow {
                        species,
                        born_after: window.born_after,
                        born_until: window.born_until,
                    })
                })
            })
            .collect();
        if !windows.is_empty() {
            groups.push(PredicateGroup::of(windows));
        }
    }

    push_date_range(&mut groups, DateField::Birthdate, &criteria.birthdate);
    push_date_range(&mut groups, DateField::PickUpDate, &criteria.pick_up_date);
    push_date_range(
        &mut groups,
        DateField::VaccinationDate,
        &criteria.vaccination_date,
    );

    if !criteria.statuses.is_empty() {
        groups.push(PredicateGroup::single(Predicate::StatusAnyOf(
            criteria.statuses.iter().copied().collect(),
        )));
    }

    if !criteria.manager_ids.is_empty() {
        groups.push(PredicateGroup::single(Predicate::ManagerAnyOf(
            criteria.manager_ids.iter().copied().collect(),
        )));
    }

    if !criteria.foster_family_ids.is_empty() {
        groups.push(PredicateGroup::single(Predicate::FosterFamilyAnyOf(
            criteria.foster_family_ids.iter().copied().collect(),
        )));
    }

    if !criteria.pick_up_locations.is_empty() {
        groups.push(PredicateGroup::single(Predicate::PickUpLocationAnyOf(
            criteria.pick_up_locations.iter().cloned().collect(),
        )));
    }

    if !criteria.sterilization.is_empty() {
        groups.push(PredicateGroup::of(
            criteria
                .sterilization
                .iter()
                .map(|filter| {
                    let (is_sterilized, mandatory) = filter.as_booleans();
                    Predicate::Sterilization {
                        is_sterilized,
                        mandatory,
                    }
                })
                .collect(),
        ));
    }

    // Coexists with an explicit vaccination-date range; the intersection is
    // typically empty and that is a valid result, not an error.
    if criteria.no_scheduled_vaccination {
        groups.push(PredicateGroup::single(Predicate::NoVaccinationScheduled));
    }

    match free_text {
        FreeTextPlan::None => {}
        FreeTextPlan::RankedIds(ids) => {
            groups.push(PredicateGroup::single(Predicate::IdAnyOf(ids.to_vec())));
        }
        FreeTextPlan::StoreMatch(text) => {
            groups.push(PredicateGroup::single(Predicate::NameMatches(
                text.to_string(),
            )));
        }
    }

    groups
}

fn push_date_range(groups: &mut Vec<PredicateGroup>, field: DateField, range: &DateRange) {
    if !range.is_unset() {
        groups.push(PredicateGroup::single(Predicate::DateWithin {
            field,
            min: range.min,
            max: range.max,
        }));
    }
}
