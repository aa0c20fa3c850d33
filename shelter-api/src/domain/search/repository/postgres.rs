//! PostgreSQL store adapter.
//!
//! The only place that knows SQL: predicate groups arrive as values and are
//! translated here with `sqlx::QueryBuilder`.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::animal::AnimalRecord;
use crate::domain::search::predicates::{DateField, Predicate, PredicateGroup};
use crate::domain::search::traits::{AnimalStore, Result, StoreOrder};

const SELECT_ANIMALS: &str = "SELECT id, name, alias, species, breed_name, gender, status, \
     birthdate, pick_up_date, pick_up_location, manager_id, foster_family_id, \
     is_sterilized, sterilization_mandatory, next_vaccination_date, avatar_url \
     FROM animals";

#[derive(Clone)]
pub struct PgAnimalStore {
    pool: PgPool,
}

impl PgAnimalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnimalStore for PgAnimalStore {
    async fn fetch_page(
        &self,
        groups: &[PredicateGroup],
        order: StoreOrder,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AnimalRecord>> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_ANIMALS);
        push_where(&mut builder, groups);
        builder.push(" ORDER BY ");
        builder.push(order_clause(order));
        builder.push(" LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let records = builder
            .build_query_as::<AnimalRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn fetch_unordered(&self, groups: &[PredicateGroup]) -> Result<Vec<AnimalRecord>> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_ANIMALS);
        push_where(&mut builder, groups);

        let records = builder
            .build_query_as::<AnimalRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn count(&self, groups: &[PredicateGroup]) -> Result<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM animals");
        push_where(&mut builder, groups);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn distinct_pick_up_locations(&self) -> Result<Vec<String>> {
        let locations = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT LOWER(pick_up_location) FROM animals \
             WHERE pick_up_location IS NOT NULL ORDER BY 1",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(locations)
    }
}

/// `WHERE (a OR b) AND (c) AND ...` — groups conjoined, alternatives within a
/// group disjoined.
fn push_where(builder: &mut QueryBuilder<'_, Postgres>, groups: &[PredicateGroup]) {
    for (index, group) in groups.iter().enumerate() {
        builder.push(if index == 0 { " WHERE (" } else { " AND (" });
        for (alt_index, predicate) in group.alternatives().iter().enumerate() {
            if alt_index > 0 {
                builder.push(" OR ");
            }
            push_predicate(builder, predicate);
        }
        builder.push(")");
    }
}

fn push_predicate(builder: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::SpeciesAnyOf(species) => {
            builder.push("species = ANY(");
            builder.push_bind(species.clone());
            builder.push(")");
        }
        Predicate::StatusAnyOf(statuses) => {
            builder.push("status = ANY(");
            builder.push_bind(statuses.clone());
            builder.push(")");
        }
        Predicate::ManagerAnyOf(ids) => {
            builder.push("manager_id = ANY(");
            builder.push_bind(ids.clone());
            builder.push(")");
        }
        Predicate::FosterFamilyAnyOf(ids) => {
            builder.push("foster_family_id = ANY(");
            builder.push_bind(ids.clone());
            builder.push(")");
        }
        Predicate::PickUpLocationAnyOf(locations) => {
            builder.push("LOWER(pick_up_location) = ANY(");
            builder.push_bind(locations.clone());
            builder.push(")");
        }
        Predicate::IdAnyOf(ids) => {
            builder.push("id = ANY(");
            builder.push_bind(ids.clone());
            builder.push(")");
        }
        Predicate::DateWithin { field, min, max } => {
            let column = date_column(*field);
            builder.push("(");
            let mut first = true;
            if let Some(min) = min {
                builder.push(column);
                builder.push(" >= ");
                builder.push_bind(*min);
                first = false;
            }
            if let Some(max) = max {
                if !first {
                    builder.push(" AND ");
                }
                builder.push(column);
                builder.push(" <= ");
                builder.push_bind(*max);
            }
            builder.push(")");
        }
        Predicate::AgeWindow {
            species,
            born_after,
            born_until,
        } => {
            builder.push("(species = ");
            builder.push_bind(*species);
            if let Some(after) = born_after {
                builder.push(" AND birthdate > ");
                builder.push_bind(*after);
            }
            if let Some(until) = born_until {
                builder.push(" AND birthdate <= ");
                builder.push_bind(*until);
            }
            builder.push(")");
        }
        Predicate::Sterilization {
            is_sterilized,
            mandatory,
        } => {
            builder.push("(is_sterilized = ");
            builder.push_bind(*is_sterilized);
            builder.push(" AND sterilization_mandatory = ");
            builder.push_bind(*mandatory);
            builder.push(")");
        }
        Predicate::NoVaccinationScheduled => {
            builder.push("next_vaccination_date IS NULL");
        }
        Predicate::NameMatches(text) => {
            let pattern = format!("%{}%", escape_like(text));
            builder.push("(name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR alias ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
    }
}

fn date_column(field: DateField) -> &'static str {
    match field {
        DateField::Birthdate => "birthdate",
        DateField::PickUpDate => "pick_up_date",
        DateField::VaccinationDate => "next_vaccination_date",
    }
}

/// Id ascending as the secondary key keeps pagination deterministic when the
/// primary sort key ties.
fn order_clause(order: StoreOrder) -> &'static str {
    match order {
        StoreOrder::Name => "LOWER(name) ASC, id ASC",
        StoreOrder::BirthdateDesc => "birthdate DESC, id ASC",
        StoreOrder::PickUpDateDesc => "pick_up_date DESC, id ASC",
        StoreOrder::VaccinationAsc => "next_vaccination_date ASC NULLS LAST, id ASC",
    }
}

fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
