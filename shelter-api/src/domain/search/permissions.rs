//! Permission projection: runs once, before predicate construction, so the
//! rest of the pipeline never re-checks roles.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::criteria::{SearchCriteria, SortMode};
use super::traits::SearchError;

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
pub enum Role {
    Admin,
    AnimalManager,
    Veterinarian,
    Volunteer,
}

/// Caller identity and roles, resolved by the session layer upstream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PermissionContext {
    pub user_id: Option<i32>,
    pub roles: BTreeSet<Role>,
}

impl PermissionContext {
    /// Public website visitor: no identity, no roles.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_roles(user_id: i32, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            user_id: Some(user_id),
            roles: roles.into_iter().collect(),
        }
    }

    /// May filter and sort on sterilization/vaccination data, and see the
    /// corresponding result fields.
    pub fn can_see_health_data(&self) -> bool {
        self.roles.iter().any(|role| {
            matches!(role, Role::Admin | Role::AnimalManager | Role::Veterinarian)
        })
    }

    pub fn can_see_foster_families(&self) -> bool {
        self.roles
            .iter()
            .any(|role| matches!(role, Role::Admin | Role::AnimalManager))
    }
}

/// Which optional result fields may be projected for a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllowedFields {
    pub foster_family: bool,
    pub health: bool,
}

/// Narrow `criteria` to what `ctx` may use.
///
/// A disallowed `VACCINATION_ASC` sort is rejected rather than silently
/// downgraded; disallowed filters are stripped, since the absence of a filter
/// the caller may not use is a safe default.
pub fn restrict(
    criteria: SearchCriteria,
    ctx: &PermissionContext,
) -> Result<(SearchCriteria, AllowedFields), SearchError> {
    let allowed = AllowedFields {
        foster_family: ctx.can_see_foster_families(),
        health: ctx.can_see_health_data(),
    };

    let mut criteria = criteria;

    if !allowed.health {
        if criteria.sort == SortMode::VaccinationAsc {
            return Err(SearchError::Forbidden);
        }
        criteria.vaccination_date = Default::default();
        criteria.no_scheduled_vaccination = false;
        criteria.sterilization.clear();
    }

    if !allowed.foster_family {
        criteria.foster_family_ids.clear();
    }

    Ok((criteria, allowed))
}
