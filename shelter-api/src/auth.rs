//! Caller identity at the service boundary.
//!
//! Session handling is terminated upstream; the proxy forwards the resolved
//! user as trusted headers. Missing or malformed headers yield the anonymous
//! context, matching the lossy-tolerant posture of query parsing.

use std::convert::Infallible;
use std::str::FromStr;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::domain::search::{PermissionContext, Role};

const USER_ID_HEADER: &str = "x-shelter-user-id";
const ROLES_HEADER: &str = "x-shelter-user-roles";

pub fn context_from_headers(headers: &HeaderMap) -> PermissionContext {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i32>().ok());

    let roles = headers
        .get(ROLES_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .filter_map(|role| Role::from_str(role.trim()).ok())
                .collect()
        })
        .unwrap_or_default();

    PermissionContext { user_id, roles }
}

#[async_trait]
impl<S> FromRequestParts<S> for PermissionContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(context_from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::collections::BTreeSet;

    #[test]
    fn missing_headers_yield_anonymous() {
        let ctx = context_from_headers(&HeaderMap::new());
        assert_eq!(ctx, PermissionContext::anonymous());
    }

    #[test]
    fn headers_resolve_identity_and_roles() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("42"));
        headers.insert(
            ROLES_HEADER,
            HeaderValue::from_static("ANIMAL_MANAGER, VOLUNTEER"),
        );

        let ctx = context_from_headers(&headers);
        assert_eq!(ctx.user_id, Some(42));
        assert_eq!(
            ctx.roles,
            BTreeSet::from([Role::AnimalManager, Role::Volunteer])
        );
        assert!(ctx.can_see_foster_families());
    }

    #[test]
    fn unknown_roles_are_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert(ROLES_HEADER, HeaderValue::from_static("SUPERUSER,VOLUNTEER"));

        let ctx = context_from_headers(&headers);
        assert_eq!(ctx.roles, BTreeSet::from([Role::Volunteer]));
    }
}
