use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    domain::search::{PermissionContext, ResultPage, SearchCriteria, SearchError},
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_animals))
        .route("/pick-up-locations", get(pick_up_locations))
}

#[instrument(name = "GET /animals", skip(app_state, ctx))]
async fn search_animals(
    ctx: PermissionContext,
    State(app_state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<ResultPage>, (StatusCode, String)> {
    let raw_query = raw_query.unwrap_or_default();
    let criteria =
        SearchCriteria::from_query_pairs(url::form_urlencoded::parse(raw_query.as_bytes()));

    let page = app_state
        .search
        .search(criteria, &ctx)
        .await
        .map_err(error_response)?;

    Ok(Json(page))
}

#[instrument(name = "GET /animals/pick-up-locations", skip(app_state))]
async fn pick_up_locations(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<String>>, (StatusCode, String)> {
    let locations = app_state
        .search
        .pick_up_locations()
        .await
        .map_err(error_response)?;

    Ok(Json(locations))
}

fn error_response(err: SearchError) -> (StatusCode, String) {
    let status = match err {
        SearchError::Forbidden => StatusCode::FORBIDDEN,
        SearchError::Gateway(_) => StatusCode::BAD_GATEWAY,
        SearchError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}
