use axum::{http::Method, routing::get, Router};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};
use url::Url;

use crate::{
    app_state::AppState,
    config::Settings,
    domain::search::{gateway::MeiliGateway, SearchConfig},
    routes,
};

pub fn create(connection_pool: PgPool, config: Settings) -> Router<()> {
    let meili_url = Url::parse(&config.search.host).expect("Invalid Meilisearch URL");
    let gateway = MeiliGateway::new(
        meili::MeiliClient::new(meili_url, config.search.api_key.clone()),
        config.search.index_uid.clone(),
    );
    let search_config = SearchConfig {
        page_size: config.search.page_size,
        max_fuzzy_candidates: config.search.max_candidates,
        gateway_timeout: config.search.gateway_timeout(),
    };

    let app_state = AppState::new(connection_pool, gateway, search_config);

    let app_url = config.application.app_url.clone();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(["content-type".parse().unwrap()])
        .allow_credentials(true)
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin.to_str().is_ok_and(|origin| origin == app_url)
        }));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/animals", routes::animals::router())
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
