use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::search::{
    gateway::MeiliGateway, repository::PgAnimalStore, AnimalSearchService, SearchConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: Arc<PgPool>,
    pub search: Arc<AnimalSearchService<MeiliGateway, PgAnimalStore>>,
}

impl AppState {
    pub fn new(db_pool: PgPool, gateway: MeiliGateway, config: SearchConfig) -> Self {
        let store = PgAnimalStore::new(db_pool.clone());

        Self {
            db_pool: Arc::new(db_pool),
            search: Arc::new(AnimalSearchService::new(gateway, store, config)),
        }
    }
}
