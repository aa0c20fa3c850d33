mod client;
mod models;

pub use client::{MeiliClient, MeiliError};
pub use models::{Hit, SearchRequest, SearchResponse};
