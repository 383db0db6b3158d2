use crate::services::collector::StatsCollector;
use rocket::figment::Provider;
use rocket::{routes, Build, Rocket};
use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub struct AppState {
    pub collector: Arc<StatsCollector>,
}

pub fn build_rocket<T: Provider>(figment: T, state: AppState) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(state)
        .mount("/", routes![api::status, api::collect])
}
