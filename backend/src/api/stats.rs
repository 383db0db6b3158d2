use crate::models::{ChannelSnapshot, ErrorResponse, StatusResponse};
use crate::AppState;
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{get, Responder, State};

#[derive(Responder)]
pub enum CollectResponse {
    Snapshot(Json<ChannelSnapshot>),
    Failed(Json<ErrorResponse>),
}

#[get("/")]
pub fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "Service online".to_string(),
    })
}

/// Runs one collection on demand, alongside any scheduled run in flight.
#[get("/collect")]
pub async fn collect(state: &State<AppState>) -> CollectResponse {
    match state.collector.collect(Utc::now()).await {
        Some(snapshot) => CollectResponse::Snapshot(Json(snapshot)),
        None => CollectResponse::Failed(Json(ErrorResponse {
            error: "Error during collection".to_string(),
        })),
    }
}
