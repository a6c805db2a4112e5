// src/handlers.rs
use axum::{
    extract::{FromRequest, Path, State},
    response::IntoResponse,
    Json,
};
use http::StatusCode;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::{CreateChoiceRequest, CreatePollRequest};
use crate::poll::PollService;

/// JSON body whose rejections are reported as `AppError::Validation`.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Create a poll
pub async fn create_poll(
    State(service): State<PollService>,
    AppJson(req): AppJson<CreatePollRequest>,
) -> AppResult<impl IntoResponse> {
    let poll = service.create_poll(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Poll created successfully", "poll": poll })),
    ))
}

/// Attach a choice to an open poll
pub async fn create_choice(
    State(service): State<PollService>,
    AppJson(req): AppJson<CreateChoiceRequest>,
) -> AppResult<impl IntoResponse> {
    let choice = service.create_choice(req).await?;
    Ok((StatusCode::CREATED, Json(choice)))
}

/// Vote for a choice
pub async fn cast_vote(
    State(service): State<PollService>,
    Path(choice_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let vote = service.cast_vote(&choice_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Vote recorded", "vote": vote })),
    ))
}

/// Fetch all polls
pub async fn list_polls(State(service): State<PollService>) -> AppResult<impl IntoResponse> {
    let polls = service.list_polls().await?;
    Ok(Json(json!({ "getPolls": polls })))
}

/// Fetch the choices of one poll
pub async fn list_choices(
    State(service): State<PollService>,
    Path(poll_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(service.list_choices(&poll_id).await?))
}

/// Get the winning choice of a poll
pub async fn get_result(
    State(service): State<PollService>,
    Path(poll_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(service.compute_result(&poll_id).await?))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
