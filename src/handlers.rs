use crate::errors::AppError;
use crate::session::{CreateOutcome, NotesOutcome, SessionView, ToggleOutcome};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::State,
    response::{Html, Redirect},
    Form, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct NotesRequest {
    pub notes: String,
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let view = state.tracker.flash_view().await;
    render_index(&view).map(Html).map_err(AppError::internal)
}

pub async fn get_state(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.tracker.view().await)
}

pub async fn select_user(
    State(state): State<AppState>,
    Json(payload): Json<UserRequest>,
) -> Result<Json<SessionView>, AppError> {
    state.tracker.select_user(&payload.name).await?;
    Ok(Json(state.tracker.view().await))
}

pub async fn select_user_form(
    State(state): State<AppState>,
    Form(payload): Form<UserRequest>,
) -> Result<Redirect, AppError> {
    state.tracker.select_user(&payload.name).await?;
    Ok(Redirect::to("/"))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserRequest>,
) -> Result<Json<CreateOutcome>, AppError> {
    Ok(Json(state.tracker.create_user(&payload.name).await?))
}

pub async fn create_user_form(
    State(state): State<AppState>,
    Form(payload): Form<UserRequest>,
) -> Result<Redirect, AppError> {
    state.tracker.create_user(&payload.name).await?;
    Ok(Redirect::to("/"))
}

pub async fn previous_month(State(state): State<AppState>) -> Redirect {
    state.tracker.previous_month().await;
    Redirect::to("/")
}

pub async fn next_month(State(state): State<AppState>) -> Redirect {
    state.tracker.next_month().await;
    Redirect::to("/")
}

pub async fn toggle(
    State(state): State<AppState>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleOutcome>, AppError> {
    let date = parse_date(&payload.date)?;
    Ok(Json(state.tracker.toggle_workout(date).await?))
}

pub async fn toggle_form(
    State(state): State<AppState>,
    Form(payload): Form<ToggleRequest>,
) -> Result<Redirect, AppError> {
    let date = parse_date(&payload.date)?;
    state.tracker.toggle_workout(date).await?;
    Ok(Redirect::to("/"))
}

pub async fn save_notes(
    State(state): State<AppState>,
    Json(payload): Json<NotesRequest>,
) -> Result<Json<NotesOutcome>, AppError> {
    Ok(Json(state.tracker.save_notes(payload.notes).await?))
}

pub async fn save_notes_form(
    State(state): State<AppState>,
    Form(payload): Form<NotesRequest>,
) -> Result<Redirect, AppError> {
    state.tracker.save_notes(payload.notes).await?;
    Ok(Redirect::to("/"))
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::bad_request("date must be YYYY-MM-DD"))
}
