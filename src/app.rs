use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/users", post(handlers::create_user_form))
        .route("/users/select", post(handlers::select_user_form))
        .route("/calendar/prev", post(handlers::previous_month))
        .route("/calendar/next", post(handlers::next_month))
        .route("/workouts/toggle", post(handlers::toggle_form))
        .route("/notes", post(handlers::save_notes_form))
        .route("/api/state", get(handlers::get_state))
        .route("/api/users", post(handlers::create_user))
        .route("/api/users/select", post(handlers::select_user))
        .route("/api/workouts/toggle", post(handlers::toggle))
        .route("/api/notes", post(handlers::save_notes))
        .with_state(state)
}
