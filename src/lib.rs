pub mod app;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod guard;
pub mod handlers;
pub mod key;
pub mod models;
pub mod session;
pub mod state;
pub mod store;
pub mod ui;
#[cfg(test)]
mod testing;

pub use app::router;
pub use session::Tracker;
pub use state::AppState;
pub use store::{DocumentStore, HttpDocumentStore};
