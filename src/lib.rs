// src/lib.rs
use std::sync::Arc;

use axum::{Router, routing::get};
use tracing::info;

pub mod assembler;
pub mod config;
pub mod db;
pub mod error;
mod handlers;
pub mod models;
pub mod resolver;
pub mod store;

use assembler::LinkBuilder;
use store::NoteStore;

/// Shared by every handler: the store and the builder for emitted links.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NoteStore>,
    pub links: LinkBuilder,
}

impl AppState {
    pub fn new(store: Arc<dyn NoteStore>, public_url: &str) -> Self {
        Self {
            store,
            links: LinkBuilder::new(public_url),
        }
    }
}

pub fn app(state: AppState) -> Router {
    info!("registering routes");

    Router::new()
        .route("/", get(handlers::index))
        .route("/notes", get(handlers::list_notes).post(handlers::create_note))
        .route(
            "/notes/:id",
            get(handlers::get_note)
                .delete(handlers::delete_note)
                .patch(handlers::patch_note),
        )
        .route("/notes/:id/tags", get(handlers::get_note_tags))
        .route("/tags", get(handlers::list_tags).post(handlers::create_tag))
        .route("/tags/:id", get(handlers::get_tag))
        .route("/tags/:id/notes", get(handlers::get_tagged_notes))
        .with_state(state)
}
