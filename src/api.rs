//! HTTP API for the dream interview engine
//!
//! A thin handling layer: each route maps onto one engine entry point and
//! returns the outbound messages for the chat transport to deliver.

mod handlers;
mod types;

pub use handlers::create_router;

use crate::llm::ModelRegistry;
use crate::runtime::DreamEngine;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DreamEngine>,
    pub llm_registry: Arc<ModelRegistry>,
}

impl AppState {
    pub fn new(llm_registry: Arc<ModelRegistry>) -> Self {
        Self {
            engine: Arc::new(DreamEngine::from_registry(&llm_registry)),
            llm_registry,
        }
    }
}
