//! Model registry for the completion gateway

use super::openai::{OpenAIOptions, OpenAIService};
use super::{LlmService, LoggingService};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for completion providers
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub openai_api_key: Option<String>,
    /// Base URL of an `OpenAI`-compatible API, without `/chat/completions`
    pub base_url: String,
    /// Default model ID
    pub default_model: String,
    pub system_prompt: Option<String>,
    /// Messages remembered per conversation
    pub memory_window: usize,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            default_model: "gpt-4o-mini".to_string(),
            system_prompt: None,
            memory_window: 100,
            timeout: Duration::from_secs(300),
        }
    }
}

/// Registry of available completion models
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    default_model: String,
}

impl ModelRegistry {
    /// Create an empty registry whose default is `default_model`
    pub fn new_empty(default_model: impl Into<String>) -> Self {
        Self {
            services: HashMap::new(),
            default_model: default_model.into(),
        }
    }

    pub fn new(config: &LlmConfig) -> Self {
        let mut registry = Self::new_empty(config.default_model.clone());

        let Some(api_key) = config.openai_api_key.as_ref().filter(|k| !k.is_empty()) else {
            tracing::warn!("OPENAI_API_KEY not set, no completion models available");
            return registry;
        };

        match OpenAIService::new(OpenAIOptions {
            api_key: api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.default_model.clone(),
            system_prompt: config.system_prompt.clone(),
            memory_window: config.memory_window,
            timeout: config.timeout,
        }) {
            Ok(service) => registry.register(Arc::new(service)),
            Err(e) => tracing::error!(error = %e, "Failed to create completion service"),
        }

        registry
    }

    /// Register a service under its own model id, wrapped with logging
    pub fn register(&mut self, service: Arc<dyn LlmService>) {
        let model_id = service.model_id().to_string();
        self.services
            .insert(model_id, Arc::new(LoggingService::new(service)));
    }

    /// Get a model by ID
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    /// Get the default model
    pub fn default(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.default_model)
    }

    /// Get the default model ID
    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }

    /// Check if any models are available
    pub fn has_models(&self) -> bool {
        !self.services.is_empty()
    }
}
