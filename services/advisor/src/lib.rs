//! Donation Advisor Terminal Service
//!
//! Hosts a single question session in the terminal: environment
//! configuration, the terminal display surface, and the session loop. The
//! `advisor` binary is a thin wrapper around this library.

pub mod app;
pub mod config;
pub mod terminal;

use advisor_core::llm_client::{LLMClient, OpenAICompatibleClient};
use anyhow::Result;
use async_openai::config::OpenAIConfig;
use secrecy::ExposeSecret;
use std::sync::Arc;

/// Builds the OpenAI-compatible client for the configured provider.
pub fn build_client(config: &config::Config) -> Result<Arc<dyn LLMClient>> {
    let openai_config = OpenAIConfig::new()
        .with_api_key(config.api_key.expose_secret())
        .with_api_base(config.provider.api_base());
    Ok(Arc::new(OpenAICompatibleClient::new(
        openai_config,
        config.chat_model.clone(),
        config.request_timeout,
    )?))
}
