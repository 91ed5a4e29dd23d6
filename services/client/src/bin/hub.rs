//! services/client/src/bin/hub.rs

use std::sync::Arc;
use std::time::Duration;

use async_openai::{config::OpenAIConfig, Client};
use client_lib::{
    adapters::{
        backend::HttpContentBackend, generative::OpenAiGenerativeAdapter,
        identity::HttpIdentityProvider, storage::{EnvSchemeDetector, JsonFileStorage},
    },
    config::Config,
    error::ClientError,
    state::HubState,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use access_hub_core::ports::{GenerativeModel, PreferenceStorage};
use access_hub_core::session::IdentitySession;

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting state layer...");

    let timeout = Duration::from_millis(config.request_timeout_ms);

    // --- 2. Initialize Service Adapters ---
    let backend = Arc::new(HttpContentBackend::new(&config.backend_base_url, timeout)?);
    let identity = Arc::new(HttpIdentityProvider::new(
        &config.identity_base_url,
        &config.identity_api_key,
        timeout,
    )?);
    let storage: Arc<dyn PreferenceStorage> =
        Arc::new(JsonFileStorage::new(config.storage_dir.clone()));

    let model: Option<Arc<dyn GenerativeModel>> = config.generative_api_key.as_ref().map(|key| {
        let openai_config = OpenAIConfig::new().with_api_key(key.clone());
        Arc::new(OpenAiGenerativeAdapter::new(
            Client::with_config(openai_config),
            &config.generative_model,
        )) as Arc<dyn GenerativeModel>
    });

    // Restore the backend auth token saved by a previous run.
    if let Some(token) = storage.load_token().await? {
        backend.set_auth_token(Some(token));
        info!("Restored saved backend auth token.");
    }

    // --- 3. Build the Session & Shared State ---
    let session = IdentitySession::new(identity.clone(), backend.clone());
    let state = HubState::new(
        config.clone(),
        backend,
        session.clone(),
        storage,
        Arc::new(EnvSchemeDetector),
        model,
    );

    session.initialize().await;
    state.theme.initialize().await;
    state.refresh_content().await;

    info!(
        authenticated = state.auth.is_logged_in(),
        theme = state.theme.theme(),
        generative = state.generative_enabled(),
        "State layer ready."
    );

    Ok(())
}
