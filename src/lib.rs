pub mod analysis; // Prompt, model call, reply parsing + validation
pub mod analysis_service; // Single-flight analysis gate
pub mod api; // HTTP API under /api
pub mod config;
pub mod core_state; // Shared state behind every request
pub mod models;
pub mod store; // Medication list persistence

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::analysis::AnthropicClient;
use crate::config::AppConfig;
use crate::core_state::CoreState;
use crate::store::JsonFileStore;

/// Build the shared state from configuration.
pub fn build_core(config: &AppConfig) -> Arc<CoreState> {
    let store = Arc::new(JsonFileStore::new(&config.data_dir));
    let llm = Arc::new(AnthropicClient::from_config(&config.analyzer));
    Arc::new(CoreState::new(store, llm, &config.analyzer))
}

/// Initialize logging, load configuration and serve the API until Ctrl-C.
pub async fn run() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("medcheck starting v{}", config::APP_VERSION);

    let config = AppConfig::from_env();
    if config.analyzer.api_key.is_none() {
        tracing::warn!(
            "{} is not set, analysis requests will fail until it is configured",
            config::ENV_API_KEY
        );
    }
    tracing::info!(
        data_dir = %config.data_dir.display(),
        model = %config.analyzer.model,
        language = %config.analyzer.language,
        timeout_secs = config.analyzer.timeout_secs,
        "Configuration loaded"
    );

    let core = build_core(&config);
    let mut server = api::start_api_server(core, config.bind_addr).await?;
    tracing::info!(addr = %server.session.server_addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    server.shutdown();
    server.wait().await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn build_core_uses_file_store_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            analyzer: config::AnalyzerConfig::default(),
            data_dir: dir.path().to_path_buf(),
            bind_addr: ([127, 0, 0, 1], 0).into(),
        };

        let core = build_core(&config);
        assert!(!core.analyzer().is_configured());

        core.with_store(|store| store.add(models::MedicationInput::new("Warfarin", "5mg", "1x denně")))
            .await
            .unwrap();
        assert!(dir.path().join("medications.json").exists());
    }
}
