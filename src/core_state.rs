//! Transport-agnostic application state.
//!
//! `CoreState` owns the medication store, the analyzer and the analysis
//! gate. It is wrapped in `Arc` at startup and shared with every request.

use std::sync::Arc;

use crate::analysis::{
    AnalysisError, InteractionAnalyzer, InteractionReport, LlmClient, MedicationEntry,
};
use crate::analysis_service::{ActiveAnalysis, AnalysisGate, AnalysisSource};
use crate::config::AnalyzerConfig;
use crate::store::{MedicationStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("An analysis is already running")]
    AnalysisBusy,
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Background task failed: {0}")]
    Worker(String),
}

pub struct CoreState {
    store: Arc<dyn MedicationStore>,
    analyzer: Arc<InteractionAnalyzer>,
    gate: Arc<AnalysisGate>,
}

impl CoreState {
    pub fn new(
        store: Arc<dyn MedicationStore>,
        llm: Arc<dyn LlmClient>,
        config: &AnalyzerConfig,
    ) -> Self {
        Self {
            store,
            analyzer: Arc::new(InteractionAnalyzer::new(llm, config)),
            gate: Arc::new(AnalysisGate::new()),
        }
    }

    pub fn store(&self) -> &dyn MedicationStore {
        self.store.as_ref()
    }

    pub fn analyzer(&self) -> &InteractionAnalyzer {
        &self.analyzer
    }

    pub fn is_analysis_running(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn current_analysis(&self) -> Option<ActiveAnalysis> {
        self.gate.current_analysis()
    }

    /// Analyze `entries` on a blocking worker while holding the gate.
    ///
    /// Empty input is rejected before the gate is touched. A concurrent
    /// call gets `AnalysisBusy` instead of waiting.
    pub async fn analyze(
        &self,
        source: AnalysisSource,
        entries: Vec<MedicationEntry>,
    ) -> Result<InteractionReport, CoreError> {
        if entries.is_empty() {
            return Err(AnalysisError::EmptyInput.into());
        }

        let guard = self
            .gate
            .try_acquire(source, self.analyzer.model(), entries.len())
            .ok_or(CoreError::AnalysisBusy)?;

        tracing::info!(%source, medications = entries.len(), "Interaction analysis started");

        let analyzer = Arc::clone(&self.analyzer);
        let result = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            analyzer.analyze(&entries)
        })
        .await
        .map_err(|e| CoreError::Worker(e.to_string()))?;

        Ok(result?)
    }

    /// Run a store operation on a blocking worker.
    pub async fn with_store<T, F>(&self, f: F) -> Result<T, CoreError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn MedicationStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| CoreError::Worker(e.to_string()))?;
        Ok(result?)
    }

    /// Analyze a snapshot of the stored medication list.
    pub async fn analyze_stored(&self) -> Result<InteractionReport, CoreError> {
        let entries = self
            .with_store(|store| {
                Ok(store
                    .list()?
                    .iter()
                    .map(MedicationEntry::from)
                    .collect::<Vec<_>>())
            })
            .await?;
        self.analyze(AnalysisSource::Stored, entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::analysis::MockLlmClient;
    use crate::models::MedicationInput;
    use crate::store::InMemoryStore;

    const EMPTY_REPORT: &str = r#"{"interactions": []}"#;

    fn core_with(mock: Arc<MockLlmClient>) -> Arc<CoreState> {
        Arc::new(CoreState::new(
            Arc::new(InMemoryStore::new()),
            mock,
            &AnalyzerConfig::default(),
        ))
    }

    fn entries() -> Vec<MedicationEntry> {
        vec![
            MedicationEntry::new("Sertralin", "50mg", "ráno"),
            MedicationEntry::new("Tramadol", "50mg", "při bolesti"),
        ]
    }

    #[tokio::test]
    async fn analyze_releases_gate_when_done() {
        let core = core_with(Arc::new(MockLlmClient::new(EMPTY_REPORT)));
        core.analyze(AnalysisSource::Submitted, entries()).await.unwrap();
        assert!(!core.is_analysis_running());
        assert!(core.current_analysis().is_none());
    }

    #[tokio::test]
    async fn analyze_releases_gate_on_error() {
        let mock = MockLlmClient::failing(AnalysisError::Upstream("down".into()));
        let core = core_with(Arc::new(mock));
        let err = core.analyze(AnalysisSource::Submitted, entries()).await.unwrap_err();
        assert!(matches!(err, CoreError::Analysis(AnalysisError::Upstream(_))));
        assert!(!core.is_analysis_running());
    }

    #[tokio::test]
    async fn empty_input_does_not_take_gate() {
        let mock = Arc::new(MockLlmClient::new(EMPTY_REPORT));
        let core = core_with(mock.clone());
        let err = core.analyze(AnalysisSource::Submitted, vec![]).await.unwrap_err();
        assert!(matches!(err, CoreError::Analysis(AnalysisError::EmptyInput)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_analysis_is_refused() {
        let mock = MockLlmClient::new(EMPTY_REPORT).with_delay(Duration::from_millis(300));
        let core = core_with(Arc::new(mock));

        let first = {
            let core = Arc::clone(&core);
            tokio::spawn(async move { core.analyze(AnalysisSource::Submitted, entries()).await })
        };

        let mut waited = 0;
        while !core.is_analysis_running() && waited < 100 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            waited += 1;
        }
        assert!(core.is_analysis_running());
        assert_eq!(core.current_analysis().unwrap().medication_count, 2);

        let second = core.analyze(AnalysisSource::Submitted, entries()).await;
        assert!(matches!(second, Err(CoreError::AnalysisBusy)));

        assert!(first.await.unwrap().is_ok());
        assert!(!core.is_analysis_running());
    }

    #[tokio::test]
    async fn analyze_stored_uses_store_contents() {
        let mock = Arc::new(MockLlmClient::new(EMPTY_REPORT));
        let core = core_with(mock.clone());
        core.store()
            .add(MedicationInput::new("Warfarin", "5mg", "1x denně"))
            .unwrap();

        core.analyze_stored().await.unwrap();
        assert!(mock.prompts()[0].contains("- Warfarin (5mg, 1x denně)"));
    }

    #[tokio::test]
    async fn with_store_runs_operation() {
        let core = core_with(Arc::new(MockLlmClient::new(EMPTY_REPORT)));
        let added = core
            .with_store(|store| store.add(MedicationInput::new("Paralen", "500mg", "3x denně")))
            .await
            .unwrap();
        let listed = core.with_store(|store| store.list()).await.unwrap();
        assert_eq!(listed, vec![added]);
    }

    #[tokio::test]
    async fn analyze_stored_with_empty_store_is_empty_input() {
        let core = core_with(Arc::new(MockLlmClient::new(EMPTY_REPORT)));
        let err = core.analyze_stored().await.unwrap_err();
        assert!(matches!(err, CoreError::Analysis(AnalysisError::EmptyInput)));
    }
}
