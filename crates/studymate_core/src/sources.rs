//! crates/studymate_core/src/sources.rs
//!
//! The source registry: holds uploaded documents, the set of sources that are
//! active as chat context, and runs the one-off analysis pass for PDFs.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{DocumentPayload, Source, SourceKind};
use crate::error::{StudioError, StudioResult};
use crate::ports::DocumentAnalysisService;

#[derive(Default)]
struct RegistryState {
    /// Ingestion order.
    sources: Vec<Source>,
    /// Active-context set, kept in selection order.
    selected: Vec<Uuid>,
}

/// The result of ingesting a document.
pub struct Ingested {
    /// The source as stored right after ingestion.
    pub source: Source,
    /// The background analysis, when one was started.
    pub analysis: Option<AnalysisTask>,
}

/// How a background analysis attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Completed,
    Failed(String),
}

/// Handle to a spawned analysis. Dropping it does not cancel the analysis;
/// there is no cancellation, and a later attempt does not supersede this one.
pub struct AnalysisTask {
    source_id: Uuid,
    handle: JoinHandle<AnalysisOutcome>,
}

impl AnalysisTask {
    pub fn source_id(&self) -> Uuid {
        self.source_id
    }

    /// Waits until the registry has recorded the outcome.
    pub async fn wait(self) -> AnalysisOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => AnalysisOutcome::Failed(e.to_string()),
        }
    }
}

/// Owns every source of the session. Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct SourceRegistry {
    state: Arc<RwLock<RegistryState>>,
    analyzer: Arc<dyn DocumentAnalysisService>,
}

impl SourceRegistry {
    pub fn new(analyzer: Arc<dyn DocumentAnalysisService>) -> Self {
        Self {
            state: Arc::new(RwLock::new(RegistryState::default())),
            analyzer,
        }
    }

    /// Stores a new source and adds it to the active context.
    ///
    /// For a PDF with a payload, the analysis capability is invoked in a spawned
    /// task; this method returns before it settles. Analysis failures are logged
    /// and absorbed: the source simply stays without analysis.
    pub async fn ingest(
        &self,
        name: impl Into<String>,
        payload: Option<Bytes>,
        kind: SourceKind,
    ) -> Ingested {
        let source = Source::new(name, payload, kind);
        {
            let mut state = self.state.write().await;
            state.sources.push(source.clone());
            state.selected.push(source.id);
        }
        info!(
            source_id = %source.id,
            kind = ?source.kind,
            analyzing = source.is_analyzing,
            "Source ingested: '{}'",
            source.name
        );

        let analysis = if source.is_analyzing {
            source
                .document()
                .map(|document| self.spawn_analysis(source.id, document))
        } else {
            None
        };

        Ingested { source, analysis }
    }

    fn spawn_analysis(&self, source_id: Uuid, document: DocumentPayload) -> AnalysisTask {
        let registry = self.clone();
        let handle = tokio::spawn(async move { registry.run_analysis(source_id, document).await });
        AnalysisTask { source_id, handle }
    }

    async fn run_analysis(&self, source_id: Uuid, document: DocumentPayload) -> AnalysisOutcome {
        let started = Instant::now();
        let result = self.analyzer.analyze_document(&document).await;
        info!(source_id = %source_id, "⏱️ Analysis took: {:?}", started.elapsed());

        let mut state = self.state.write().await;
        let Some(source) = state.sources.iter_mut().find(|s| s.id == source_id) else {
            warn!(source_id = %source_id, "Analysis finished for an unknown source.");
            return AnalysisOutcome::Failed(format!("unknown source {source_id}"));
        };
        source.is_analyzing = false;

        match result {
            Ok(analysis) => {
                info!(source_id = %source_id, "Analysis complete: '{}'", analysis.title);
                source.analysis = Some(analysis);
                AnalysisOutcome::Completed
            }
            Err(e) => {
                warn!(
                    source_id = %source_id,
                    "Analysis failed, source stays usable without it: {}",
                    StudioError::analysis(&e)
                );
                AnalysisOutcome::Failed(e.to_string())
            }
        }
    }

    /// Flips membership of `id` in the active-context set. Returns the new membership.
    pub async fn toggle_selection(&self, id: Uuid) -> StudioResult<bool> {
        let mut state = self.state.write().await;
        if !state.sources.iter().any(|s| s.id == id) {
            return Err(StudioError::NotFound(id));
        }
        if let Some(position) = state.selected.iter().position(|selected| *selected == id) {
            state.selected.remove(position);
            Ok(false)
        } else {
            state.selected.push(id);
            Ok(true)
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<Source> {
        let state = self.state.read().await;
        state.sources.iter().find(|s| s.id == id).cloned()
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        let state = self.state.read().await;
        state.sources.iter().any(|s| s.id == id)
    }

    /// All sources in ingestion order.
    pub async fn list(&self) -> Vec<Source> {
        self.state.read().await.sources.clone()
    }

    pub async fn selected_ids(&self) -> Vec<Uuid> {
        self.state.read().await.selected.clone()
    }

    /// Selected sources, in ingestion order.
    pub async fn active_sources(&self) -> Vec<Source> {
        let state = self.state.read().await;
        state
            .sources
            .iter()
            .filter(|s| state.selected.contains(&s.id))
            .cloned()
            .collect()
    }

    /// The most recently ingested active source, analyzing or not.
    pub async fn latest_active(&self) -> Option<Source> {
        self.active_sources().await.pop()
    }

    /// The most recently ingested active source that can feed a generation tool.
    pub async fn latest_ready(&self) -> Option<Source> {
        self.active_sources()
            .await
            .into_iter()
            .rev()
            .find(Source::is_ready)
    }
}
