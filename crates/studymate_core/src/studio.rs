//! crates/studymate_core/src/studio.rs
//!
//! The studio: the single owned state container of a session. It wires the
//! source registry, pipeline runner, project store, chat router and view
//! controller together, and is the only place that mutates them.
//!
//! A `Studio` is a cheap handle over shared state. Tool runs and chat turns
//! execute on spawned tasks, so a caller that stops waiting does not cut them
//! short.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::activity::{ActivityGuard, ToolActivity, ToolStatus};
use crate::chat::{self, ChatMessage, ChatPhase, ChatRouter, IntentMatcher, Route};
use crate::domain::{Artifact, ArtifactKind, ImageData, ProjectSummary, Source, SourceKind};
use crate::error::{StudioError, StudioResult};
use crate::pipeline::PipelineRunner;
use crate::ports::{
    DocumentAnalysisService, ImageEditingService, ImageGenerationService,
    QuestionAnsweringService, StudyMaterialService,
};
use crate::projects::ProjectStore;
use crate::sources::{Ingested, SourceRegistry};
use crate::view::{Surface, ViewController, ViewState};

/// The capabilities of the AI collaborator the studio depends on.
#[derive(Clone)]
pub struct StudioServices {
    pub analyzer: Arc<dyn DocumentAnalysisService>,
    pub images: Arc<dyn ImageGenerationService>,
    pub image_editor: Arc<dyn ImageEditingService>,
    pub materials: Arc<dyn StudyMaterialService>,
    pub qa: Arc<dyn QuestionAnsweringService>,
}

#[derive(Debug, Clone)]
pub struct StudioSettings {
    /// Generation-intent vocabulary of the chat router.
    pub trigger_keywords: Vec<String>,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            trigger_keywords: chat::DEFAULT_TRIGGER_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct Studio {
    sources: SourceRegistry,
    pipelines: PipelineRunner,
    projects: Arc<RwLock<ProjectStore>>,
    view: Arc<Mutex<ViewController>>,
    chat: Arc<ChatRouter>,
    activity: Arc<ToolActivity>,
    image_editor: Arc<dyn ImageEditingService>,
    qa: Arc<dyn QuestionAnsweringService>,
}

impl Studio {
    pub fn new(services: StudioServices, settings: StudioSettings) -> Self {
        Self {
            sources: SourceRegistry::new(services.analyzer.clone()),
            pipelines: PipelineRunner::new(services.analyzer, services.images, services.materials),
            projects: Arc::new(RwLock::new(ProjectStore::new())),
            view: Arc::new(Mutex::new(ViewController::new())),
            chat: Arc::new(ChatRouter::new(IntentMatcher::new(&settings.trigger_keywords))),
            activity: Arc::new(ToolActivity::new()),
            image_editor: services.image_editor,
            qa: services.qa,
        }
    }

    pub fn pipelines(&self) -> &PipelineRunner {
        &self.pipelines
    }

    //=====================================================================================
    // Sources
    //=====================================================================================

    pub async fn ingest_source(
        &self,
        name: impl Into<String>,
        payload: Option<Bytes>,
        kind: SourceKind,
    ) -> Ingested {
        self.sources.ingest(name, payload, kind).await
    }

    pub async fn toggle_source(&self, id: Uuid) -> StudioResult<bool> {
        self.sources.toggle_selection(id).await
    }

    pub async fn sources(&self) -> Vec<Source> {
        self.sources.list().await
    }

    pub async fn source(&self, id: Uuid) -> Option<Source> {
        self.sources.get(id).await
    }

    pub async fn selected_source_ids(&self) -> Vec<Uuid> {
        self.sources.selected_ids().await
    }

    //=====================================================================================
    // Tools
    //=====================================================================================

    /// Runs one generation tool on the newest ready active source, then stores
    /// and opens the result.
    pub async fn run_tool(&self, kind: ArtifactKind) -> StudioResult<Artifact> {
        let guard = self.activity.start(kind)?;
        let Some(source) = self.sources.latest_ready().await else {
            return Err(StudioError::PreconditionUnmet(
                "select at least one source that has finished analyzing".to_string(),
            ));
        };

        info!(kind = %kind, source_id = %source.id, "Tool started.");
        let studio = self.clone();
        let task = tokio::spawn(async move { studio.complete_tool(kind, source, guard).await });
        task.await
            .map_err(|e| StudioError::generation(format!("{kind} task failed: {e}")))?
    }

    /// Generates and publishes; the status only leaves `Generating` once the
    /// artifact is listed.
    async fn complete_tool(
        &self,
        kind: ArtifactKind,
        source: Source,
        guard: ActivityGuard,
    ) -> StudioResult<Artifact> {
        match self.generate(kind, &source).await {
            Ok(artifact) => {
                self.publish(artifact.clone()).await;
                drop(guard);
                info!(kind = %kind, artifact_id = %artifact.id(), "Tool finished.");
                Ok(artifact)
            }
            Err(e) => {
                error!(kind = %kind, source_id = %source.id, "Tool failed: {}", e);
                guard.fail(&e);
                Err(e)
            }
        }
    }

    async fn generate(&self, kind: ArtifactKind, source: &Source) -> StudioResult<Artifact> {
        let document = source.document().ok_or_else(|| {
            StudioError::PreconditionUnmet(format!("source {} has no payload", source.id))
        })?;
        let artifact = match kind {
            ArtifactKind::Infographic => Artifact::Infographic(
                self.pipelines
                    .infographic(Some(&document), source.analysis.as_ref())
                    .await?,
            ),
            ArtifactKind::Presentation => {
                Artifact::Presentation(self.pipelines.presentation(&document).await?)
            }
            ArtifactKind::Flashcards => {
                Artifact::Flashcards(self.pipelines.flashcards(&document).await?)
            }
            ArtifactKind::Quiz => Artifact::Quiz(self.pipelines.quiz(&document).await?),
        };
        Ok(artifact)
    }

    pub fn tool_status(&self, kind: ArtifactKind) -> ToolStatus {
        self.activity.status(kind)
    }

    pub fn tool_statuses(&self) -> Vec<(ArtifactKind, ToolStatus)> {
        self.activity.snapshot()
    }

    //=====================================================================================
    // Projects
    //=====================================================================================

    /// Appends a finished artifact and opens it in the detail view.
    pub async fn publish(&self, artifact: Artifact) -> Uuid {
        let id = self.projects.write().await.append(artifact);
        self.view.lock().await.open(id);
        id
    }

    pub async fn projects(&self) -> ProjectStore {
        self.projects.read().await.clone()
    }

    pub async fn all_projects(&self) -> Vec<ProjectSummary> {
        self.projects.read().await.all_projects()
    }

    pub async fn find_project(&self, id: Uuid) -> Option<Artifact> {
        self.projects.read().await.find(id)
    }

    //=====================================================================================
    // Chat
    //=====================================================================================

    /// Handles one chat message: appends it, routes it, and appends exactly one reply.
    /// Pipeline and answering failures become a generic error reply.
    pub async fn submit_chat(&self, text: &str) -> StudioResult<ChatMessage> {
        let turn = self.chat.begin(text)?;
        let studio = self.clone();
        let task = tokio::spawn(async move {
            let reply = studio.route_turn(turn.text()).await;
            turn.finish(reply)
        });
        task.await
            .map_err(|e| StudioError::generation(format!("chat task failed: {e}")))
    }

    async fn route_turn(&self, text: &str) -> ChatMessage {
        let active = self.sources.active_sources().await;
        match chat::route(self.chat.matcher(), text, active) {
            Route::StillAnalyzing(source) => {
                info!(source_id = %source.id, "Poster requested while source is analyzing.");
                ChatMessage::assistant(chat::STILL_ANALYZING_MESSAGE)
            }
            Route::GenerateInfographic(source) => {
                let document = source.document();
                match self
                    .pipelines
                    .infographic(document.as_ref(), source.analysis.as_ref())
                    .await
                {
                    Ok(infographic) => {
                        self.publish(Artifact::Infographic(infographic)).await;
                        ChatMessage::action(chat::INFOGRAPHIC_READY_MESSAGE)
                    }
                    Err(e) => {
                        error!(source_id = %source.id, "Chat poster generation failed: {}", e);
                        ChatMessage::assistant(chat::GENERIC_ERROR_MESSAGE)
                    }
                }
            }
            Route::NeedSources => ChatMessage::assistant(chat::NEED_SOURCES_MESSAGE),
            Route::Answer(sources) => match self.qa.answer_question(&sources, text).await {
                Ok(answer) => ChatMessage::assistant(answer),
                Err(e) => {
                    error!("Question answering failed: {}", e);
                    ChatMessage::assistant(chat::GENERIC_ERROR_MESSAGE)
                }
            },
        }
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.chat.transcript()
    }

    pub fn chat_phase(&self) -> ChatPhase {
        self.chat.phase()
    }

    //=====================================================================================
    // Image editor
    //=====================================================================================

    /// Applies an instruction to an image. Any failure yields `None`.
    pub async fn edit_image(
        &self,
        image: &ImageData,
        instruction: &str,
    ) -> StudioResult<Option<ImageData>> {
        if instruction.trim().is_empty() {
            return Err(StudioError::PreconditionUnmet(
                "edit instruction is empty".to_string(),
            ));
        }
        match self.image_editor.edit_image(image, instruction).await {
            Ok(edited) => Ok(edited),
            Err(e) => {
                warn!("Image edit failed: {}", e);
                Ok(None)
            }
        }
    }

    //=====================================================================================
    // View
    //=====================================================================================

    /// Opens an artifact or a source in the detail view.
    pub async fn open(&self, id: Uuid) -> StudioResult<ViewState> {
        let known = self.projects.read().await.contains(id) || self.sources.contains(id).await;
        if !known {
            return Err(StudioError::NotFound(id));
        }
        let mut view = self.view.lock().await;
        view.open(id);
        Ok(view.state().clone())
    }

    pub async fn close(&self) -> ViewState {
        let mut view = self.view.lock().await;
        view.close();
        view.state().clone()
    }

    pub async fn select_surface(&self, surface: Surface) -> ViewState {
        let mut view = self.view.lock().await;
        view.select_surface(surface);
        view.state().clone()
    }

    pub async fn view_state(&self) -> ViewState {
        self.view.lock().await.state().clone()
    }
}
