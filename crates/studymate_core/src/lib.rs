pub mod activity;
pub mod chat;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod projects;
pub mod sources;
pub mod studio;
pub mod view;

pub use activity::ToolStatus;
pub use chat::{ChatMessage, ChatPhase, ChatRole, IntentMatcher, MessageKind};
pub use domain::{
    Artifact, ArtifactKind, AspectRatio, DocumentPayload, FlashcardSet, ImageData, Infographic,
    KeyConcept, Presentation, ProjectSummary, Quiz, Slide, Source, SourceAnalysis, SourceKind,
};
pub use error::{StudioError, StudioResult};
pub use ports::{
    DocumentAnalysisService, ImageEditingService, ImageGenerationService, PortError, PortResult,
    QuestionAnsweringService, StudyMaterialService,
};
pub use sources::{AnalysisOutcome, Ingested};
pub use studio::{Studio, StudioServices, StudioSettings};
pub use view::{Surface, ViewState};
