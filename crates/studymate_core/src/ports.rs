//! crates/studymate_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the capabilities of the external
//! generative-AI collaborator. These traits form the boundary of the hexagonal
//! architecture: the orchestration core only ever talks to them, never to a
//! concrete backend.

use async_trait::async_trait;

use crate::domain::{
    AspectRatio, DocumentPayload, FlashcardDraft, ImageData, PresentationOutline, QuizDraft,
    Source, SourceAnalysis,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors of the backend (network, HTTP, JSON).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("Malformed backend response: {0}")]
    Malformed(String),
    #[error("Backend response contained no usable payload")]
    Empty,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DocumentAnalysisService: Send + Sync {
    /// Derives title, visual layout description, summary and key concepts from a document.
    async fn analyze_document(&self, document: &DocumentPayload) -> PortResult<SourceAnalysis>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Synthesizes an image from a text instruction. `Ok(None)` means the backend
    /// answered without an image.
    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> PortResult<Option<ImageData>>;
}

#[async_trait]
pub trait ImageEditingService: Send + Sync {
    /// Applies a text instruction to an existing image.
    async fn edit_image(&self, image: &ImageData, instruction: &str)
        -> PortResult<Option<ImageData>>;
}

#[async_trait]
pub trait StudyMaterialService: Send + Sync {
    async fn generate_flashcards(&self, document: &DocumentPayload) -> PortResult<FlashcardDraft>;

    async fn generate_quiz(&self, document: &DocumentPayload) -> PortResult<QuizDraft>;

    /// Plans a slide deck. The returned slides carry no images.
    async fn generate_presentation_outline(
        &self,
        document: &DocumentPayload,
    ) -> PortResult<PresentationOutline>;
}

#[async_trait]
pub trait QuestionAnsweringService: Send + Sync {
    /// Answers a free-text prompt using the given sources as context.
    async fn answer_question(&self, sources: &[Source], prompt: &str) -> PortResult<String>;
}
