//! crates/studymate_core/src/error.rs
//!
//! The failure taxonomy of the orchestration layer.

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StudioError {
    /// The analysis capability rejected the document or returned an invalid structure.
    #[error("Analysis failed: {0}")]
    AnalysisFailure(String),

    /// A structured-generation or image-generation call failed or returned nothing usable.
    #[error("Generation failed: {0}")]
    GenerationFailure(String),

    /// A single slide's image call failed. Recovered inside the presentation pipeline.
    #[error("Image for slide {slide_index} failed: {reason}")]
    PartialMediaFailure { slide_index: usize, reason: String },

    /// A tool was invoked without an eligible source or input.
    #[error("Precondition unmet: {0}")]
    PreconditionUnmet(String),

    /// The same tool (or the chat) already has a request in flight.
    #[error("{0} is already in progress")]
    Busy(String),

    #[error("Item not found: {0}")]
    NotFound(Uuid),
}

/// A convenience type alias for `Result<T, StudioError>`.
pub type StudioResult<T> = Result<T, StudioError>;

impl StudioError {
    pub fn analysis(reason: impl std::fmt::Display) -> Self {
        StudioError::AnalysisFailure(reason.to_string())
    }

    pub fn generation(reason: impl std::fmt::Display) -> Self {
        StudioError::GenerationFailure(reason.to_string())
    }
}
