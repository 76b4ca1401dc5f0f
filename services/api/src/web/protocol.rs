//! services/api/src/web/protocol.rs
//!
//! Defines the JSON request and response bodies of the REST API. Domain types
//! are serialized as-is; these structs cover everything the domain does not
//! already shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studymate_core::{ArtifactKind, Source, SourceAnalysis, SourceKind, ToolStatus};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Requests
//=========================================================================================

/// A pasted text source.
#[derive(Deserialize, Debug, ToSchema)]
pub struct TextSourceRequest {
    pub name: String,
    pub text: String,
}

/// One chat turn typed by the user.
#[derive(Deserialize, Debug, ToSchema)]
pub struct ChatRequest {
    pub text: String,
}

/// An image to edit, as a `data:` URL, and the instruction to apply.
#[derive(Deserialize, Debug, ToSchema)]
pub struct EditImageRequest {
    pub image: String,
    pub instruction: String,
}

//=========================================================================================
// Responses
//=========================================================================================

/// A source as listed to the client, with its selection flag.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceView {
    pub id: Uuid,
    pub name: String,
    #[schema(value_type = String, example = "pdf")]
    pub kind: SourceKind,
    pub is_analyzing: bool,
    #[schema(value_type = Option<Object>)]
    pub analysis: Option<SourceAnalysis>,
    pub selected: bool,
    pub created_at: DateTime<Utc>,
}

impl SourceView {
    pub fn new(source: Source, selected: bool) -> Self {
        Self {
            id: source.id,
            name: source.name,
            kind: source.kind,
            is_analyzing: source.is_analyzing,
            analysis: source.analysis,
            selected,
            created_at: source.created_at,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ToggleResponse {
    pub id: Uuid,
    pub selected: bool,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ToolStatusEntry {
    #[schema(value_type = String, example = "quiz")]
    pub kind: ArtifactKind,
    #[schema(value_type = Object)]
    pub status: ToolStatus,
}

/// The edited image as a `data:` URL, or `null` when the edit produced nothing.
#[derive(Serialize, Debug, ToSchema)]
pub struct EditImageResponse {
    pub image: Option<String>,
}
