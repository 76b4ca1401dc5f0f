//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::{ErrorBody, HttpError};
use crate::web::protocol::{
    ChatRequest, EditImageRequest, EditImageResponse, SourceView, TextSourceRequest,
    ToggleResponse, ToolStatusEntry,
};
use crate::web::state::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use bytes::Bytes;
use std::sync::Arc;
use studymate_core::{ArtifactKind, ImageData, SourceKind, StudioError, Surface};
use tracing::{info, warn};
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        upload_source_handler,
        text_source_handler,
        list_sources_handler,
        toggle_source_handler,
        run_tool_handler,
        list_tools_handler,
        list_projects_handler,
        get_project_handler,
        submit_chat_handler,
        transcript_handler,
        open_view_handler,
        close_view_handler,
        chat_view_handler,
        view_state_handler,
        edit_image_handler,
    ),
    components(
        schemas(
            SourceView, TextSourceRequest, ToggleResponse, ToolStatusEntry, ChatRequest,
            EditImageRequest, EditImageResponse, ErrorBody
        )
    ),
    tags(
        (name = "StudyMate API", description = "Sources, study-material generation, chat and view state of the StudyMate studio.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Sources
//=========================================================================================

/// Guesses the source kind of an upload without an explicit `kind` part.
fn infer_kind(content_type: Option<&str>, file_name: &str) -> SourceKind {
    let is_pdf = content_type.is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"))
        || file_name.to_ascii_lowercase().ends_with(".pdf");
    if is_pdf {
        SourceKind::Pdf
    } else {
        SourceKind::Text
    }
}

/// Oversized uploads surface here as 413, everything else as 400.
fn multipart_error(error: MultipartError) -> HttpError {
    HttpError {
        status: error.status(),
        message: format!("Failed to read multipart data: {}", error.body_text()),
    }
}

/// Upload a document as a new source.
///
/// Accepts a multipart/form-data request with a `file` part and an optional
/// `kind` part (`pdf` or `text`). PDF analysis continues after the response.
#[utoipa::path(
    post,
    path = "/sources",
    request_body(content_type = "multipart/form-data", description = "The document to upload."),
    responses(
        (status = 202, description = "Source registered, analysis running", body = SourceView),
        (status = 400, description = "Missing file or unknown kind", body = ErrorBody),
        (status = 413, description = "Upload too large")
    )
)]
pub async fn upload_source_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    let mut file: Option<(String, Option<String>, Bytes)> = None;
    let mut declared_kind: Option<SourceKind> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or("untitled").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((name, content_type, data));
            }
            Some("kind") => {
                let value = field.text().await.map_err(multipart_error)?;
                declared_kind = Some(SourceKind::parse(&value).ok_or_else(|| {
                    HttpError::bad_request(format!("Unknown source kind '{}'", value))
                })?);
            }
            _ => {}
        }
    }

    let Some((name, content_type, data)) = file else {
        return Err(HttpError::bad_request("Multipart form must include a file"));
    };
    if data.is_empty() {
        return Err(HttpError::bad_request("Uploaded file is empty"));
    }
    let kind = declared_kind.unwrap_or_else(|| infer_kind(content_type.as_deref(), &name));

    info!("Received upload '{}' ({:?}, {} bytes)", name, kind, data.len());
    let ingested = app_state.studio.ingest_source(name, Some(data), kind).await;
    Ok((
        StatusCode::ACCEPTED,
        Json(SourceView::new(ingested.source, true)),
    ))
}

/// Add pasted text as a new source.
#[utoipa::path(
    post,
    path = "/sources/text",
    request_body = TextSourceRequest,
    responses(
        (status = 201, description = "Text source registered", body = SourceView),
        (status = 400, description = "Empty text", body = ErrorBody)
    )
)]
pub async fn text_source_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<TextSourceRequest>,
) -> Result<impl IntoResponse, HttpError> {
    if request.text.trim().is_empty() {
        return Err(HttpError::bad_request("Text must not be empty"));
    }
    let name = if request.name.trim().is_empty() {
        "Pasted text".to_string()
    } else {
        request.name
    };

    let ingested = app_state
        .studio
        .ingest_source(name, Some(Bytes::from(request.text)), SourceKind::Text)
        .await;
    Ok((
        StatusCode::CREATED,
        Json(SourceView::new(ingested.source, true)),
    ))
}

/// List all sources in ingestion order.
#[utoipa::path(
    get,
    path = "/sources",
    responses((status = 200, description = "All sources", body = Vec<SourceView>))
)]
pub async fn list_sources_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let selected = app_state.studio.selected_source_ids().await;
    let views: Vec<SourceView> = app_state
        .studio
        .sources()
        .await
        .into_iter()
        .map(|source| {
            let is_selected = selected.contains(&source.id);
            SourceView::new(source, is_selected)
        })
        .collect();
    Json(views)
}

/// Flip whether a source is part of the active context.
#[utoipa::path(
    post,
    path = "/sources/{id}/toggle",
    params(("id" = Uuid, Path, description = "The source id.")),
    responses(
        (status = 200, description = "New selection state", body = ToggleResponse),
        (status = 404, description = "Unknown source", body = ErrorBody)
    )
)]
pub async fn toggle_source_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ToggleResponse>, HttpError> {
    let selected = app_state.studio.toggle_source(id).await?;
    Ok(Json(ToggleResponse { id, selected }))
}

//=========================================================================================
// Tools and Projects
//=========================================================================================

fn parse_tool(kind: &str) -> Result<ArtifactKind, HttpError> {
    ArtifactKind::ALL
        .into_iter()
        .find(|k| k.as_str() == kind)
        .ok_or_else(|| HttpError::bad_request(format!("Unknown tool '{}'", kind)))
}

/// Run one generation tool on the newest ready selected source.
///
/// Returns the created artifact, tagged with its `kind`.
#[utoipa::path(
    post,
    path = "/tools/{kind}",
    params(("kind" = String, Path, description = "infographic, presentation, flashcards or quiz")),
    responses(
        (status = 200, description = "The created artifact"),
        (status = 409, description = "This tool is already running", body = ErrorBody),
        (status = 422, description = "No selected source is ready", body = ErrorBody),
        (status = 502, description = "The generative backend failed", body = ErrorBody)
    )
)]
pub async fn run_tool_handler(
    State(app_state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let kind = parse_tool(&kind)?;
    let artifact = app_state.studio.run_tool(kind).await.map_err(|e| {
        warn!("Tool {} failed: {}", kind, e);
        HttpError::from(e)
    })?;
    Ok(Json(artifact))
}

/// Per-tool activity.
#[utoipa::path(
    get,
    path = "/tools",
    responses((status = 200, description = "Status of every tool", body = Vec<ToolStatusEntry>))
)]
pub async fn list_tools_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let entries: Vec<ToolStatusEntry> = app_state
        .studio
        .tool_statuses()
        .into_iter()
        .map(|(kind, status)| ToolStatusEntry { kind, status })
        .collect();
    Json(entries)
}

/// All generated artifacts, newest first.
#[utoipa::path(
    get,
    path = "/projects",
    responses((status = 200, description = "Project summaries"))
)]
pub async fn list_projects_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(app_state.studio.all_projects().await)
}

/// One generated artifact.
#[utoipa::path(
    get,
    path = "/projects/{id}",
    params(("id" = Uuid, Path, description = "The artifact id.")),
    responses(
        (status = 200, description = "The artifact, tagged with its kind"),
        (status = 404, description = "Unknown artifact", body = ErrorBody)
    )
)]
pub async fn get_project_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let artifact = app_state
        .studio
        .find_project(id)
        .await
        .ok_or(StudioError::NotFound(id))?;
    Ok(Json(artifact))
}

//=========================================================================================
// Chat
//=========================================================================================

/// Submit a chat message and wait for the assistant's reply.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "The appended assistant message"),
        (status = 409, description = "A previous message is still being answered", body = ErrorBody),
        (status = 422, description = "Empty message", body = ErrorBody)
    )
)]
pub async fn submit_chat_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let reply = app_state.studio.submit_chat(&request.text).await?;
    Ok(Json(reply))
}

/// The full chat transcript.
#[utoipa::path(
    get,
    path = "/chat",
    responses((status = 200, description = "Messages in order"))
)]
pub async fn transcript_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(app_state.studio.transcript())
}

//=========================================================================================
// View
//=========================================================================================

/// Open an artifact or a source in the detail view.
#[utoipa::path(
    post,
    path = "/view/open/{id}",
    params(("id" = Uuid, Path, description = "An artifact or source id.")),
    responses(
        (status = 200, description = "The view state"),
        (status = 404, description = "Unknown id", body = ErrorBody)
    )
)]
pub async fn open_view_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(app_state.studio.open(id).await?))
}

/// Close the detail view.
#[utoipa::path(
    post,
    path = "/view/close",
    responses((status = 200, description = "The view state"))
)]
pub async fn close_view_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(app_state.studio.close().await)
}

/// Switch back to the chat surface.
#[utoipa::path(
    post,
    path = "/view/chat",
    responses((status = 200, description = "The view state"))
)]
pub async fn chat_view_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(app_state.studio.select_surface(Surface::Chat).await)
}

/// The current view state.
#[utoipa::path(
    get,
    path = "/view",
    responses((status = 200, description = "The view state"))
)]
pub async fn view_state_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(app_state.studio.view_state().await)
}

//=========================================================================================
// Image Editor
//=========================================================================================

/// Apply a text instruction to an image.
#[utoipa::path(
    post,
    path = "/images/edit",
    request_body = EditImageRequest,
    responses(
        (status = 200, description = "The edited image, or null", body = EditImageResponse),
        (status = 400, description = "The image is not a base64 data URL", body = ErrorBody),
        (status = 422, description = "Empty instruction", body = ErrorBody)
    )
)]
pub async fn edit_image_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<EditImageRequest>,
) -> Result<Json<EditImageResponse>, HttpError> {
    let image = ImageData::from_data_url(&request.image)
        .ok_or_else(|| HttpError::bad_request("image must be a base64 data URL"))?;
    let edited = app_state
        .studio
        .edit_image(&image, &request.instruction)
        .await?;
    Ok(Json(EditImageResponse {
        image: edited.map(|img| img.to_data_url()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_inferred_from_content_type_or_extension() {
        assert_eq!(infer_kind(Some("application/pdf"), "upload"), SourceKind::Pdf);
        assert_eq!(infer_kind(None, "Paper.PDF"), SourceKind::Pdf);
        assert_eq!(infer_kind(Some("text/plain"), "notes.txt"), SourceKind::Text);
        assert_eq!(infer_kind(None, "notes"), SourceKind::Text);
    }

    #[test]
    fn tool_names_are_lowercase_kinds() {
        assert_eq!(parse_tool("quiz").unwrap(), ArtifactKind::Quiz);
        assert_eq!(parse_tool("flashcards").unwrap(), ArtifactKind::Flashcards);
        assert_eq!(parse_tool("Quiz").unwrap_err().status, StatusCode::BAD_REQUEST);
    }
}
