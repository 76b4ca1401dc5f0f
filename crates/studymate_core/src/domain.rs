//! crates/studymate_core/src/domain.rs
//!
//! Defines the core data structures of the studio: uploaded sources, their
//! derived analysis, and the four kinds of generated study artifacts.
//! These structs are independent of any backend or transport.

use base64::Engine;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

//=========================================================================================
// Sources
//=========================================================================================

/// The declared kind of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Pdf,
    Text,
}

impl SourceKind {
    /// The MIME type the document is handed to capabilities with.
    pub fn mime_type(self) -> &'static str {
        match self {
            SourceKind::Pdf => "application/pdf",
            SourceKind::Text => "text/plain",
        }
    }

    /// Only PDF sources get an analysis pass at ingestion time.
    pub fn analyzes_on_ingest(self) -> bool {
        matches!(self, SourceKind::Pdf)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pdf" => Some(SourceKind::Pdf),
            "text" => Some(SourceKind::Text),
            _ => None,
        }
    }
}

/// A document as handed to the AI collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPayload {
    pub mime_type: String,
    pub data: Bytes,
}

impl DocumentPayload {
    pub fn new(kind: SourceKind, data: Bytes) -> Self {
        Self {
            mime_type: kind.mime_type().to_string(),
            data,
        }
    }

    pub fn pdf(data: impl Into<Bytes>) -> Self {
        Self::new(SourceKind::Pdf, data.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(SourceKind::Text, Bytes::from(text.into()))
    }

    /// Base64 form of the payload, as inline document parts are transmitted.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

/// A single (term, definition) pair extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyConcept {
    pub term: String,
    pub definition: String,
}

/// Derived metadata for a source. Produced once and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAnalysis {
    pub title: String,
    /// Natural-language description of the poster layout, used as generation input.
    pub visual_layout_description: String,
    pub summary: String,
    pub key_concepts: Vec<KeyConcept>,
}

/// One uploaded document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: Uuid,
    pub name: String,
    #[serde(skip)]
    pub payload: Option<Bytes>,
    pub kind: SourceKind,
    pub is_analyzing: bool,
    pub analysis: Option<SourceAnalysis>,
    pub created_at: DateTime<Utc>,
}

impl Source {
    /// Creates a freshly ingested source. It is marked as analyzing only when an
    /// analysis attempt is actually going to be made for it.
    pub fn new(name: impl Into<String>, payload: Option<Bytes>, kind: SourceKind) -> Self {
        let is_analyzing = kind.analyzes_on_ingest() && payload.is_some();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            payload,
            kind,
            is_analyzing,
            analysis: None,
            created_at: Utc::now(),
        }
    }

    /// The payload wrapped as a capability input, if the source carries one.
    pub fn document(&self) -> Option<DocumentPayload> {
        self.payload
            .as_ref()
            .map(|data| DocumentPayload::new(self.kind, data.clone()))
    }

    /// The payload as text, for text sources.
    pub fn text(&self) -> Option<String> {
        match self.kind {
            SourceKind::Text => self
                .payload
                .as_ref()
                .map(|data| String::from_utf8_lossy(data).into_owned()),
            SourceKind::Pdf => None,
        }
    }

    /// A source can feed a generation tool once it has a payload and is no longer analyzing.
    pub fn is_ready(&self) -> bool {
        !self.is_analyzing && self.payload.is_some()
    }
}

//=========================================================================================
// Images
//=========================================================================================

/// Aspect ratios the image capability is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AspectRatio {
    /// Posters.
    Portrait3x4,
    /// Slides.
    Widescreen16x9,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Widescreen16x9 => "16:9",
        }
    }
}

/// Image bytes plus their MIME type. Serialized as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: String,
    pub data: Bytes,
}

impl ImageData {
    pub fn new(mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Decodes base64 image data, as returned by image-capable backends.
    pub fn from_base64(mime_type: impl Into<String>, encoded: &str) -> Option<Self> {
        let data = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .ok()?;
        if data.is_empty() {
            return None;
        }
        Some(Self::new(mime_type, data))
    }

    /// Parses a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (header, encoded) = rest.split_once(',')?;
        let mime_type = header.strip_suffix(";base64")?;
        if mime_type.is_empty() {
            return None;
        }
        Self::from_base64(mime_type, encoded)
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

impl Serialize for ImageData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_url())
    }
}

//=========================================================================================
// Capability outputs (before the runner assigns ids and timestamps)
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CardDraft {
    pub id: Option<String>,
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlashcardDraft {
    pub title: String,
    pub cards: Vec<CardDraft>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDraft {
    pub id: Option<String>,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizDraft {
    pub title: String,
    pub questions: Vec<QuestionDraft>,
}

/// One slide as planned by the outline call. Carries no image.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideOutline {
    pub title: String,
    pub content: Vec<String>,
    pub detailed_explanation: String,
    pub didactic_method: String,
    pub visual_prompt: String,
    pub speaker_notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresentationOutline {
    pub title: String,
    pub topic_overview: String,
    pub slides: Vec<SlideOutline>,
}

//=========================================================================================
// Artifacts
//=========================================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Infographic {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "imageUrl")]
    pub image: ImageData,
    pub summary: String,
    pub key_concepts: Vec<KeyConcept>,
    /// The exact instruction the image was generated from.
    pub prompt_used: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub title: String,
    pub content: Vec<String>,
    pub detailed_explanation: String,
    pub didactic_method: String,
    pub visual_prompt: String,
    pub speaker_notes: String,
    /// Absent when the slide's image call failed.
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageData>,
}

impl Slide {
    pub fn from_outline(outline: SlideOutline, image: Option<ImageData>) -> Self {
        Self {
            title: outline.title,
            content: outline.content,
            detailed_explanation: outline.detailed_explanation,
            didactic_method: outline.didactic_method,
            visual_prompt: outline.visual_prompt,
            speaker_notes: outline.speaker_notes,
            image,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub id: Uuid,
    pub title: String,
    pub topic_overview: String,
    pub slides: Vec<Slide>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flashcard {
    pub id: String,
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardSet {
    pub id: Uuid,
    pub title: String,
    pub cards: Vec<Flashcard>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub questions: Vec<QuizQuestion>,
    pub created_at: DateTime<Utc>,
}

/// Discriminant of the four artifact collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Infographic,
    Presentation,
    Flashcards,
    Quiz,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Infographic,
        ArtifactKind::Presentation,
        ArtifactKind::Flashcards,
        ArtifactKind::Quiz,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Infographic => "infographic",
            ArtifactKind::Presentation => "presentation",
            ArtifactKind::Flashcards => "flashcards",
            ArtifactKind::Quiz => "quiz",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any generated study artifact, tagged with its kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Artifact {
    Infographic(Infographic),
    Presentation(Presentation),
    Flashcards(FlashcardSet),
    Quiz(Quiz),
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Infographic(_) => ArtifactKind::Infographic,
            Artifact::Presentation(_) => ArtifactKind::Presentation,
            Artifact::Flashcards(_) => ArtifactKind::Flashcards,
            Artifact::Quiz(_) => ArtifactKind::Quiz,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Artifact::Infographic(a) => a.id,
            Artifact::Presentation(a) => a.id,
            Artifact::Flashcards(a) => a.id,
            Artifact::Quiz(a) => a.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Artifact::Infographic(a) => &a.title,
            Artifact::Presentation(a) => &a.title,
            Artifact::Flashcards(a) => &a.title,
            Artifact::Quiz(a) => &a.title,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Artifact::Infographic(a) => a.created_at,
            Artifact::Presentation(a) => a.created_at,
            Artifact::Flashcards(a) => a.created_at,
            Artifact::Quiz(a) => a.created_at,
        }
    }

    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary::new(self.id(), self.title(), self.kind(), self.created_at())
    }
}

/// A row of the merged "all projects" listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: Uuid,
    pub title: String,
    pub kind: ArtifactKind,
    pub created_at: DateTime<Utc>,
}

impl ProjectSummary {
    pub fn new(id: Uuid, title: &str, kind: ArtifactKind, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.to_string(),
            kind,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratios_match_poster_and_slide_shapes() {
        assert_eq!(AspectRatio::Portrait3x4.as_str(), "3:4");
        assert_eq!(AspectRatio::Widescreen16x9.as_str(), "16:9");
    }

    #[test]
    fn text_sources_never_start_analyzing() {
        let source = Source::new("notes.txt", Some(Bytes::from("hello")), SourceKind::Text);
        assert!(!source.is_analyzing);
        assert!(source.analysis.is_none());
        assert_eq!(source.text().as_deref(), Some("hello"));
    }

    #[test]
    fn pdf_without_payload_is_not_analyzing() {
        let source = Source::new("empty.pdf", None, SourceKind::Pdf);
        assert!(!source.is_analyzing);
        assert!(source.document().is_none());
        assert!(!source.is_ready());
    }

    #[test]
    fn document_carries_kind_mime_type() {
        let source = Source::new("paper.pdf", Some(Bytes::from_static(b"%PDF")), SourceKind::Pdf);
        let document = source.document().unwrap();
        assert_eq!(document.mime_type, "application/pdf");
        assert_eq!(document.data, Bytes::from_static(b"%PDF"));
    }

    #[test]
    fn data_url_is_parsed_back() {
        let image = ImageData::new("image/png", vec![1u8, 2, 3, 4]);
        let url = image.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(ImageData::from_data_url(&url), Some(image));
    }

    #[test]
    fn malformed_data_urls_are_rejected() {
        assert!(ImageData::from_data_url("image/png;base64,AAAA").is_none());
        assert!(ImageData::from_data_url("data:image/png,AAAA").is_none());
        assert!(ImageData::from_data_url("data:image/png;base64,").is_none());
        assert!(ImageData::from_data_url("data:image/png;base64,@@@").is_none());
    }

    #[test]
    fn artifact_serializes_with_kind_tag() {
        let quiz = Artifact::Quiz(Quiz {
            id: Uuid::new_v4(),
            title: "Cells".to_string(),
            questions: vec![],
            created_at: Utc::now(),
        });
        let json = serde_json::to_value(&quiz).unwrap();
        assert_eq!(json["kind"], "quiz");
        assert_eq!(json["title"], "Cells");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn slide_without_image_omits_image_url() {
        let slide = Slide::from_outline(
            SlideOutline {
                title: "Intro".to_string(),
                content: vec!["a".to_string()],
                detailed_explanation: String::new(),
                didactic_method: String::new(),
                visual_prompt: String::new(),
                speaker_notes: String::new(),
            },
            None,
        );
        let json = serde_json::to_value(&slide).unwrap();
        assert!(json.get("imageUrl").is_none());
    }
}
