//! services/api/src/adapters/study_llm.rs
//!
//! This module contains the adapter for structured study materials: flashcards,
//! quizzes and presentation outlines. It implements the `StudyMaterialService`
//! port from the `core` crate.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use studymate_core::{
    domain::{
        CardDraft, DocumentPayload, FlashcardDraft, PresentationOutline, QuestionDraft, QuizDraft,
        SlideOutline,
    },
    ports::{PortResult, StudyMaterialService},
};
use tracing::info;

use super::gemini::{GeminiClient, GenerateContentRequest, Part};

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Deserialize, Debug)]
struct FlashcardRecord {
    title: String,
    #[serde(default)]
    cards: Vec<CardRecord>,
}

#[derive(Deserialize, Debug)]
struct CardRecord {
    id: Option<String>,
    front: String,
    back: String,
}

#[derive(Deserialize, Debug)]
struct QuizRecord {
    title: String,
    #[serde(default)]
    questions: Vec<QuestionRecord>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct QuestionRecord {
    id: Option<String>,
    question: String,
    options: Vec<String>,
    correct_answer: usize,
    #[serde(default)]
    explanation: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct OutlineRecord {
    title: String,
    #[serde(default)]
    topic_overview: String,
    #[serde(default)]
    slides: Vec<SlideRecord>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SlideRecord {
    title: String,
    #[serde(default)]
    content: Vec<String>,
    #[serde(default)]
    detailed_explanation: String,
    #[serde(default)]
    didactic_method: String,
    #[serde(default)]
    visual_prompt: String,
    #[serde(default)]
    speaker_notes: String,
}

impl From<FlashcardRecord> for FlashcardDraft {
    fn from(record: FlashcardRecord) -> Self {
        Self {
            title: record.title,
            cards: record
                .cards
                .into_iter()
                .map(|c| CardDraft {
                    id: c.id.filter(|id| !id.trim().is_empty()),
                    front: c.front,
                    back: c.back,
                })
                .collect(),
        }
    }
}

impl From<QuizRecord> for QuizDraft {
    fn from(record: QuizRecord) -> Self {
        Self {
            title: record.title,
            questions: record
                .questions
                .into_iter()
                .map(|q| QuestionDraft {
                    id: q.id.filter(|id| !id.trim().is_empty()),
                    question: q.question,
                    options: q.options,
                    correct_answer: q.correct_answer,
                    explanation: q.explanation,
                })
                .collect(),
        }
    }
}

impl From<OutlineRecord> for PresentationOutline {
    fn from(record: OutlineRecord) -> Self {
        Self {
            title: record.title,
            topic_overview: record.topic_overview,
            slides: record
                .slides
                .into_iter()
                .map(|s| SlideOutline {
                    title: s.title,
                    content: s.content,
                    detailed_explanation: s.detailed_explanation,
                    didactic_method: s.didactic_method,
                    visual_prompt: s.visual_prompt,
                    speaker_notes: s.speaker_notes,
                })
                .collect(),
        }
    }
}

//=========================================================================================
// Schemas and Prompts
//=========================================================================================

fn flashcard_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "cards": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "front": { "type": "STRING" },
                        "back": { "type": "STRING" }
                    },
                    "required": ["id", "front", "back"]
                }
            }
        },
        "required": ["title", "cards"]
    })
}

fn quiz_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "questions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "question": { "type": "STRING" },
                        "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "correctAnswer": { "type": "INTEGER" },
                        "explanation": { "type": "STRING" }
                    },
                    "required": ["id", "question", "options", "correctAnswer", "explanation"]
                }
            }
        },
        "required": ["title", "questions"]
    })
}

fn outline_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "topicOverview": { "type": "STRING" },
            "slides": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "content": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "detailedExplanation": { "type": "STRING" },
                        "didacticMethod": { "type": "STRING" },
                        "visualPrompt": { "type": "STRING" },
                        "speakerNotes": { "type": "STRING" }
                    },
                    "required": [
                        "title", "content", "detailedExplanation",
                        "didacticMethod", "visualPrompt", "speakerNotes"
                    ]
                }
            }
        },
        "required": ["title", "topicOverview", "slides"]
    })
}

fn flashcard_prompt(language: &str) -> String {
    format!(
        "Create 8-10 study flashcards for StudyMate from this material.\n\
         - \"front\": a term or a question.\n\
         - \"back\": its definition or answer.\n\
         Language: {language}."
    )
}

fn quiz_prompt(language: &str) -> String {
    format!(
        "Create multiple-choice test questions for the StudyMate platform from this material.\n\
         Language: {language}.\n\
         \"correctAnswer\" is the zero-based index of the right option.\n\
         In \"explanation\", analyse why the correct answer is right and the others are wrong."
    )
}

fn outline_prompt(language: &str) -> String {
    format!(
        "You are the head pedagogue of the StudyMate platform. Turn the material into an in-depth, \
         scientifically grounded presentation.\n\
         Language: {language}. \"visualPrompt\" may be written in English."
    )
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `StudyMaterialService` on the generative backend.
/// Outlines go to a separate, stronger model.
#[derive(Clone)]
pub struct GeminiStudyAdapter {
    client: GeminiClient,
    model: String,
    presentation_model: String,
    language: String,
}

impl GeminiStudyAdapter {
    pub fn new(
        client: GeminiClient,
        model: String,
        presentation_model: String,
        language: String,
    ) -> Self {
        Self {
            client,
            model,
            presentation_model,
            language,
        }
    }

    fn request(document: &DocumentPayload, prompt: String, schema: Value) -> GenerateContentRequest {
        GenerateContentRequest::new(vec![Part::document(document), Part::text(prompt)])
            .with_json_schema(schema)
    }
}

#[async_trait]
impl StudyMaterialService for GeminiStudyAdapter {
    async fn generate_flashcards(&self, document: &DocumentPayload) -> PortResult<FlashcardDraft> {
        let request = Self::request(document, flashcard_prompt(&self.language), flashcard_schema());
        let response = self.client.generate_content(&self.model, &request).await?;
        let record: FlashcardRecord = response.parse_json()?;
        info!("Flashcard model returned {} cards", record.cards.len());
        Ok(record.into())
    }

    async fn generate_quiz(&self, document: &DocumentPayload) -> PortResult<QuizDraft> {
        let request = Self::request(document, quiz_prompt(&self.language), quiz_schema());
        let response = self.client.generate_content(&self.model, &request).await?;
        let record: QuizRecord = response.parse_json()?;
        info!("Quiz model returned {} questions", record.questions.len());
        Ok(record.into())
    }

    async fn generate_presentation_outline(
        &self,
        document: &DocumentPayload,
    ) -> PortResult<PresentationOutline> {
        let request = Self::request(document, outline_prompt(&self.language), outline_schema());
        let response = self
            .client
            .generate_content(&self.presentation_model, &request)
            .await?;
        let record: OutlineRecord = response.parse_json()?;
        info!("Outline model planned {} slides", record.slides.len());
        Ok(record.into())
    }
}
