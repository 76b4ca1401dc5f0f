//! services/api/src/adapters/analysis_llm.rs
//!
//! This module contains the adapter for the document-analysis model.
//! It implements the `DocumentAnalysisService` port from the `core` crate.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use studymate_core::{
    domain::{DocumentPayload, KeyConcept, SourceAnalysis},
    ports::{DocumentAnalysisService, PortError, PortResult},
};

use super::gemini::{GeminiClient, GenerateContentRequest, Part};

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AnalysisRecord {
    title: String,
    visual_prompt: String,
    summary: String,
    #[serde(default)]
    key_concepts: Vec<KeyConceptRecord>,
}

#[derive(Deserialize, Debug)]
struct KeyConceptRecord {
    term: String,
    definition: String,
}

impl AnalysisRecord {
    fn into_domain(self) -> PortResult<SourceAnalysis> {
        if self.title.trim().is_empty() {
            return Err(PortError::Malformed("analysis has no title".to_string()));
        }
        Ok(SourceAnalysis {
            title: self.title,
            visual_layout_description: self.visual_prompt,
            summary: self.summary,
            key_concepts: self
                .key_concepts
                .into_iter()
                .map(|c| KeyConcept {
                    term: c.term,
                    definition: c.definition,
                })
                .collect(),
        })
    }
}

fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "visualPrompt": { "type": "STRING" },
            "summary": { "type": "STRING" },
            "keyConcepts": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "term": { "type": "STRING" },
                        "definition": { "type": "STRING" }
                    },
                    "required": ["term", "definition"]
                }
            }
        },
        "required": ["title", "visualPrompt", "summary", "keyConcepts"]
    })
}

fn analysis_prompt(language: &str) -> String {
    format!(
        "You are the professional study analyst of the StudyMate AI platform. Turn the attached \
         academic material into a clear, visually excellent infographic poster blueprint.\n\
         Write title, summary and key concepts ONLY in {language}.\n\
         \"visualPrompt\" must be a detailed English image generation prompt for an educational poster.\n\
         \"summary\" is a thorough analytical summary of the topic.\n\
         \"keyConcepts\" lists the important terms with their definitions."
    )
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `DocumentAnalysisService` on the generative backend.
#[derive(Clone)]
pub struct GeminiAnalysisAdapter {
    client: GeminiClient,
    model: String,
    language: String,
}

impl GeminiAnalysisAdapter {
    pub fn new(client: GeminiClient, model: String, language: String) -> Self {
        Self {
            client,
            model,
            language,
        }
    }
}

#[async_trait]
impl DocumentAnalysisService for GeminiAnalysisAdapter {
    async fn analyze_document(&self, document: &DocumentPayload) -> PortResult<SourceAnalysis> {
        let request = GenerateContentRequest::new(vec![
            Part::document(document),
            Part::text(analysis_prompt(&self.language)),
        ])
        .with_json_schema(analysis_schema());

        let response = self.client.generate_content(&self.model, &request).await?;
        response.parse_json::<AnalysisRecord>()?.into_domain()
    }
}
