//! services/api/src/adapters/qa_llm.rs
//!
//! This module contains the adapters for the question-answering model used by the
//! chat. Both implement the `QuestionAnsweringService` port from the `core` crate:
//! the default one sends the documents themselves to the generative backend, the
//! OpenAI one works from text only.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use studymate_core::{
    domain::{Source, SourceKind},
    ports::{PortError, PortResult, QuestionAnsweringService},
};
use tracing::{debug, info};

use super::gemini::{GeminiClient, GenerateContentRequest, Part};

fn system_instructions(language: &str) -> String {
    format!(
        "You are the StudyMate AI assistant. Answer ONLY from the provided sources, in {language}. \
         Keep the answer academic and easy to understand. If the sources do not cover the \
         question, say so."
    )
}

//=========================================================================================
// Generative Backend Adapter
//=========================================================================================

/// Answers with the source documents attached inline.
#[derive(Clone)]
pub struct GeminiQaAdapter {
    client: GeminiClient,
    model: String,
    language: String,
}

impl GeminiQaAdapter {
    pub fn new(client: GeminiClient, model: String, language: String) -> Self {
        Self {
            client,
            model,
            language,
        }
    }
}

/// One part per source in order, followed by the prompt.
fn source_parts(sources: &[Source], prompt: &str) -> Vec<Part> {
    let mut parts: Vec<Part> = sources
        .iter()
        .filter_map(|source| match source.kind {
            SourceKind::Text => source.text().map(Part::text),
            SourceKind::Pdf => source.document().map(|doc| Part::document(&doc)),
        })
        .collect();
    parts.push(Part::text(prompt));
    parts
}

#[async_trait]
impl QuestionAnsweringService for GeminiQaAdapter {
    async fn answer_question(&self, sources: &[Source], prompt: &str) -> PortResult<String> {
        debug!("Answering over {} sources", sources.len());
        let request = GenerateContentRequest::new(source_parts(sources, prompt))
            .with_system_instruction(system_instructions(&self.language));

        let response = self.client.generate_content(&self.model, &request).await?;
        response.text().ok_or(PortError::Empty)
    }
}

//=========================================================================================
// OpenAI Adapter
//=========================================================================================

/// An adapter that implements `QuestionAnsweringService` using an OpenAI-compatible LLM.
/// Text sources are sent verbatim, PDF sources through their analysis summary.
#[derive(Clone)]
pub struct OpenAiQaAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    language: String,
}

impl OpenAiQaAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String, language: String) -> Self {
        Self {
            client,
            model,
            language,
        }
    }
}

fn text_context(sources: &[Source]) -> String {
    sources
        .iter()
        .filter_map(|source| {
            let body = match source.kind {
                SourceKind::Text => source.text(),
                SourceKind::Pdf => source
                    .analysis
                    .as_ref()
                    .map(|a| format!("{}\n{}", a.title, a.summary)),
            }?;
            Some(format!("SOURCE: {}\n---\n{}\n---", source.name, body))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl QuestionAnsweringService for OpenAiQaAdapter {
    async fn answer_question(&self, sources: &[Source], prompt: &str) -> PortResult<String> {
        let context = text_context(sources);
        if context.is_empty() {
            return Err(PortError::Unexpected(
                "None of the sources has text the model can read yet.".to_string(),
            ));
        }

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_instructions(&self.language))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!("{}\n\nQUESTION:\n{}", context, prompt))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unavailable(e.to_string()))?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(PortError::Empty)?;
        info!("QA model answered with {} chars", answer.len());
        Ok(answer)
    }
}
