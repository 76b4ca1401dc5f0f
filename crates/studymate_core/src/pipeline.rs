//! crates/studymate_core/src/pipeline.rs
//!
//! The generation pipeline runner. Each pipeline turns a document (and, for
//! posters, an optional precomputed analysis) into one finished artifact by
//! calling the AI collaborator one or more times. Nothing is cached: every
//! invocation re-executes fully.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    AspectRatio, CardDraft, DocumentPayload, Flashcard, FlashcardDraft, FlashcardSet, ImageData,
    Infographic, Presentation, PresentationOutline, QuestionDraft, Quiz, QuizDraft, QuizQuestion,
    Slide, SourceAnalysis,
};
use crate::error::{StudioError, StudioResult};
use crate::ports::{DocumentAnalysisService, ImageGenerationService, StudyMaterialService};

/// Builds the poster instruction from an analysis.
pub fn poster_instruction(analysis: &SourceAnalysis) -> String {
    format!(
        "ULTRA-HIGH DETAIL EDUCATIONAL POSTER FOR STUDYMATE: \"{}\". Technical Layout: {}. Professional infographic style. No clutter.",
        analysis.title, analysis.visual_layout_description
    )
}

/// Builds the image instruction for one slide from its title and bullet content.
pub fn slide_instruction(title: &str, content: &[String]) -> String {
    format!(
        "Professional high-quality educational slide about \"{}\".\n\
         Subject matter: {}.\n\
         Style: Minimalist, clean corporate/educational presentation style, 16:9 aspect ratio, \
         vibrant and modern colors, 3D elements, no messy text, clear visual hierarchy.\n\
         The image should look like a complete, standalone presentation slide for a premium EdTech app called StudyMate.",
        title,
        content.join(", ")
    )
}

#[derive(Clone)]
pub struct PipelineRunner {
    analyzer: Arc<dyn DocumentAnalysisService>,
    images: Arc<dyn ImageGenerationService>,
    materials: Arc<dyn StudyMaterialService>,
}

impl PipelineRunner {
    pub fn new(
        analyzer: Arc<dyn DocumentAnalysisService>,
        images: Arc<dyn ImageGenerationService>,
        materials: Arc<dyn StudyMaterialService>,
    ) -> Self {
        Self {
            analyzer,
            images,
            materials,
        }
    }

    //=====================================================================================
    // Infographic
    //=====================================================================================

    /// Produces a poster. A supplied analysis is used as-is; otherwise the document
    /// is analyzed first.
    pub async fn infographic(
        &self,
        document: Option<&DocumentPayload>,
        analysis: Option<&SourceAnalysis>,
    ) -> StudioResult<Infographic> {
        let fresh;
        let analysis = match (analysis, document) {
            (Some(cached), _) => cached,
            (None, Some(document)) => {
                let started = Instant::now();
                fresh = self
                    .analyzer
                    .analyze_document(document)
                    .await
                    .map_err(StudioError::analysis)?;
                info!("⏱️ Poster analysis took: {:?}", started.elapsed());
                &fresh
            }
            (None, None) => {
                return Err(StudioError::AnalysisFailure(
                    "no analysis and no document to analyze".to_string(),
                ))
            }
        };

        let prompt = poster_instruction(analysis);
        let started = Instant::now();
        let image = self
            .images
            .generate_image(&prompt, AspectRatio::Portrait3x4)
            .await
            .map_err(StudioError::generation)?
            .ok_or_else(|| StudioError::generation("image backend returned no image"))?;
        info!("⏱️ Poster image took: {:?}", started.elapsed());

        Ok(Infographic {
            id: Uuid::new_v4(),
            title: analysis.title.clone(),
            image,
            summary: analysis.summary.clone(),
            key_concepts: analysis.key_concepts.clone(),
            prompt_used: prompt,
            created_at: Utc::now(),
        })
    }

    //=====================================================================================
    // Flashcards and quiz
    //=====================================================================================

    pub async fn flashcards(&self, document: &DocumentPayload) -> StudioResult<FlashcardSet> {
        let draft = self
            .materials
            .generate_flashcards(document)
            .await
            .map_err(StudioError::generation)?;
        assemble_flashcards(draft)
    }

    pub async fn quiz(&self, document: &DocumentPayload) -> StudioResult<Quiz> {
        let draft = self
            .materials
            .generate_quiz(document)
            .await
            .map_err(StudioError::generation)?;
        assemble_quiz(draft)
    }

    //=====================================================================================
    // Presentation
    //=====================================================================================

    /// Plans the deck with one outline call, then generates every slide image in
    /// parallel. A failed slide image leaves that slide without an image; only an
    /// outline failure fails the pipeline. Slides keep the outline's order.
    pub async fn presentation(&self, document: &DocumentPayload) -> StudioResult<Presentation> {
        let started = Instant::now();
        let outline = self
            .materials
            .generate_presentation_outline(document)
            .await
            .map_err(StudioError::generation)?;
        validate_outline(&outline)?;
        info!(
            "⏱️ Outline took: {:?}, generating {} slide images in parallel",
            started.elapsed(),
            outline.slides.len()
        );

        let mut image_tasks = Vec::with_capacity(outline.slides.len());
        for slide in &outline.slides {
            let images = self.images.clone();
            let prompt = slide_instruction(&slide.title, &slide.content);
            image_tasks.push(tokio::spawn(async move {
                images
                    .generate_image(&prompt, AspectRatio::Widescreen16x9)
                    .await
            }));
        }

        // Awaited in outline order, so completion order does not matter.
        let mut slide_images: Vec<Option<ImageData>> = Vec::with_capacity(image_tasks.len());
        for (index, task) in image_tasks.into_iter().enumerate() {
            let image = match task.await {
                Ok(Ok(Some(image))) => Some(image),
                Ok(Ok(None)) => {
                    log_partial_failure(index, "no image in response".to_string());
                    None
                }
                Ok(Err(e)) => {
                    log_partial_failure(index, e.to_string());
                    None
                }
                Err(e) => {
                    error!("Task join error for slide {}: {:?}", index + 1, e);
                    log_partial_failure(index, e.to_string());
                    None
                }
            };
            slide_images.push(image);
        }

        let slides = outline
            .slides
            .into_iter()
            .zip(slide_images)
            .map(|(slide, image)| Slide::from_outline(slide, image))
            .collect();

        info!("⏱️ Presentation pipeline took: {:?}", started.elapsed());
        Ok(Presentation {
            id: Uuid::new_v4(),
            title: outline.title,
            topic_overview: outline.topic_overview,
            slides,
            created_at: Utc::now(),
        })
    }
}

fn log_partial_failure(slide_index: usize, reason: String) {
    warn!("{}", StudioError::PartialMediaFailure { slide_index, reason });
}

fn fresh_item_id(id: Option<String>) -> String {
    match id {
        Some(id) if !id.trim().is_empty() => id,
        _ => Uuid::new_v4().to_string(),
    }
}

fn assemble_flashcards(draft: FlashcardDraft) -> StudioResult<FlashcardSet> {
    if draft.cards.is_empty() {
        return Err(StudioError::generation("flashcard set has no cards"));
    }
    let cards = draft
        .cards
        .into_iter()
        .enumerate()
        .map(|(index, CardDraft { id, front, back })| {
            if front.trim().is_empty() || back.trim().is_empty() {
                return Err(StudioError::generation(format!(
                    "flashcard {} has an empty side",
                    index + 1
                )));
            }
            Ok(Flashcard {
                id: fresh_item_id(id),
                front,
                back,
            })
        })
        .collect::<StudioResult<Vec<_>>>()?;

    Ok(FlashcardSet {
        id: Uuid::new_v4(),
        title: draft.title,
        cards,
        created_at: Utc::now(),
    })
}

fn assemble_quiz(draft: QuizDraft) -> StudioResult<Quiz> {
    if draft.questions.is_empty() {
        return Err(StudioError::generation("quiz has no questions"));
    }
    let questions = draft
        .questions
        .into_iter()
        .enumerate()
        .map(|(index, question)| {
            let QuestionDraft {
                id,
                question,
                options,
                correct_answer,
                explanation,
            } = question;
            if options.len() < 2 {
                return Err(StudioError::generation(format!(
                    "question {} has fewer than two options",
                    index + 1
                )));
            }
            if correct_answer >= options.len() {
                return Err(StudioError::generation(format!(
                    "question {} points at option {} of {}",
                    index + 1,
                    correct_answer,
                    options.len()
                )));
            }
            Ok(QuizQuestion {
                id: fresh_item_id(id),
                question,
                options,
                correct_answer,
                explanation,
            })
        })
        .collect::<StudioResult<Vec<_>>>()?;

    Ok(Quiz {
        id: Uuid::new_v4(),
        title: draft.title,
        questions,
        created_at: Utc::now(),
    })
}

fn validate_outline(outline: &PresentationOutline) -> StudioResult<()> {
    if outline.slides.is_empty() {
        return Err(StudioError::generation("presentation outline has no slides"));
    }
    if let Some(position) = outline.slides.iter().position(|s| s.title.trim().is_empty()) {
        return Err(StudioError::generation(format!(
            "slide {} has no title",
            position + 1
        )));
    }
    Ok(())
}
