//! Scripted in-memory implementations of every port, shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use studymate_core::domain::{
    CardDraft, FlashcardDraft, PresentationOutline, QuestionDraft, QuizDraft, SlideOutline,
};
use studymate_core::{
    AspectRatio, DocumentAnalysisService, DocumentPayload, ImageData, ImageEditingService,
    ImageGenerationService, KeyConcept, PortError, PortResult, QuestionAnsweringService, Source,
    SourceAnalysis, Studio, StudioServices, StudioSettings, StudyMaterialService,
};

pub fn sample_analysis(title: &str) -> SourceAnalysis {
    SourceAnalysis {
        title: title.to_string(),
        visual_layout_description: format!("A vertical poster about {title} with three panels"),
        summary: format!("{title} explained in short."),
        key_concepts: vec![KeyConcept {
            term: "Term".to_string(),
            definition: "Definition".to_string(),
        }],
    }
}

pub fn outline(titles: &[&str]) -> PresentationOutline {
    PresentationOutline {
        title: "Deck".to_string(),
        topic_overview: "Overview".to_string(),
        slides: titles
            .iter()
            .map(|title| SlideOutline {
                title: title.to_string(),
                content: vec![format!("{title} point one"), format!("{title} point two")],
                detailed_explanation: "Details".to_string(),
                didactic_method: "Socratic questioning".to_string(),
                visual_prompt: "A diagram".to_string(),
                speaker_notes: "Notes".to_string(),
            })
            .collect(),
    }
}

pub fn quiz_draft(questions: usize) -> QuizDraft {
    QuizDraft {
        title: "Quiz".to_string(),
        questions: (0..questions)
            .map(|i| QuestionDraft {
                id: Some(format!("q{i}")),
                question: format!("Question {i}?"),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_answer: i % 4,
                explanation: "A is right because...; the others are wrong because...".to_string(),
            })
            .collect(),
    }
}

pub fn flashcard_draft(cards: usize) -> FlashcardDraft {
    FlashcardDraft {
        title: "Cards".to_string(),
        cards: (0..cards)
            .map(|i| CardDraft {
                id: None,
                front: format!("Term {i}"),
                back: format!("Definition {i}"),
            })
            .collect(),
    }
}

pub fn pdf_bytes() -> Bytes {
    Bytes::from_static(b"%PDF-1.7 dummy")
}

pub fn png() -> ImageData {
    ImageData::new("image/png", vec![0x89, b'P', b'N', b'G'])
}

/// One fake standing in for the whole AI collaborator.
pub struct FakeBackend {
    pub analysis: Mutex<Option<SourceAnalysis>>,
    pub analysis_delay: Mutex<Duration>,
    pub analyze_calls: AtomicUsize,

    pub image_calls: AtomicUsize,
    pub image_prompts: Mutex<Vec<(String, AspectRatio)>>,
    pub images_return_none: AtomicBool,
    /// Image calls whose prompt contains one of these fail.
    pub fail_images_containing: Mutex<Vec<String>>,
    /// Image calls whose prompt contains the key are delayed.
    pub image_delays: Mutex<Vec<(String, Duration)>>,

    pub flashcards: Mutex<Option<FlashcardDraft>>,
    pub quiz: Mutex<Option<QuizDraft>>,
    pub outline: Mutex<Option<PresentationOutline>>,
    pub material_delay: Mutex<Duration>,
    pub material_calls: AtomicUsize,

    pub answer: Mutex<Option<String>>,
    pub qa_calls: AtomicUsize,
    pub qa_source_counts: Mutex<Vec<usize>>,
    pub qa_delay: Mutex<Duration>,

    pub edited: Mutex<Option<ImageData>>,
    pub edit_fails: AtomicBool,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            analysis: Mutex::new(Some(sample_analysis("Photosynthesis"))),
            analysis_delay: Mutex::new(Duration::from_millis(20)),
            analyze_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
            image_prompts: Mutex::new(Vec::new()),
            images_return_none: AtomicBool::new(false),
            fail_images_containing: Mutex::new(Vec::new()),
            image_delays: Mutex::new(Vec::new()),
            flashcards: Mutex::new(Some(flashcard_draft(8))),
            quiz: Mutex::new(Some(quiz_draft(5))),
            outline: Mutex::new(Some(outline(&["Intro", "Body", "Summary"]))),
            material_delay: Mutex::new(Duration::ZERO),
            material_calls: AtomicUsize::new(0),
            answer: Mutex::new(Some("Osmosis is the movement of water.".to_string())),
            qa_calls: AtomicUsize::new(0),
            qa_source_counts: Mutex::new(Vec::new()),
            qa_delay: Mutex::new(Duration::ZERO),
            edited: Mutex::new(Some(png())),
            edit_fails: AtomicBool::new(false),
        })
    }

    pub fn services(self: &Arc<Self>) -> StudioServices {
        StudioServices {
            analyzer: self.clone(),
            images: self.clone(),
            image_editor: self.clone(),
            materials: self.clone(),
            qa: self.clone(),
        }
    }

    pub fn studio(self: &Arc<Self>) -> Studio {
        Studio::new(self.services(), StudioSettings::default())
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }

    pub fn material_calls(&self) -> usize {
        self.material_calls.load(Ordering::SeqCst)
    }

    pub fn qa_calls(&self) -> usize {
        self.qa_calls.load(Ordering::SeqCst)
    }

    /// Total number of capability invocations of any kind.
    pub fn total_calls(&self) -> usize {
        self.analyze_calls() + self.image_calls() + self.material_calls() + self.qa_calls()
    }

    pub fn fail_analysis(&self) {
        *self.analysis.lock().unwrap() = None;
    }

    pub fn fail_images_containing(&self, needle: &str) {
        self.fail_images_containing
            .lock()
            .unwrap()
            .push(needle.to_string());
    }

    pub fn delay_images_containing(&self, needle: &str, delay: Duration) {
        self.image_delays
            .lock()
            .unwrap()
            .push((needle.to_string(), delay));
    }

    async fn material_pause(&self) {
        self.material_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.material_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl DocumentAnalysisService for FakeBackend {
    async fn analyze_document(&self, _document: &DocumentPayload) -> PortResult<SourceAnalysis> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.analysis_delay.lock().unwrap();
        tokio::time::sleep(delay).await;
        self.analysis
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PortError::Malformed("missing title".to_string()))
    }
}

#[async_trait]
impl ImageGenerationService for FakeBackend {
    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> PortResult<Option<ImageData>> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        self.image_prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), aspect_ratio));

        let delay = self
            .image_delays
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, delay)| *delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let fails = self
            .fail_images_containing
            .lock()
            .unwrap()
            .iter()
            .any(|needle| prompt.contains(needle.as_str()));
        if fails {
            return Err(PortError::Unavailable("image backend timed out".to_string()));
        }
        if self.images_return_none.load(Ordering::SeqCst) {
            return Ok(None);
        }
        // Encode the prompt so tests can tell which image belongs to which slide.
        Ok(Some(ImageData::new("image/png", prompt.as_bytes().to_vec())))
    }
}

#[async_trait]
impl ImageEditingService for FakeBackend {
    async fn edit_image(
        &self,
        _image: &ImageData,
        _instruction: &str,
    ) -> PortResult<Option<ImageData>> {
        if self.edit_fails.load(Ordering::SeqCst) {
            return Err(PortError::Unavailable("edit failed".to_string()));
        }
        Ok(self.edited.lock().unwrap().clone())
    }
}

#[async_trait]
impl StudyMaterialService for FakeBackend {
    async fn generate_flashcards(&self, _document: &DocumentPayload) -> PortResult<FlashcardDraft> {
        self.material_pause().await;
        self.flashcards.lock().unwrap().clone().ok_or(PortError::Empty)
    }

    async fn generate_quiz(&self, _document: &DocumentPayload) -> PortResult<QuizDraft> {
        self.material_pause().await;
        self.quiz.lock().unwrap().clone().ok_or(PortError::Empty)
    }

    async fn generate_presentation_outline(
        &self,
        _document: &DocumentPayload,
    ) -> PortResult<PresentationOutline> {
        self.material_pause().await;
        self.outline
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PortError::Malformed("slides missing".to_string()))
    }
}

#[async_trait]
impl QuestionAnsweringService for FakeBackend {
    async fn answer_question(&self, sources: &[Source], _prompt: &str) -> PortResult<String> {
        self.qa_calls.fetch_add(1, Ordering::SeqCst);
        self.qa_source_counts.lock().unwrap().push(sources.len());
        let delay = *self.qa_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.answer
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PortError::Unavailable("quota exceeded".to_string()))
    }
}
