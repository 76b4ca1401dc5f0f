//! crates/studymate_core/src/projects.rs
//!
//! The project store: four append-only artifact collections, newest first.

use uuid::Uuid;

use crate::domain::{
    Artifact, ArtifactKind, FlashcardSet, Infographic, Presentation, ProjectSummary, Quiz,
};

#[derive(Debug, Clone, Default)]
pub struct ProjectStore {
    infographics: Vec<Infographic>,
    presentations: Vec<Presentation>,
    flashcards: Vec<FlashcardSet>,
    quizzes: Vec<Quiz>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts the artifact at the front of its collection and returns its id.
    pub fn append(&mut self, artifact: Artifact) -> Uuid {
        let id = artifact.id();
        match artifact {
            Artifact::Infographic(item) => self.infographics.insert(0, item),
            Artifact::Presentation(item) => self.presentations.insert(0, item),
            Artifact::Flashcards(item) => self.flashcards.insert(0, item),
            Artifact::Quiz(item) => self.quizzes.insert(0, item),
        }
        id
    }

    pub fn infographics(&self) -> &[Infographic] {
        &self.infographics
    }

    pub fn presentations(&self) -> &[Presentation] {
        &self.presentations
    }

    pub fn flashcards(&self) -> &[FlashcardSet] {
        &self.flashcards
    }

    pub fn quizzes(&self) -> &[Quiz] {
        &self.quizzes
    }

    pub fn len(&self) -> usize {
        self.infographics.len() + self.presentations.len() + self.flashcards.len() + self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, kind: ArtifactKind) -> usize {
        match kind {
            ArtifactKind::Infographic => self.infographics.len(),
            ArtifactKind::Presentation => self.presentations.len(),
            ArtifactKind::Flashcards => self.flashcards.len(),
            ArtifactKind::Quiz => self.quizzes.len(),
        }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.infographics.iter().any(|a| a.id == id)
            || self.presentations.iter().any(|a| a.id == id)
            || self.flashcards.iter().any(|a| a.id == id)
            || self.quizzes.iter().any(|a| a.id == id)
    }

    /// Looks an artifact up in whichever collection holds it.
    pub fn find(&self, id: Uuid) -> Option<Artifact> {
        if let Some(item) = self.infographics.iter().find(|a| a.id == id) {
            return Some(Artifact::Infographic(item.clone()));
        }
        if let Some(item) = self.presentations.iter().find(|a| a.id == id) {
            return Some(Artifact::Presentation(item.clone()));
        }
        if let Some(item) = self.flashcards.iter().find(|a| a.id == id) {
            return Some(Artifact::Flashcards(item.clone()));
        }
        self.quizzes
            .iter()
            .find(|a| a.id == id)
            .map(|item| Artifact::Quiz(item.clone()))
    }

    /// Merged listing of every artifact, newest first. Computed on each call.
    pub fn all_projects(&self) -> Vec<ProjectSummary> {
        let infographics = self.infographics.iter().map(|a| {
            ProjectSummary::new(a.id, &a.title, ArtifactKind::Infographic, a.created_at)
        });
        let presentations = self.presentations.iter().map(|a| {
            ProjectSummary::new(a.id, &a.title, ArtifactKind::Presentation, a.created_at)
        });
        let flashcards = self.flashcards.iter().map(|a| {
            ProjectSummary::new(a.id, &a.title, ArtifactKind::Flashcards, a.created_at)
        });
        let quizzes = self
            .quizzes
            .iter()
            .map(|a| ProjectSummary::new(a.id, &a.title, ArtifactKind::Quiz, a.created_at));

        let mut all: Vec<ProjectSummary> = infographics
            .chain(presentations)
            .chain(flashcards)
            .chain(quizzes)
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }
}
