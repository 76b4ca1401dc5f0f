//! crates/studymate_core/src/chat.rs
//!
//! The conversational query router: keeps the chat transcript, decides for each
//! user message whether it asks for a poster or is a question about the active
//! sources, and allows only one pending submission at a time.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::Source;
use crate::error::{StudioError, StudioResult};

pub const WELCOME_MESSAGE: &str = "Welcome to StudyMate! I am your personal AI tutor. I can create posters from your sources, answer your questions, or prepare study materials. What shall we work on today?";
pub const STILL_ANALYZING_MESSAGE: &str =
    "The document is still being analyzed. Please wait a moment.";
pub const NEED_SOURCES_MESSAGE: &str =
    "No source found. Upload a PDF in the left panel and select it first.";
pub const INFOGRAPHIC_READY_MESSAGE: &str = "Great! StudyMate prepared a new infographic for your request. You can find it in the projects list.";
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Generation-intent vocabulary used when none is configured.
pub const DEFAULT_TRIGGER_KEYWORDS: [&str; 4] = ["poster", "infografika", "yarat", "chiz"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    /// An assistant reply announcing a created artifact.
    Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: String,
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: ChatRole, text: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            kind,
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ChatRole::User, text, MessageKind::Text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, text, MessageKind::Text)
    }

    pub fn action(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, text, MessageKind::Action)
    }
}

/// Case-insensitive substring matching against a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct IntentMatcher {
    keywords: Vec<String>,
}

impl IntentMatcher {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_generation_request(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.keywords.iter().any(|k| message.contains(k.as_str()))
    }
}

impl Default for IntentMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_KEYWORDS)
    }
}

/// What a user message should lead to.
#[derive(Debug, Clone)]
pub enum Route {
    /// The newest active source is still being analyzed; nothing is generated.
    StillAnalyzing(Source),
    /// Run the poster pipeline on the newest active source.
    GenerateInfographic(Source),
    /// No active sources; ask the user to add one.
    NeedSources,
    /// Answer the message from all active sources.
    Answer(Vec<Source>),
}

/// Classifies a message given the active sources, in ingestion order.
pub fn route(matcher: &IntentMatcher, message: &str, mut active: Vec<Source>) -> Route {
    if matcher.is_generation_request(message) {
        if let Some(latest) = active.pop() {
            return if latest.is_analyzing {
                Route::StillAnalyzing(latest)
            } else {
                Route::GenerateInfographic(latest)
            };
        }
    }
    if active.is_empty() {
        Route::NeedSources
    } else {
        Route::Answer(active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatPhase {
    Idle,
    Routing,
}

struct ChatState {
    phase: ChatPhase,
    transcript: Vec<ChatMessage>,
}

pub struct ChatRouter {
    matcher: IntentMatcher,
    state: Mutex<ChatState>,
}

impl ChatRouter {
    pub fn new(matcher: IntentMatcher) -> Self {
        Self {
            matcher,
            state: Mutex::new(ChatState {
                phase: ChatPhase::Idle,
                transcript: vec![ChatMessage::assistant(WELCOME_MESSAGE)],
            }),
        }
    }

    pub fn matcher(&self) -> &IntentMatcher {
        &self.matcher
    }

    fn lock(&self) -> MutexGuard<'_, ChatState> {
        // The transcript is only ever pushed to, so a poisoned lock still holds valid data.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Starts a turn: appends the user's message and moves to `Routing`.
    /// Blank messages and submissions while a turn is pending append nothing.
    pub fn begin(self: &Arc<Self>, text: &str) -> StudioResult<PendingTurn> {
        if text.trim().is_empty() {
            return Err(StudioError::PreconditionUnmet(
                "message is empty".to_string(),
            ));
        }
        let mut state = self.lock();
        if state.phase == ChatPhase::Routing {
            return Err(StudioError::Busy("chat".to_string()));
        }
        state.phase = ChatPhase::Routing;
        state.transcript.push(ChatMessage::user(text));
        Ok(PendingTurn {
            router: Arc::clone(self),
            text: text.to_string(),
        })
    }

    pub fn phase(&self) -> ChatPhase {
        self.lock().phase
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.lock().transcript.clone()
    }
}

/// A submission in flight. Dropping it returns the router to `Idle`, whichever
/// way the turn ended.
pub struct PendingTurn {
    router: Arc<ChatRouter>,
    text: String,
}

impl PendingTurn {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Appends the single reply of this turn.
    pub fn finish(self, reply: ChatMessage) -> ChatMessage {
        self.router.lock().transcript.push(reply.clone());
        reply
    }
}

impl Drop for PendingTurn {
    fn drop(&mut self) {
        self.router.lock().phase = ChatPhase::Idle;
    }
}
