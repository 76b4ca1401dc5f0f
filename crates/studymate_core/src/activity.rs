//! crates/studymate_core/src/activity.rs
//!
//! Per-tool loading and error state for the four artifact kinds.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::domain::ArtifactKind;
use crate::error::{StudioError, StudioResult};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum ToolStatus {
    #[default]
    Idle,
    Generating,
    /// The last run failed; kept until the tool is invoked again.
    Failed(String),
}

#[derive(Debug, Default)]
pub struct ToolActivity {
    statuses: Mutex<HashMap<ArtifactKind, ToolStatus>>,
}

impl ToolActivity {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ArtifactKind, ToolStatus>> {
        self.statuses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Marks `kind` as generating. Fails with `Busy` if it already is.
    pub fn start(self: &Arc<Self>, kind: ArtifactKind) -> StudioResult<ActivityGuard> {
        let mut statuses = self.lock();
        let status = statuses.entry(kind).or_default();
        if *status == ToolStatus::Generating {
            return Err(StudioError::Busy(format!("{kind} generation")));
        }
        *status = ToolStatus::Generating;
        Ok(ActivityGuard {
            activity: Arc::clone(self),
            kind,
            failure: None,
        })
    }

    pub fn status(&self, kind: ArtifactKind) -> ToolStatus {
        self.lock().get(&kind).cloned().unwrap_or_default()
    }

    pub fn snapshot(&self) -> Vec<(ArtifactKind, ToolStatus)> {
        let statuses = self.lock();
        ArtifactKind::ALL
            .iter()
            .map(|kind| (*kind, statuses.get(kind).cloned().unwrap_or_default()))
            .collect()
    }
}

/// Clears the `Generating` flag when dropped, on every exit path. Owns its
/// handle so it can move into a spawned task.
pub struct ActivityGuard {
    activity: Arc<ToolActivity>,
    kind: ArtifactKind,
    failure: Option<String>,
}

impl ActivityGuard {
    /// Records the failure that ends this run.
    pub fn fail(mut self, error: &StudioError) {
        self.failure = Some(error.to_string());
    }
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        let next = match self.failure.take() {
            Some(message) => ToolStatus::Failed(message),
            None => ToolStatus::Idle,
        };
        self.activity.lock().insert(self.kind, next);
    }
}
