//! crates/studymate_core/src/view.rs
//!
//! Which item is open in the detail view, and which top-level surface is shown.

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    #[default]
    Chat,
    Editor,
    Branding,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub focused_id: Option<Uuid>,
    pub modal_open: bool,
    pub surface: Surface,
}

#[derive(Debug, Default)]
pub struct ViewController {
    state: ViewState,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, id: Uuid) {
        self.state.focused_id = Some(id);
        self.state.modal_open = true;
    }

    /// Closes the modal. The last focused id is kept.
    pub fn close(&mut self) {
        self.state.modal_open = false;
    }

    pub fn select_chat(&mut self) {
        self.state.focused_id = None;
        self.state.surface = Surface::Chat;
    }

    pub fn select_surface(&mut self, surface: Surface) {
        if surface == Surface::Chat {
            self.select_chat();
        } else {
            self.state.surface = surface;
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }
}
