//! Boundary editor states and the transitions between them.

use thiserror::Error;

/// Where the boundary editor is in its capture cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    #[default]
    Idle,
    /// Waiting for the user to finish a freehand shape.
    Drawing,
    /// A shape is staged and its vertices can be dragged.
    Editing,
}

impl EditorState {
    pub fn label(&self) -> &'static str {
        match self {
            EditorState::Idle => "Idle",
            EditorState::Drawing => "Drawing",
            EditorState::Editing => "Editing",
        }
    }

    /// Returns the state `action` leads to, or an error if the action is not
    /// allowed from here.
    pub fn transition(self, action: EditorAction) -> Result<EditorState, EditorError> {
        use EditorAction::*;
        use EditorState::*;

        match (self, action) {
            (Idle, Start) => Ok(Drawing),
            (Drawing, FinishDrawing) => Ok(Editing),
            (Editing, Edit) => Ok(Editing),
            (Editing, Save) => Ok(Idle),
            (Editing, Restart) => Ok(Drawing),
            (Drawing | Editing, Cancel) => Ok(Idle),
            (from, action) => Err(EditorError::InvalidTransition { from, action }),
        }
    }
}

/// Operations a caller can request from the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Start,
    FinishDrawing,
    Edit,
    Save,
    Cancel,
    Restart,
}

/// Errors reported by the boundary editor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("cannot {action:?} while {from:?}")]
    InvalidTransition {
        from: EditorState,
        action: EditorAction,
    },
    #[error("shape has only {distinct} distinct vertices, at least 3 are needed")]
    DegenerateShape { distinct: usize },
}
