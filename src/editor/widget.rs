//! The map widget seam.
//!
//! The map surface is owned elsewhere (the canvas in the application, or a
//! recording double in tests) and mutated imperatively through
//! [`MapWidget`]. The editor and the control manager only ever hold a
//! borrowed handle for the duration of one event.

use super::state::EditorState;

/// Identifier of a drawn layer on the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

/// Identifier of a control node on the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub u64);

/// Structural marker carried by every capture control node.
pub const CAPTURE_CONTROL_MARKER: &str = "habitat-capture-control";

/// Actions a control button can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    StartCapture,
    Save,
    Restart,
    Cancel,
}

impl ControlAction {
    pub fn label(&self) -> &'static str {
        match self {
            ControlAction::StartCapture => "Start capture",
            ControlAction::Save => "Save",
            ControlAction::Restart => "Restart",
            ControlAction::Cancel => "Cancel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlButton {
    pub action: ControlAction,
    pub enabled: bool,
}

/// An on-map control: a small panel of buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapControl {
    pub marker: &'static str,
    pub state: EditorState,
    pub buttons: Vec<ControlButton>,
}

impl MapControl {
    /// The capture control for an editor state.
    ///
    /// While drawing, the edit actions are shown but disabled.
    pub fn for_state(state: EditorState) -> Self {
        let edit_actions = |enabled| {
            [ControlAction::Save, ControlAction::Restart, ControlAction::Cancel]
                .into_iter()
                .map(|action| ControlButton { action, enabled })
                .collect()
        };

        let buttons = match state {
            EditorState::Idle => vec![ControlButton {
                action: ControlAction::StartCapture,
                enabled: true,
            }],
            EditorState::Drawing => edit_actions(false),
            EditorState::Editing => edit_actions(true),
        };

        Self {
            marker: CAPTURE_CONTROL_MARKER,
            state,
            buttons,
        }
    }

    pub fn enabled_actions(&self) -> Vec<ControlAction> {
        self.buttons
            .iter()
            .filter(|b| b.enabled)
            .map(|b| b.action)
            .collect()
    }
}

/// What a structural scan of the control region sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlNode {
    pub id: ControlId,
    pub marker: String,
}

/// Imperative map surface the editor and control manager act on.
pub trait MapWidget {
    fn zoom(&self) -> f64;

    fn set_zoom(&mut self, zoom: f64);

    /// Enters freehand drawing. The widget reports the finished shape as a
    /// new layer through its own event stream.
    fn begin_freehand(&mut self);

    fn end_freehand(&mut self);

    /// Removes a drawn layer. Returns false if it was already gone.
    fn remove_layer(&mut self, layer: LayerId) -> bool;

    /// Shows or hides draggable vertex handles on a layer.
    fn set_vertex_editing(&mut self, layer: LayerId, enabled: bool);

    fn add_control(&mut self, control: MapControl) -> ControlId;

    /// Removes a control node. Returns false if it was already gone.
    fn remove_control(&mut self, id: ControlId) -> bool;

    /// All control nodes currently attached, in attachment order.
    fn control_nodes(&self) -> Vec<ControlNode>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons_follow_state() {
        assert_eq!(
            MapControl::for_state(EditorState::Idle).enabled_actions(),
            vec![ControlAction::StartCapture]
        );
        let drawing = MapControl::for_state(EditorState::Drawing);
        assert!(drawing.enabled_actions().is_empty());
        assert_eq!(drawing.buttons.len(), 3);
        assert_eq!(
            MapControl::for_state(EditorState::Editing).enabled_actions(),
            vec![
                ControlAction::Save,
                ControlAction::Restart,
                ControlAction::Cancel
            ]
        );
    }
}
