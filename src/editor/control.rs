//! Keeps exactly one capture control on the map.
//!
//! The manager holds an ownership token for the control it installed.
//! Before every install it removes that control, then scans the widget for
//! any other node carrying [`CAPTURE_CONTROL_MARKER`] and removes those as
//! well, so a lost token can never leave a duplicate behind.

use super::state::EditorState;
use super::widget::{ControlId, MapControl, MapWidget, CAPTURE_CONTROL_MARKER};

/// Proof of ownership for an installed control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlToken {
    pub id: ControlId,
    pub state: EditorState,
}

#[derive(Debug, Default)]
pub struct ControlLifecycleManager {
    token: Option<ControlToken>,
}

impl ControlLifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<ControlToken> {
        self.token
    }

    /// Replaces whatever capture control is on the map with one for `state`.
    pub fn attach(&mut self, map: &mut impl MapWidget, state: EditorState) -> ControlToken {
        self.remove_all(map);

        let id = map.add_control(MapControl::for_state(state));
        let token = ControlToken { id, state };
        self.token = Some(token);
        log::debug!("Attached capture control {:?} for {}", id, state.label());
        token
    }

    /// Re-attaches only if the state changed or the control went missing.
    ///
    /// Returns true if a control was (re)installed.
    pub fn sync(&mut self, map: &mut impl MapWidget, state: EditorState) -> bool {
        if let Some(token) = self.token {
            let present = map.control_nodes().iter().any(|n| n.id == token.id);
            if present && token.state == state {
                return false;
            }
        }
        self.attach(map, state);
        true
    }

    /// Removes the capture control.
    pub fn detach(&mut self, map: &mut impl MapWidget) {
        self.remove_all(map);
    }

    fn remove_all(&mut self, map: &mut impl MapWidget) {
        if let Some(token) = self.token.take() {
            map.remove_control(token.id);
        }

        let orphans: Vec<ControlId> = map
            .control_nodes()
            .into_iter()
            .filter(|n| n.marker == CAPTURE_CONTROL_MARKER)
            .map(|n| n.id)
            .collect();
        for id in orphans {
            log::debug!("Removing orphaned capture control {:?}", id);
            map.remove_control(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::EditorCallbacks;
    use crate::editor::polygon_editor::PolygonEditor;
    use crate::editor::widget::testing::RecordingMap;
    use crate::geo::LatLng;

    fn square() -> Vec<LatLng> {
        vec![
            LatLng::new(46.500, 11.300),
            LatLng::new(46.500, 11.310),
            LatLng::new(46.510, 11.310),
            LatLng::new(46.510, 11.300),
        ]
    }

    #[test]
    fn test_single_control_over_cycles() {
        let mut map = RecordingMap::new(14.0);
        let mut editor = PolygonEditor::new(2, EditorCallbacks::new());
        let mut controls = ControlLifecycleManager::new();
        controls.sync(&mut map, editor.state());

        for _ in 0..5 {
            editor.start_drawing(&mut map).unwrap();
            controls.sync(&mut map, editor.state());
            assert_eq!(map.capture_controls().len(), 1);

            let layer = map.draw_layer();
            editor.finish_drawing(&mut map, layer, &square()).unwrap();
            controls.sync(&mut map, editor.state());

            editor.restart(&mut map).unwrap();
            controls.sync(&mut map, editor.state());

            editor.cancel(&mut map).unwrap();
            controls.sync(&mut map, editor.state());
            assert_eq!(map.capture_controls().len(), 1);
        }

        assert_eq!(map.peak_controls, 1);
        assert_eq!(map.capture_controls()[0].state, EditorState::Idle);
    }

    #[test]
    fn test_orphaned_control_is_removed() {
        let mut map = RecordingMap::new(14.0);
        map.add_control(MapControl::for_state(EditorState::Editing));
        map.add_control(MapControl::for_state(EditorState::Idle));

        let mut controls = ControlLifecycleManager::new();
        let token = controls.attach(&mut map, EditorState::Drawing);

        let remaining = map.control_nodes();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, token.id);
    }

    #[test]
    fn test_sync_is_idempotent() {
        let mut map = RecordingMap::new(14.0);
        let mut controls = ControlLifecycleManager::new();
        assert!(controls.sync(&mut map, EditorState::Idle));
        assert!(!controls.sync(&mut map, EditorState::Idle));

        // Control removed behind our back.
        let id = controls.token().unwrap().id;
        map.remove_control(id);
        assert!(controls.sync(&mut map, EditorState::Idle));
        assert_eq!(map.capture_controls().len(), 1);
    }

    #[test]
    fn test_detach_clears_everything() {
        let mut map = RecordingMap::new(14.0);
        let mut controls = ControlLifecycleManager::new();
        controls.attach(&mut map, EditorState::Idle);
        map.add_control(MapControl::for_state(EditorState::Idle));
        controls.detach(&mut map);
        assert!(map.control_nodes().is_empty());
        assert!(controls.token().is_none());
    }
}
