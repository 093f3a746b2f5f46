//! Habitat boundary capture: editor state machine, on-map control
//! lifecycle, and the widget interface both act on.

pub mod control;
pub mod polygon_editor;
pub mod state;
pub mod widget;

pub use control::{ControlLifecycleManager, ControlToken};
pub use polygon_editor::PolygonEditor;
pub use state::{EditorAction, EditorError, EditorState};
pub use widget::{
    ControlAction, ControlButton, ControlId, ControlNode, LayerId, MapControl, MapWidget,
    CAPTURE_CONTROL_MARKER,
};
