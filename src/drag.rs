use crate::mutation::{self, Edit};
use crate::Funnel;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Rectangle on the editing canvas (pixels), reported by the renderer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    /// Create a new rectangle
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the right edge of the rectangle
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the bottom edge of the rectangle
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Vertical midpoint; a pointer above it targets the zone before this block
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Check if this rectangle contains a point
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

/// Drop zone index for a pointer at `pointer_y`
///
/// `blocks` are the rendered bounds of the page's components, top to bottom.
/// The result is the number of blocks whose midpoint lies above the pointer,
/// so a pointer below the last block resolves to `blocks.len()` (append).
pub fn resolve_drop_index(pointer_y: f32, blocks: &[Rectangle]) -> usize {
    blocks
        .iter()
        .position(|block| pointer_y < block.center_y())
        .unwrap_or(blocks.len())
}

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSource {
    /// A new block from the palette
    Palette { component_type: String },

    /// An existing block on the current page
    Canvas {
        component_id: String,
        source_index: usize,
    },
}

/// The single authoritative drag state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragSession {
    #[default]
    Idle,
    Dragging {
        source: DragSource,
        /// Candidate drop zone, advisory until the drop
        over_index: Option<usize>,
    },
}

/// Drag-and-drop state machine: `Idle -> Dragging -> Idle`
#[derive(Debug, Clone, Default)]
pub struct DragController {
    session: DragSession,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.session, DragSession::Dragging { .. })
    }

    /// Drop zone currently under the pointer
    pub fn over_index(&self) -> Option<usize> {
        match &self.session {
            DragSession::Dragging { over_index, .. } => *over_index,
            DragSession::Idle => None,
        }
    }

    /// Start a drag; ignored (returns false) while another drag is active
    pub fn start(&mut self, source: DragSource) -> bool {
        if self.is_dragging() {
            debug!(?source, "drag start ignored: a drag is already active");
            return false;
        }
        self.session = DragSession::Dragging {
            source,
            over_index: None,
        };
        true
    }

    pub fn start_from_palette(&mut self, component_type: impl Into<String>) -> bool {
        self.start(DragSource::Palette {
            component_type: component_type.into(),
        })
    }

    pub fn start_from_canvas(&mut self, component_id: impl Into<String>, source_index: usize) -> bool {
        self.start(DragSource::Canvas {
            component_id: component_id.into(),
            source_index,
        })
    }

    /// Record the drop zone under the pointer
    pub fn drag_over(&mut self, index: usize) {
        if let DragSession::Dragging { over_index, .. } = &mut self.session {
            *over_index = Some(index);
        }
    }

    /// Pointer left every drop zone
    pub fn drag_leave(&mut self) {
        if let DragSession::Dragging { over_index, .. } = &mut self.session {
            *over_index = None;
        }
    }

    /// Resolve a pointer position against the rendered page
    ///
    /// Outside `canvas` there is no drop target.
    pub fn drag_pointer(&mut self, x: f32, y: f32, canvas: &Rectangle, blocks: &[Rectangle]) {
        if canvas.contains_point(x, y) {
            self.drag_over(resolve_drop_index(y, blocks));
        } else {
            self.drag_leave();
        }
    }

    /// Drag ended without a drop; returns whether a drag was active
    pub fn cancel(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.session = DragSession::Idle;
        was_dragging
    }

    /// Commit the drag against the current page and return to idle
    ///
    /// A drop with no target, or of a canvas block that is no longer on the
    /// page, is a cancellation.
    pub fn drop(&mut self, funnel: &Funnel, page_index: usize) -> Edit {
        let session = std::mem::take(&mut self.session);

        let DragSession::Dragging {
            source,
            over_index: Some(index),
        } = session
        else {
            debug!("drop without target treated as cancel");
            return Edit::unchanged(funnel);
        };

        match source {
            DragSource::Palette { component_type } => {
                mutation::add_component(funnel, page_index, &component_type, index)
            }
            DragSource::Canvas {
                component_id,
                source_index,
            } => {
                // The recorded index is trusted only while it still holds the
                // dragged id; otherwise look the component up again.
                let current = funnel.page(page_index).and_then(|page| {
                    page.components
                        .get(source_index)
                        .filter(|component| component.id == component_id)
                        .map(|_| source_index)
                        .or_else(|| page.component_index(&component_id))
                });
                let Some(current) = current else {
                    debug!(%component_id, "dragged component is gone; drop cancelled");
                    return Edit::unchanged(funnel);
                };
                if current != source_index {
                    debug!(
                        %component_id,
                        source_index,
                        current,
                        "drag source moved; using its current index"
                    );
                }
                mutation::move_component(funnel, page_index, current, index)
            }
        }
    }
}
