// SPDX-License-Identifier: MPL-2.0-only

use crate::registry::WindowId;

/// What a drag source carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPayload {
    /// a window preview, identified by its window
    Window(WindowId),
    /// anything else, e.g. an app launcher or a file
    Other,
}

impl DragPayload {
    pub fn window(&self) -> Option<WindowId> {
        match self {
            Self::Window(w) => Some(*w),
            Self::Other => None,
        }
    }
}

/// Answer of a drop target while a drag hovers it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMotionResult {
    /// the target accepts the drop, stop propagating
    MoveDrop,
    /// not for us, let the parent decide
    Continue,
}
