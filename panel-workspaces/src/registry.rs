// SPDX-License-Identifier: MPL-2.0-only

//! The window manager model mirrored by the indicator.
//!
//! The registry is owned by the host. The indicator only queries it, sends it
//! commands, and receives [`Notification`]s for the [`Topic`]s it subscribed
//! to through the event loop.

use std::{fmt, rc::Rc};

/// Handle of a window owned by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

/// Handle of a workspace owned by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkspaceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Snapshot of the window properties the indicator cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub id: WindowId,
    pub workspace: Option<WorkspaceId>,
    pub monitor: usize,
    /// window asked not to be shown in task lists
    pub skip_taskbar: bool,
    pub mapped: bool,
    pub wm_class: Option<String>,
}

/// Class of notifications a subscription receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    WindowAdded(WorkspaceId),
    WindowRemoved(WorkspaceId),
    WindowCreated,
    Restacked,
    ActiveWorkspaceChanged,
    WorkspaceCountChanged,
    WorkspaceLayoutChanged,
    WindowClassChanged(WindowId),
    WindowMappedChanged(WindowId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    WindowAdded {
        workspace: WorkspaceId,
        window: WindowId,
    },
    WindowRemoved {
        workspace: WorkspaceId,
        window: WindowId,
    },
    WindowCreated(WindowId),
    Restacked,
    ActiveWorkspaceChanged,
    WorkspaceCountChanged,
    WorkspaceLayoutChanged,
    WindowClassChanged(WindowId),
    WindowMappedChanged(WindowId),
}

impl RegistryEvent {
    pub fn topic(&self) -> Topic {
        match self {
            Self::WindowAdded { workspace, .. } => Topic::WindowAdded(*workspace),
            Self::WindowRemoved { workspace, .. } => Topic::WindowRemoved(*workspace),
            Self::WindowCreated(_) => Topic::WindowCreated,
            Self::Restacked => Topic::Restacked,
            Self::ActiveWorkspaceChanged => Topic::ActiveWorkspaceChanged,
            Self::WorkspaceCountChanged => Topic::WorkspaceCountChanged,
            Self::WorkspaceLayoutChanged => Topic::WorkspaceLayoutChanged,
            Self::WindowClassChanged(w) => Topic::WindowClassChanged(*w),
            Self::WindowMappedChanged(w) => Topic::WindowMappedChanged(*w),
        }
    }
}

/// An event delivered on behalf of one subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subscription: SubscriptionId,
    pub event: RegistryEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Grid the window manager arranges workspaces in. `-1` means "as many as needed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceLayout {
    pub starting_corner: DisplayCorner,
    pub vertical: bool,
    pub rows: i32,
    pub columns: i32,
}

impl WorkspaceLayout {
    /// all workspaces side by side in one row
    pub fn single_row() -> Self {
        Self {
            starting_corner: DisplayCorner::TopLeft,
            vertical: false,
            rows: 1,
            columns: -1,
        }
    }
}

/// Live model of workspaces and windows.
///
/// For every live subscription the registry delivers a [`Notification`] into
/// the event loop whenever an event of the subscribed [`Topic`] happens.
/// Notifications are delivered asynchronously, never from inside a call on
/// this trait.
pub trait WindowRegistry: fmt::Debug {
    fn subscribe(&self, topic: Topic) -> SubscriptionId;
    /// Unsubscribing an unknown or already removed id is a no-op.
    fn unsubscribe(&self, id: SubscriptionId);

    fn n_workspaces(&self) -> usize;
    fn active_workspace_index(&self) -> usize;
    fn workspace_by_index(&self, index: usize) -> Option<WorkspaceId>;
    fn list_windows(&self, workspace: WorkspaceId) -> Vec<WindowId>;
    fn window(&self, window: WindowId) -> Option<WindowInfo>;
    /// all windows, bottom to top
    fn stacking_order(&self) -> Vec<WindowId>;
    fn layout_rows(&self) -> i32;
    /// icon of the application owning the window
    fn app_icon(&self, window: WindowId) -> Option<String>;
    /// icon set on the window itself
    fn window_icon(&self, window: WindowId) -> Option<String>;
    fn current_time(&self) -> u32;

    fn activate_workspace(&self, index: usize, timestamp: u32);
    fn activate_window(&self, window: WindowId, timestamp: u32);
    fn change_window_workspace(&self, window: WindowId, index: usize);
    fn move_window_to_monitor(&self, window: WindowId, monitor: usize);
    fn override_workspace_layout(&self, layout: WorkspaceLayout);
}

pub type SharedRegistry = Rc<dyn WindowRegistry>;

/// A registry subscription that is disposed when dropped.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    topic: Topic,
    registry: SharedRegistry,
    disposed: bool,
}

impl Subscription {
    pub fn new(registry: &SharedRegistry, topic: Topic) -> Self {
        Self {
            id: registry.subscribe(topic),
            topic,
            registry: registry.clone(),
            disposed: false,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn is_live(&self) -> bool {
        !self.disposed
    }

    pub fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.registry.unsubscribe(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}
