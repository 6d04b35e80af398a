// SPDX-License-Identifier: MPL-2.0-only

//! Thumbnail of one workspace: the previews of the windows on it.
//!
//! Previews are not created the moment a window shows up. Window managers
//! report a new window through both the workspace's "window added" signal and
//! the global "window created" signal, and windows moving between workspaces
//! produce quick remove/add bursts. Every add schedules a [`PendingCreation`]
//! that is replaced by later adds and cancelled by removes; only a settled
//! window gets a [`PreviewEntry`].

use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use itertools::Itertools;
use panel_workspaces_config::IndicatorConfig;
use tracing::{debug, error, trace};

use crate::{
    dnd::{DragMotionResult, DragPayload},
    preview::PreviewEntry,
    registry::{
        Notification, RegistryEvent, SharedRegistry, Subscription, Topic, WindowId, WindowInfo,
        WorkspaceId,
    },
    shared_state::GlobalState,
    timer::{TimerToken, Timers},
};

/// Identity of a container, never reused by the indicator that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub u64);

/// Preview options shared by every container of an indicator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSettings {
    pub debounce: Duration,
    pub icon_size: u32,
    pub fallback_icon: String,
}

impl From<&IndicatorConfig> for PreviewSettings {
    fn from(config: &IndicatorConfig) -> Self {
        Self {
            debounce: config.preview_debounce(),
            icon_size: config.preview_icon_size,
            fallback_icon: config.fallback_icon.clone(),
        }
    }
}

/// A preview waiting for its window to settle
#[derive(Debug)]
struct PendingCreation {
    token: TimerToken,
    serial: u64,
}

#[derive(Debug)]
pub struct ThumbnailContainer {
    id: ContainerId,
    index: usize,
    workspace: WorkspaceId,
    registry: SharedRegistry,
    timers: Timers<GlobalState>,
    settings: PreviewSettings,
    previews: HashMap<WindowId, PreviewEntry>,
    pending: HashMap<WindowId, PendingCreation>,
    next_serial: u64,
    /// visual order of the previews
    children: Vec<WindowId>,
    stacking_hint: Vec<WindowId>,
    subscriptions: Vec<Subscription>,
    /// monitor of the display surface the container is attached to
    monitor: Option<usize>,
    active: bool,
    destroyed: bool,
}

impl ThumbnailContainer {
    /// Create the thumbnail of the workspace at `index`.
    ///
    /// Returns `None` if the registry has no workspace at that index.
    pub fn new(
        id: ContainerId,
        index: usize,
        registry: &SharedRegistry,
        timers: Timers<GlobalState>,
        settings: PreviewSettings,
        monitor: Option<usize>,
    ) -> Option<Self> {
        let workspace = registry.workspace_by_index(index)?;
        let subscriptions = vec![
            Subscription::new(registry, Topic::WindowAdded(workspace)),
            Subscription::new(registry, Topic::WindowRemoved(workspace)),
            Subscription::new(registry, Topic::Restacked),
            Subscription::new(registry, Topic::WindowCreated),
        ];
        let mut container = Self {
            id,
            index,
            workspace,
            registry: registry.clone(),
            timers,
            settings,
            previews: HashMap::new(),
            pending: HashMap::new(),
            next_serial: 0,
            children: Vec::new(),
            stacking_hint: Vec::new(),
            subscriptions,
            monitor,
            active: false,
            destroyed: false,
        };
        debug!(
            "Created thumbnail {:?} for workspace {} ({:?})",
            container.id, index, workspace
        );

        for window in container.registry.list_windows(workspace) {
            container.add_window(window);
        }
        container.on_restacked();
        Some(container)
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn workspace(&self) -> WorkspaceId {
        self.workspace
    }

    pub fn monitor(&self) -> Option<usize> {
        self.monitor
    }

    /// Alive and attached to a display surface.
    pub fn is_alive(&self) -> bool {
        !self.destroyed && self.monitor.is_some()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn attach(&mut self, monitor: usize) {
        if !self.destroyed {
            self.monitor = Some(monitor);
        }
    }

    /// The display surface went away. Pending creations will drop their work.
    pub fn detach(&mut self) {
        self.monitor = None;
    }

    pub fn preview(&self, window: WindowId) -> Option<&PreviewEntry> {
        self.previews.get(&window)
    }

    pub fn has_preview(&self, window: WindowId) -> bool {
        self.previews.contains_key(&window)
    }

    pub fn is_pending(&self, window: WindowId) -> bool {
        self.pending.contains_key(&window)
    }

    pub fn preview_count(&self) -> usize {
        self.previews.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// previews in visual order
    pub fn children(&self) -> &[WindowId] {
        &self.children
    }

    pub fn stacking_hint(&self) -> &[WindowId] {
        &self.stacking_hint
    }

    /// live subscriptions of the container and its previews
    pub fn live_subscriptions(&self) -> usize {
        self.subscriptions.iter().filter(|s| s.is_live()).count()
            + self
                .previews
                .values()
                .map(PreviewEntry::live_subscriptions)
                .sum::<usize>()
    }

    /// Route a notification to this container.
    ///
    /// Returns whether one of its subscriptions, or one of its previews',
    /// owned the notification.
    pub fn handle_notification(&mut self, notification: &Notification) -> bool {
        if self.destroyed {
            return false;
        }

        if self
            .subscriptions
            .iter()
            .any(|s| s.id() == notification.subscription)
        {
            match &notification.event {
                RegistryEvent::WindowAdded { window, .. } => self.add_window(*window),
                RegistryEvent::WindowRemoved { window, .. } => self.remove_window(*window),
                RegistryEvent::WindowCreated(window) => {
                    let on_workspace = self
                        .registry
                        .window(*window)
                        .is_some_and(|info| info.workspace == Some(self.workspace));
                    if on_workspace {
                        self.add_window(*window);
                    }
                }
                RegistryEvent::Restacked => self.on_restacked(),
                event => trace!("Thumbnail {:?} ignores {:?}", self.id, event),
            }
            return true;
        }

        match self
            .previews
            .values_mut()
            .find(|p| p.owns(notification.subscription))
        {
            Some(preview) => {
                preview.handle_notification(notification.subscription);
                true
            }
            None => false,
        }
    }

    /// A window is now on this workspace.
    pub fn add_window(&mut self, window: WindowId) {
        if self.destroyed || self.previews.contains_key(&window) {
            return;
        }

        match self.registry.window(window) {
            Some(info) if !info.skip_taskbar => {}
            _ => return,
        }

        if let Some(pending) = self.pending.remove(&window) {
            trace!("Debouncing preview creation for {:?}", window);
            self.timers.cancel(pending.token);
        }

        self.next_serial += 1;
        let serial = self.next_serial;
        let container = self.id;
        match self
            .timers
            .schedule(self.settings.debounce, move |state: &mut GlobalState| {
                state.preview_settled(container, window, serial)
            }) {
            Ok(token) => {
                self.pending
                    .insert(window, PendingCreation { token, serial });
            }
            Err(err) => error!("Failed to schedule preview for {:?}: {}", window, err),
        }
    }

    /// The debounce period of `window` ran out.
    pub(crate) fn settle(&mut self, window: WindowId, serial: u64) {
        match self.pending.get(&window) {
            Some(pending) if pending.serial == serial => {
                self.pending.remove(&window);
            }
            _ => {
                debug!("Dropping superseded preview creation for {:?}", window);
                return;
            }
        }

        if !self.is_alive() {
            debug!(
                "Thumbnail {:?} is gone, dropping preview for {:?}",
                self.id, window
            );
            return;
        }
        if self.previews.contains_key(&window) {
            return;
        }
        let still_here = self
            .registry
            .window(window)
            .is_some_and(|info| info.workspace == Some(self.workspace));
        if !still_here {
            debug!("{:?} left workspace {} before settling", window, self.index);
            return;
        }

        let mut preview = PreviewEntry::new(
            window,
            &self.registry,
            self.settings.icon_size,
            &self.settings.fallback_icon,
        );
        let registry = self.registry.clone();
        let index = self.index;
        preview.connect_clicked(move || {
            let time = registry.current_time();
            registry.activate_workspace(index, time);
            registry.activate_window(window, time);
        });
        self.previews.insert(window, preview);
        self.children.push(window);
        self.stacking_hint.push(window);
        debug!("Added preview of {:?} to workspace {}", window, self.index);
    }

    /// A window left this workspace or was closed.
    pub fn remove_window(&mut self, window: WindowId) {
        if let Some(pending) = self.pending.remove(&window) {
            self.timers.cancel(pending.token);
        }

        if let Some(mut preview) = self.previews.remove(&window) {
            preview.destroy();
            self.children.retain(|w| *w != window);
            self.stacking_hint.retain(|w| *w != window);
            debug!("Removed preview of {:?} from workspace {}", window, self.index);
        }
    }

    /// Refresh the stacking hint from the registry's stacking order.
    ///
    /// Windows missing from the snapshot keep their slot; the others are
    /// rearranged among the remaining slots. The visual order is untouched.
    pub fn on_restacked(&mut self) {
        if self.destroyed {
            return;
        }
        let stacking = self.registry.stacking_order();
        let in_snapshot: HashSet<WindowId> = stacking.iter().copied().collect();
        let mut restacked = stacking
            .into_iter()
            .unique()
            .filter(|w| self.previews.contains_key(w));
        for slot in self.stacking_hint.iter_mut() {
            if in_snapshot.contains(slot) {
                if let Some(window) = restacked.next() {
                    *slot = window;
                }
            }
        }
    }

    pub fn handle_drag_over(&self, payload: &DragPayload) -> DragMotionResult {
        match payload {
            DragPayload::Window(_) => DragMotionResult::MoveDrop,
            DragPayload::Other => DragMotionResult::Continue,
        }
    }

    /// A drag ended over this thumbnail. Moves the dragged window here.
    pub fn accept_drop(&mut self, payload: &DragPayload) -> bool {
        if self.destroyed {
            return false;
        }
        let Some(window) = payload.window() else {
            return false;
        };
        let Some(info) = self.registry.window(window) else {
            debug!("Dropped {:?} is not known to the registry", window);
            return false;
        };
        self.move_window(&info);
        true
    }

    fn move_window(&self, info: &WindowInfo) {
        if let Some(monitor) = self.monitor {
            if monitor != info.monitor {
                self.registry.move_window_to_monitor(info.id, monitor);
            }
        }
        self.registry.change_window_workspace(info.id, self.index);
    }

    /// Clicking the thumbnail itself switches to its workspace.
    pub fn click(&self) {
        if self.destroyed || self.index >= self.registry.n_workspaces() {
            return;
        }
        self.registry
            .activate_workspace(self.index, self.registry.current_time());
    }

    pub fn click_preview(&self, window: WindowId) -> bool {
        match self.previews.get(&window) {
            Some(preview) if !self.destroyed => {
                preview.emit_clicked();
                true
            }
            _ => false,
        }
    }

    /// Release every subscription, timer and preview. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.monitor = None;
        self.active = false;

        for mut subscription in self.subscriptions.drain(..) {
            subscription.dispose();
        }
        for (_, pending) in self.pending.drain() {
            self.timers.cancel(pending.token);
        }
        for (_, mut preview) in self.previews.drain() {
            preview.destroy();
        }
        self.children.clear();
        self.stacking_hint.clear();
        debug!("Destroyed thumbnail {:?} of workspace {}", self.id, self.index);
    }
}

impl Drop for ThumbnailContainer {
    fn drop(&mut self) {
        self.destroy();
    }
}
