// SPDX-License-Identifier: MPL-2.0-only

//! The panel indicator: a strip of workspace thumbnails, a status label and
//! a menu listing the workspaces.

use panel_workspaces_config::WorkspaceNames;
use tracing::{debug, info, trace};

use crate::{
    dnd::{DragMotionResult, DragPayload},
    registry::{Notification, RegistryEvent, SharedRegistry, Subscription, Topic, WindowId},
    shared_state::GlobalState,
    thumbnail::{ContainerId, PreviewSettings, ThumbnailContainer},
    timer::Timers,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ornament {
    #[default]
    None,
    Dot,
}

/// Entry of the workspace menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceMenuItem {
    pub workspace: usize,
    pub label: String,
    pub ornament: Ornament,
}

#[derive(Debug)]
pub struct IndicatorController {
    registry: SharedRegistry,
    timers: Timers<GlobalState>,
    settings: PreviewSettings,
    names: WorkspaceNames,
    monitor: Option<usize>,
    containers: Vec<ThumbnailContainer>,
    next_container_id: u64,
    active: Option<usize>,
    menu_items: Vec<WorkspaceMenuItem>,
    status_label: String,
    /// workspaces are stacked vertically, only the status label is shown
    vertical: bool,
    subscriptions: Vec<Subscription>,
    destroyed: bool,
}

impl IndicatorController {
    pub fn new(
        registry: &SharedRegistry,
        timers: Timers<GlobalState>,
        settings: PreviewSettings,
        names: WorkspaceNames,
        monitor: Option<usize>,
    ) -> Self {
        let subscriptions = vec![
            Subscription::new(registry, Topic::WorkspaceCountChanged),
            Subscription::new(registry, Topic::ActiveWorkspaceChanged),
            Subscription::new(registry, Topic::WorkspaceLayoutChanged),
        ];
        let mut indicator = Self {
            registry: registry.clone(),
            timers,
            settings,
            names,
            monitor,
            containers: Vec::new(),
            next_container_id: 0,
            active: None,
            menu_items: Vec::new(),
            status_label: String::new(),
            vertical: false,
            subscriptions,
            destroyed: false,
        };
        indicator.create_workspaces_section();
        indicator.rebuild_thumbnails();
        indicator.on_layout_changed();
        indicator
    }

    pub fn containers(&self) -> &[ThumbnailContainer] {
        &self.containers
    }

    pub fn container(&self, index: usize) -> Option<&ThumbnailContainer> {
        self.containers.get(index)
    }

    pub fn container_mut(&mut self, index: usize) -> Option<&mut ThumbnailContainer> {
        self.containers.get_mut(index)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn menu_items(&self) -> &[WorkspaceMenuItem] {
        &self.menu_items
    }

    pub fn status_label(&self) -> &str {
        &self.status_label
    }

    pub fn is_vertical(&self) -> bool {
        self.vertical
    }

    /// the indicator itself only reacts to input while the thumbnails are hidden
    pub fn is_reactive(&self) -> bool {
        self.vertical
    }

    pub fn status_label_visible(&self) -> bool {
        self.vertical
    }

    pub fn thumbnails_visible(&self) -> bool {
        !self.vertical
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn live_subscriptions(&self) -> usize {
        self.subscriptions.iter().filter(|s| s.is_live()).count()
            + self
                .containers
                .iter()
                .map(ThumbnailContainer::live_subscriptions)
                .sum::<usize>()
    }

    pub fn handle_notification(&mut self, notification: Notification) {
        if self.destroyed {
            return;
        }

        if self
            .subscriptions
            .iter()
            .any(|s| s.id() == notification.subscription)
        {
            match notification.event {
                RegistryEvent::WorkspaceCountChanged => self.on_n_workspaces_changed(),
                RegistryEvent::ActiveWorkspaceChanged => self.on_active_workspace_changed(),
                RegistryEvent::WorkspaceLayoutChanged => self.on_layout_changed(),
                event => trace!("Indicator ignores {:?}", event),
            }
            return;
        }

        if !self
            .containers
            .iter_mut()
            .any(|c| c.handle_notification(&notification))
        {
            trace!(
                "Dropping notification for stale subscription {:?}",
                notification.subscription
            );
        }
    }

    pub(crate) fn preview_settled(&mut self, container: ContainerId, window: WindowId, serial: u64) {
        match self.containers.iter_mut().find(|c| c.id() == container) {
            Some(c) => c.settle(window, serial),
            None => debug!(
                "Preview of {:?} settled for destroyed thumbnail {:?}",
                window, container
            ),
        }
    }

    fn on_n_workspaces_changed(&mut self) {
        info!(
            "Workspace count changed to {}",
            self.registry.n_workspaces()
        );
        self.create_workspaces_section();
        self.rebuild_thumbnails();
    }

    /// Tear down every thumbnail, then create one per workspace.
    pub fn rebuild_thumbnails(&mut self) {
        if self.destroyed {
            return;
        }
        for mut container in self.containers.drain(..) {
            container.destroy();
        }

        for index in 0..self.registry.n_workspaces() {
            self.next_container_id += 1;
            let id = ContainerId(self.next_container_id);
            if let Some(container) = ThumbnailContainer::new(
                id,
                index,
                &self.registry,
                self.timers.clone(),
                self.settings.clone(),
                self.monitor,
            ) {
                self.containers.push(container);
            }
        }
        debug!("Rebuilt {} thumbnails", self.containers.len());
        self.on_active_workspace_changed();
    }

    fn derive_active(&self) -> Option<usize> {
        let n = self.containers.len();
        if n == 0 {
            return None;
        }
        Some(self.registry.active_workspace_index().min(n - 1))
    }

    pub fn on_active_workspace_changed(&mut self) {
        if self.destroyed {
            return;
        }
        self.active = self.derive_active();
        self.update_menu_ornament();
        self.update_active_thumbnail();
        self.status_label = self.label_text(None);
    }

    fn update_menu_ornament(&mut self) {
        for item in &mut self.menu_items {
            item.ornament = if Some(item.workspace) == self.active {
                Ornament::Dot
            } else {
                Ornament::None
            };
        }
    }

    fn update_active_thumbnail(&mut self) {
        for (i, container) in self.containers.iter_mut().enumerate() {
            container.set_active(Some(i) == self.active);
        }
    }

    fn on_layout_changed(&mut self) {
        self.vertical = self.registry.layout_rows() == -1;
        debug!(
            "Workspace layout is {}",
            if self.vertical { "vertical" } else { "horizontal" }
        );
    }

    /// Text of the status label, or of the menu item for `workspace`.
    pub fn label_text(&self, workspace: Option<usize>) -> String {
        match workspace {
            None => (self.active.unwrap_or(0) + 1).to_string(),
            Some(index) => self.names.name(index),
        }
    }

    fn create_workspaces_section(&mut self) {
        let n_workspaces = self.registry.n_workspaces();
        self.menu_items = (0..n_workspaces)
            .map(|workspace| WorkspaceMenuItem {
                workspace,
                label: self.label_text(Some(workspace)),
                ornament: Ornament::None,
            })
            .collect();
        self.update_menu_ornament();
    }

    /// The name store changed on disk.
    pub fn update_names(&mut self, names: WorkspaceNames) {
        self.names = names;
        self.update_menu_labels();
    }

    pub fn update_menu_labels(&mut self) {
        let labels: Vec<String> = self
            .menu_items
            .iter()
            .map(|item| self.label_text(Some(item.workspace)))
            .collect();
        for (item, label) in self.menu_items.iter_mut().zip(labels) {
            item.label = label;
        }
    }

    /// Switch to the workspace at `index`. Out of range requests are ignored.
    ///
    /// Returns whether an activation was requested.
    pub fn activate(&self, index: i64) -> bool {
        let n_workspaces = self.registry.n_workspaces();
        match usize::try_from(index) {
            Ok(index) if index < n_workspaces => {
                self.registry
                    .activate_workspace(index, self.registry.current_time());
                true
            }
            _ => {
                debug!(
                    "Ignoring activation of workspace {} of {}",
                    index, n_workspaces
                );
                false
            }
        }
    }

    pub fn activate_menu_item(&self, item: usize) -> bool {
        match self.menu_items.get(item) {
            Some(item) => self.activate(item.workspace as i64),
            None => false,
        }
    }

    pub fn handle_scroll(&self, direction: ScrollDirection) -> bool {
        let diff = match direction {
            ScrollDirection::Down => 1,
            ScrollDirection::Up => -1,
            _ => return false,
        };
        let current = self.registry.active_workspace_index() as i64;
        self.activate(current + diff)
    }

    pub fn handle_drag_over(&self, index: usize, payload: &DragPayload) -> DragMotionResult {
        match self.containers.get(index) {
            Some(container) => container.handle_drag_over(payload),
            None => DragMotionResult::Continue,
        }
    }

    pub fn accept_drop(&mut self, index: usize, payload: &DragPayload) -> bool {
        match self.containers.get_mut(index) {
            Some(container) => container.accept_drop(payload),
            None => false,
        }
    }

    pub fn click_thumbnail(&self, index: usize) {
        if let Some(container) = self.containers.get(index) {
            container.click();
        }
    }

    pub fn click_preview(&self, index: usize, window: WindowId) -> bool {
        self.containers
            .get(index)
            .is_some_and(|c| c.click_preview(window))
    }

    /// The panel surface went away; nothing may be shown on it anymore.
    pub fn detach_surface(&mut self) {
        self.monitor = None;
        for container in &mut self.containers {
            container.detach();
        }
    }

    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        for mut subscription in self.subscriptions.drain(..) {
            subscription.dispose();
        }
        for mut container in self.containers.drain(..) {
            container.destroy();
        }
        self.menu_items.clear();
        self.active = None;
        info!("Workspace indicator destroyed");
    }
}

impl Drop for IndicatorController {
    fn drop(&mut self) {
        self.destroy();
    }
}
