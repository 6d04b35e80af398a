// SPDX-License-Identifier: MPL-2.0-only

//! In-memory registry and panel, for tests and headless runs.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
};

use calloop::channel::Sender;
use panel_workspaces_config::StatusAreaBox;

use crate::{
    panel::Panel,
    registry::{
        Notification, RegistryEvent, SubscriptionId, Topic, WindowId, WindowInfo,
        WindowRegistry, WorkspaceId, WorkspaceLayout,
    },
};

/// Commands the indicator sent to the registry, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ActivateWorkspace(usize),
    ActivateWindow(WindowId),
    ChangeWorkspace { window: WindowId, index: usize },
    MoveToMonitor { window: WindowId, monitor: usize },
    OverrideLayout(WorkspaceLayout),
}

#[derive(Debug, Default)]
struct Inner {
    workspaces: Vec<WorkspaceId>,
    windows: BTreeMap<WindowId, WindowInfo>,
    stacking: Vec<WindowId>,
    active: usize,
    layout_rows: i32,
    subscriptions: BTreeMap<SubscriptionId, Topic>,
    app_icons: HashMap<String, String>,
    window_icons: HashMap<WindowId, String>,
    commands: Vec<Command>,
    next_id: u64,
    time: u32,
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// A window manager model living entirely in memory.
///
/// Mutations deliver notifications to live subscriptions through the calloop
/// channel given at construction, like a real registry would.
#[derive(Debug)]
pub struct MockRegistry {
    inner: RefCell<Inner>,
    sender: Sender<Notification>,
}

impl MockRegistry {
    pub fn new(sender: Sender<Notification>, n_workspaces: usize) -> Self {
        let mut inner = Inner {
            layout_rows: 1,
            ..Default::default()
        };
        for _ in 0..n_workspaces {
            let id = WorkspaceId(inner.next_id());
            inner.workspaces.push(id);
        }
        Self {
            inner: RefCell::new(inner),
            sender,
        }
    }

    fn emit(&self, event: RegistryEvent) {
        let topic = event.topic();
        let subscribers: Vec<SubscriptionId> = self
            .inner
            .borrow()
            .subscriptions
            .iter()
            .filter(|(_, t)| **t == topic)
            .map(|(id, _)| *id)
            .collect();
        for subscription in subscribers {
            // nobody listening is fine
            let _ = self.sender.send(Notification {
                subscription,
                event: event.clone(),
            });
        }
    }

    pub fn workspace_id(&self, index: usize) -> WorkspaceId {
        self.inner.borrow().workspaces[index]
    }

    /// Add or remove workspaces at the end. Windows of removed workspaces
    /// move to the last remaining one.
    pub fn set_n_workspaces(&self, n: usize) {
        let mut moved = Vec::new();
        let active_changed;
        {
            let mut inner = self.inner.borrow_mut();
            while inner.workspaces.len() < n {
                let id = WorkspaceId(inner.next_id());
                inner.workspaces.push(id);
            }
            let keep = n.min(inner.workspaces.len());
            let removed: Vec<WorkspaceId> = inner.workspaces.drain(keep..).collect();
            let target = inner.workspaces.last().copied();
            for info in inner.windows.values_mut() {
                if let Some(ws) = info.workspace.filter(|ws| removed.contains(ws)) {
                    info.workspace = target;
                    moved.push((info.id, ws, target));
                }
            }
            let last = inner.workspaces.len().saturating_sub(1);
            active_changed = inner.active > last;
            inner.active = inner.active.min(last);
        }
        for (window, from, to) in moved {
            self.emit(RegistryEvent::WindowRemoved {
                workspace: from,
                window,
            });
            if let Some(to) = to {
                self.emit(RegistryEvent::WindowAdded { workspace: to, window });
            }
        }
        self.emit(RegistryEvent::WorkspaceCountChanged);
        if active_changed {
            self.emit(RegistryEvent::ActiveWorkspaceChanged);
        }
    }

    /// Open a mapped window of class `app` on monitor 0.
    pub fn open_window(&self, index: usize) -> WindowId {
        self.open_window_with(index, |_| {})
    }

    pub fn open_window_with(&self, index: usize, setup: impl FnOnce(&mut WindowInfo)) -> WindowId {
        let (id, workspace) = {
            let mut inner = self.inner.borrow_mut();
            let id = WindowId(inner.next_id());
            let workspace = inner.workspaces.get(index).copied();
            let mut info = WindowInfo {
                id,
                workspace,
                monitor: 0,
                skip_taskbar: false,
                mapped: true,
                wm_class: Some("app".to_string()),
            };
            setup(&mut info);
            let workspace = info.workspace;
            inner.windows.insert(id, info);
            inner.stacking.push(id);
            (id, workspace)
        };
        self.emit(RegistryEvent::WindowCreated(id));
        if let Some(workspace) = workspace {
            self.emit(RegistryEvent::WindowAdded { workspace, window: id });
        }
        self.emit(RegistryEvent::Restacked);
        id
    }

    pub fn close_window(&self, window: WindowId) {
        let info = {
            let mut inner = self.inner.borrow_mut();
            inner.stacking.retain(|w| *w != window);
            inner.window_icons.remove(&window);
            inner.windows.remove(&window)
        };
        if let Some(workspace) = info.and_then(|i| i.workspace) {
            self.emit(RegistryEvent::WindowRemoved { workspace, window });
        }
    }

    /// Replay a "window added" notification without changing the model.
    pub fn emit_window_added(&self, window: WindowId) {
        let workspace = self.window(window).and_then(|i| i.workspace);
        if let Some(workspace) = workspace {
            self.emit(RegistryEvent::WindowAdded { workspace, window });
        }
    }

    /// Replay a "window removed" notification without changing the model.
    pub fn emit_window_removed(&self, window: WindowId) {
        let workspace = self.window(window).and_then(|i| i.workspace);
        if let Some(workspace) = workspace {
            self.emit(RegistryEvent::WindowRemoved { workspace, window });
        }
    }

    pub fn emit_window_created(&self, window: WindowId) {
        self.emit(RegistryEvent::WindowCreated(window));
    }

    pub fn set_wm_class(&self, window: WindowId, class: &str) {
        if let Some(info) = self.inner.borrow_mut().windows.get_mut(&window) {
            info.wm_class = Some(class.to_string());
        }
        self.emit(RegistryEvent::WindowClassChanged(window));
    }

    pub fn set_mapped(&self, window: WindowId, mapped: bool) {
        if let Some(info) = self.inner.borrow_mut().windows.get_mut(&window) {
            info.mapped = mapped;
        }
        self.emit(RegistryEvent::WindowMappedChanged(window));
    }

    pub fn set_app_icon(&self, class: &str, icon: &str) {
        self.inner
            .borrow_mut()
            .app_icons
            .insert(class.to_string(), icon.to_string());
    }

    pub fn set_window_icon(&self, window: WindowId, icon: &str) {
        self.inner
            .borrow_mut()
            .window_icons
            .insert(window, icon.to_string());
    }

    /// Replace the stacking order, bottom to top.
    pub fn restack(&self, order: &[WindowId]) {
        self.inner.borrow_mut().stacking = order.to_vec();
        self.emit(RegistryEvent::Restacked);
    }

    /// Switch workspaces as if the user did it outside the indicator.
    pub fn set_active(&self, index: usize) {
        self.inner.borrow_mut().active = index;
        self.emit(RegistryEvent::ActiveWorkspaceChanged);
    }

    pub fn set_layout_rows(&self, rows: i32) {
        self.inner.borrow_mut().layout_rows = rows;
        self.emit(RegistryEvent::WorkspaceLayoutChanged);
    }

    pub fn commands(&self) -> Vec<Command> {
        self.inner.borrow().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.inner.borrow_mut().commands.clear();
    }

    pub fn subscription_count(&self) -> usize {
        self.inner.borrow().subscriptions.len()
    }

    pub fn subscriptions_for(&self, topic: Topic) -> Vec<SubscriptionId> {
        self.inner
            .borrow()
            .subscriptions
            .iter()
            .filter(|(_, t)| **t == topic)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl WindowRegistry for MockRegistry {
    fn subscribe(&self, topic: Topic) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id());
        inner.subscriptions.insert(id, topic);
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.borrow_mut().subscriptions.remove(&id);
    }

    fn n_workspaces(&self) -> usize {
        self.inner.borrow().workspaces.len()
    }

    fn active_workspace_index(&self) -> usize {
        self.inner.borrow().active
    }

    fn workspace_by_index(&self, index: usize) -> Option<WorkspaceId> {
        self.inner.borrow().workspaces.get(index).copied()
    }

    fn list_windows(&self, workspace: WorkspaceId) -> Vec<WindowId> {
        self.inner
            .borrow()
            .windows
            .values()
            .filter(|info| info.workspace == Some(workspace))
            .map(|info| info.id)
            .collect()
    }

    fn window(&self, window: WindowId) -> Option<WindowInfo> {
        self.inner.borrow().windows.get(&window).cloned()
    }

    fn stacking_order(&self) -> Vec<WindowId> {
        self.inner.borrow().stacking.clone()
    }

    fn layout_rows(&self) -> i32 {
        self.inner.borrow().layout_rows
    }

    fn app_icon(&self, window: WindowId) -> Option<String> {
        let inner = self.inner.borrow();
        let class = inner.windows.get(&window)?.wm_class.as_ref()?;
        inner.app_icons.get(class).cloned()
    }

    fn window_icon(&self, window: WindowId) -> Option<String> {
        self.inner.borrow().window_icons.get(&window).cloned()
    }

    fn current_time(&self) -> u32 {
        let mut inner = self.inner.borrow_mut();
        inner.time += 1;
        inner.time
    }

    fn activate_workspace(&self, index: usize, _timestamp: u32) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            inner.commands.push(Command::ActivateWorkspace(index));
            let valid = index < inner.workspaces.len();
            if valid {
                inner.active = index;
            }
            valid
        };
        if changed {
            self.emit(RegistryEvent::ActiveWorkspaceChanged);
        }
    }

    fn activate_window(&self, window: WindowId, _timestamp: u32) {
        self.inner
            .borrow_mut()
            .commands
            .push(Command::ActivateWindow(window));
    }

    fn change_window_workspace(&self, window: WindowId, index: usize) {
        let moved = {
            let mut inner = self.inner.borrow_mut();
            inner
                .commands
                .push(Command::ChangeWorkspace { window, index });
            let target = inner.workspaces.get(index).copied();
            match (target, inner.windows.get_mut(&window)) {
                (Some(target), Some(info)) if info.workspace != Some(target) => {
                    let from = info.workspace.replace(target);
                    Some((from, target))
                }
                _ => None,
            }
        };
        if let Some((from, to)) = moved {
            if let Some(from) = from {
                self.emit(RegistryEvent::WindowRemoved {
                    workspace: from,
                    window,
                });
            }
            self.emit(RegistryEvent::WindowAdded { workspace: to, window });
        }
    }

    fn move_window_to_monitor(&self, window: WindowId, monitor: usize) {
        let mut inner = self.inner.borrow_mut();
        inner
            .commands
            .push(Command::MoveToMonitor { window, monitor });
        if let Some(info) = inner.windows.get_mut(&window) {
            info.monitor = monitor;
        }
    }

    fn override_workspace_layout(&self, layout: WorkspaceLayout) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.commands.push(Command::OverrideLayout(layout));
            inner.layout_rows = layout.rows;
        }
        self.emit(RegistryEvent::WorkspaceLayoutChanged);
    }
}

/// A panel that records what the indicator registered
#[derive(Debug, Default)]
pub struct MockPanel {
    pub monitor: usize,
    status_area: RefCell<Vec<(String, usize, StatusAreaBox)>>,
}

impl MockPanel {
    pub fn on_monitor(monitor: usize) -> Self {
        Self {
            monitor,
            ..Default::default()
        }
    }

    pub fn status_area(&self) -> Vec<(String, usize, StatusAreaBox)> {
        self.status_area.borrow().clone()
    }
}

impl Panel for MockPanel {
    fn monitor_index(&self) -> usize {
        self.monitor
    }

    fn add_to_status_area(&self, role: &str, position: usize, status_box: StatusAreaBox) {
        self.status_area
            .borrow_mut()
            .push((role.to_string(), position, status_box));
    }

    fn remove_from_status_area(&self, role: &str) {
        self.status_area.borrow_mut().retain(|(r, _, _)| r != role);
    }
}
