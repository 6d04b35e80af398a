// SPDX-License-Identifier: MPL-2.0-only

use std::fmt;

use tracing::trace;

use crate::{
    dnd::DragPayload,
    registry::{SharedRegistry, Subscription, SubscriptionId, Topic, WindowId},
};

/// Icon shown by a preview. Never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewIcon {
    /// icon of the owning application
    App(String),
    /// icon set on the window itself
    Window(String),
    /// themed fallback from the config
    Fallback(String),
}

impl PreviewIcon {
    pub fn name(&self) -> &str {
        match self {
            Self::App(name) | Self::Window(name) | Self::Fallback(name) => name,
        }
    }
}

type ClickedHandler = Box<dyn Fn()>;

/// A clickable, draggable preview of one window inside a workspace thumbnail
pub struct PreviewEntry {
    window: WindowId,
    registry: SharedRegistry,
    icon: PreviewIcon,
    icon_size: u32,
    fallback_icon: String,
    subscriptions: Vec<Subscription>,
    clicked: Vec<ClickedHandler>,
}

impl fmt::Debug for PreviewEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewEntry")
            .field("window", &self.window)
            .field("icon", &self.icon)
            .field("icon_size", &self.icon_size)
            .field("subscriptions", &self.subscriptions.len())
            .field("clicked", &self.clicked.len())
            .finish()
    }
}

impl PreviewEntry {
    pub fn new(
        window: WindowId,
        registry: &SharedRegistry,
        icon_size: u32,
        fallback_icon: &str,
    ) -> Self {
        let subscriptions = vec![
            Subscription::new(registry, Topic::WindowClassChanged(window)),
            Subscription::new(registry, Topic::WindowMappedChanged(window)),
        ];
        let mut preview = Self {
            window,
            registry: registry.clone(),
            icon: PreviewIcon::Fallback(fallback_icon.to_string()),
            icon_size,
            fallback_icon: fallback_icon.to_string(),
            subscriptions,
            clicked: Vec::new(),
        };
        preview.update_icon();
        preview
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    /// window identity used by drag sources
    pub fn real_window(&self) -> WindowId {
        self.window
    }

    pub fn drag_payload(&self) -> DragPayload {
        DragPayload::Window(self.window)
    }

    pub fn icon(&self) -> &PreviewIcon {
        &self.icon
    }

    pub fn icon_size(&self) -> u32 {
        self.icon_size
    }

    pub fn update_icon(&mut self) {
        self.icon = if let Some(icon) = self.registry.app_icon(self.window) {
            PreviewIcon::App(icon)
        } else if let Some(icon) = self.registry.window_icon(self.window) {
            PreviewIcon::Window(icon)
        } else {
            PreviewIcon::Fallback(self.fallback_icon.clone())
        };
        trace!("Preview of {:?} shows {:?}", self.window, self.icon);
    }

    pub fn connect_clicked(&mut self, handler: impl Fn() + 'static) {
        self.clicked.push(Box::new(handler));
    }

    pub fn emit_clicked(&self) {
        for handler in &self.clicked {
            handler();
        }
    }

    pub fn owns(&self, subscription: SubscriptionId) -> bool {
        self.subscriptions.iter().any(|s| s.id() == subscription)
    }

    /// Handle a notification for one of this preview's subscriptions.
    pub fn handle_notification(&mut self, subscription: SubscriptionId) {
        if self.owns(subscription) {
            self.update_icon();
        }
    }

    pub fn live_subscriptions(&self) -> usize {
        self.subscriptions.iter().filter(|s| s.is_live()).count()
    }

    pub fn destroy(&mut self) {
        for mut subscription in self.subscriptions.drain(..) {
            subscription.dispose();
        }
        self.clicked.clear();
    }
}

impl Drop for PreviewEntry {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use crate::mock::MockRegistry;

    fn registry() -> (Rc<MockRegistry>, SharedRegistry) {
        let (tx, _rx) = calloop::channel::channel();
        let mock = Rc::new(MockRegistry::new(tx, 1));
        let shared: SharedRegistry = mock.clone();
        (mock, shared)
    }

    #[test]
    fn icon_prefers_the_application_icon() {
        let (mock, shared) = registry();
        let w = mock.open_window(0);
        mock.set_window_icon(w, "window-icon");
        mock.set_app_icon("app", "firefox");
        let preview = PreviewEntry::new(w, &shared, 22, "application-x-executable");
        assert_eq!(preview.icon(), &PreviewIcon::App("firefox".into()));
    }

    #[test]
    fn icon_falls_back_to_window_then_theme() {
        let (mock, shared) = registry();
        let w = mock.open_window(0);
        let mut preview = PreviewEntry::new(w, &shared, 22, "application-x-executable");
        assert_eq!(
            preview.icon(),
            &PreviewIcon::Fallback("application-x-executable".into())
        );

        mock.set_window_icon(w, "window-icon");
        preview.update_icon();
        assert_eq!(preview.icon().name(), "window-icon");
    }

    #[test]
    fn class_change_notification_re_resolves_icon() {
        let (mock, shared) = registry();
        let w = mock.open_window(0);
        mock.set_app_icon("editor", "gedit");
        let mut preview = PreviewEntry::new(w, &shared, 22, "fallback");
        assert_eq!(preview.icon().name(), "fallback");

        mock.set_wm_class(w, "editor");
        let subscription = mock
            .subscriptions_for(Topic::WindowClassChanged(w))
            .pop()
            .unwrap();
        preview.handle_notification(subscription);
        assert_eq!(preview.icon(), &PreviewIcon::App("gedit".into()));
    }

    #[test]
    fn destroy_releases_subscriptions_and_handlers() {
        let (mock, shared) = registry();
        let w = mock.open_window(0);
        let clicks = Rc::new(Cell::new(0));
        let mut preview = PreviewEntry::new(w, &shared, 22, "fallback");
        let counter = clicks.clone();
        preview.connect_clicked(move || counter.set(counter.get() + 1));
        preview.emit_clicked();
        assert_eq!(mock.subscription_count(), 2);

        preview.destroy();
        preview.destroy();
        preview.emit_clicked();
        assert_eq!(clicks.get(), 1);
        assert_eq!(preview.live_subscriptions(), 0);
        assert_eq!(mock.subscription_count(), 0);
    }

    #[test]
    fn drag_payload_carries_the_window() {
        let (mock, shared) = registry();
        let w = mock.open_window(0);
        let preview = PreviewEntry::new(w, &shared, 22, "fallback");
        assert_eq!(preview.drag_payload(), DragPayload::Window(w));
        assert_eq!(preview.real_window(), w);
    }
}
