// SPDX-License-Identifier: MPL-2.0-only

#![allow(dead_code)]

use std::{
    rc::Rc,
    time::{Duration, Instant},
};

use calloop::EventLoop;
use panel_workspaces::{
    config::{IndicatorConfig, WorkspaceNames},
    indicator::IndicatorController,
    mock::{MockPanel, MockRegistry},
    panel::Panel,
    registry::{SharedRegistry, WindowId},
    thumbnail::ThumbnailContainer,
    GlobalState,
};

pub struct Harness {
    pub state: GlobalState,
    pub event_loop: EventLoop<'static, GlobalState>,
    pub registry: Rc<MockRegistry>,
    pub panel: Rc<MockPanel>,
}

impl Harness {
    pub fn new(n_workspaces: usize) -> Self {
        Self::with(n_workspaces, 0, IndicatorConfig::default())
    }

    pub fn on_monitor(n_workspaces: usize, monitor: usize) -> Self {
        Self::with(n_workspaces, monitor, IndicatorConfig::default())
    }

    pub fn with(n_workspaces: usize, monitor: usize, config: IndicatorConfig) -> Self {
        let event_loop = EventLoop::<GlobalState>::try_new().unwrap();
        let (tx, rx) = calloop::channel::channel();
        let registry = Rc::new(MockRegistry::new(tx, n_workspaces));
        let panel = Rc::new(MockPanel::on_monitor(monitor));

        let shared_registry: SharedRegistry = registry.clone();
        let shared_panel: Rc<dyn Panel> = panel.clone();
        let state = GlobalState::new(
            shared_registry,
            shared_panel,
            config,
            WorkspaceNames::default(),
            event_loop.handle(),
        );
        state.insert_notification_source(rx).unwrap();

        Self {
            state,
            event_loop,
            registry,
            panel,
        }
    }

    /// Enable the indicator and forget the layout override it sent.
    pub fn enable(&mut self) {
        self.state.enable();
        self.dispatch();
        self.registry.clear_commands();
    }

    /// Handle every notification that is already queued, without letting
    /// the debounce period run out.
    pub fn dispatch(&mut self) {
        for _ in 0..4 {
            self.event_loop
                .dispatch(Some(Duration::ZERO), &mut self.state)
                .unwrap();
        }
    }

    /// Run the loop until every pending preview had the chance to settle.
    pub fn settle(&mut self) {
        let deadline = Instant::now() + self.state.config.preview_debounce() * 3;
        while Instant::now() < deadline {
            self.event_loop
                .dispatch(Some(Duration::from_millis(10)), &mut self.state)
                .unwrap();
        }
        self.dispatch();
    }

    pub fn indicator(&self) -> &IndicatorController {
        self.state.indicator.as_ref().expect("indicator enabled")
    }

    pub fn indicator_mut(&mut self) -> &mut IndicatorController {
        self.state.indicator.as_mut().expect("indicator enabled")
    }

    pub fn container(&self, index: usize) -> &ThumbnailContainer {
        self.indicator().container(index).expect("container exists")
    }

    /// indices of the thumbnails showing a preview of `window`
    pub fn shown_in(&self, window: WindowId) -> Vec<usize> {
        self.indicator()
            .containers()
            .iter()
            .filter(|c| c.has_preview(window))
            .map(|c| c.index())
            .collect()
    }

    /// a window is either settling or shown, never both
    pub fn assert_consistent(&self, windows: &[WindowId]) {
        for container in self.indicator().containers() {
            for window in windows {
                assert!(
                    !(container.is_pending(*window) && container.has_preview(*window)),
                    "{:?} is both pending and shown in thumbnail {}",
                    window,
                    container.index()
                );
            }
            assert_eq!(container.children().len(), container.preview_count());
        }
    }
}
