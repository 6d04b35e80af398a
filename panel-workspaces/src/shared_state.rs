// SPDX-License-Identifier: MPL-2.0-only

use std::{fmt, rc::Rc, time::Duration};

use anyhow::anyhow;
use calloop::{channel, EventLoop, LoopHandle, RegistrationToken};
use notify::RecommendedWatcher;
use panel_workspaces_config::{IndicatorConfig, WorkspaceNames};
use tracing::{debug, error, info, warn};

use crate::{
    config_watching,
    indicator::IndicatorController,
    logging,
    panel::Panel,
    registry::{Notification, SharedRegistry, WindowId, WorkspaceLayout},
    thumbnail::{ContainerId, PreviewSettings},
    timer::Timers,
};

/// Loop data of the indicator's event loop.
///
/// Owns the extension lifecycle: `enable` builds the indicator and registers
/// it with the panel, `disable` tears it down again.
pub struct GlobalState {
    pub registry: SharedRegistry,
    pub panel: Rc<dyn Panel>,
    pub config: IndicatorConfig,
    pub names: WorkspaceNames,
    pub indicator: Option<IndicatorController>,
    pub(crate) loop_handle: LoopHandle<'static, GlobalState>,
    timers: Timers<GlobalState>,
    watchers: Vec<RecommendedWatcher>,
}

impl fmt::Debug for GlobalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalState")
            .field("registry", &self.registry)
            .field("panel", &self.panel)
            .field("config", &self.config)
            .field("names", &self.names)
            .field("indicator", &self.indicator)
            .field("watchers", &self.watchers.len())
            .finish_non_exhaustive()
    }
}

impl GlobalState {
    pub fn new(
        registry: SharedRegistry,
        panel: Rc<dyn Panel>,
        config: IndicatorConfig,
        names: WorkspaceNames,
        loop_handle: LoopHandle<'static, GlobalState>,
    ) -> Self {
        Self {
            registry,
            panel,
            config,
            names,
            indicator: None,
            timers: Timers::new(loop_handle.clone()),
            loop_handle,
            watchers: Vec::new(),
        }
    }

    /// State with the config and workspace names found in the xdg config
    /// directory, or their defaults.
    pub fn from_xdg(
        registry: SharedRegistry,
        panel: Rc<dyn Panel>,
        loop_handle: LoopHandle<'static, GlobalState>,
    ) -> Self {
        Self::new(
            registry,
            panel,
            IndicatorConfig::load_or_default(),
            WorkspaceNames::load_or_default(),
            loop_handle,
        )
    }

    /// Deliver registry notifications sent on `notifications` to this state.
    pub fn insert_notification_source(
        &self,
        notifications: channel::Channel<Notification>,
    ) -> anyhow::Result<RegistrationToken> {
        self.loop_handle
            .insert_source(notifications, |event, _, state: &mut GlobalState| {
                match event {
                    channel::Event::Msg(notification) => state.handle_notification(notification),
                    channel::Event::Closed => warn!("Registry notification channel closed"),
                }
            })
            .map_err(|err| {
                anyhow!(
                    "Failed to insert notification channel into event loop: {}",
                    err
                )
            })
    }

    /// Reload the workspace names whenever the name store changes on disk.
    pub fn watch_workspace_names(&mut self) -> anyhow::Result<()> {
        let watcher = config_watching::watch_workspace_names(&self.loop_handle)?;
        self.watchers.push(watcher);
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.indicator.is_some()
    }

    pub fn enable(&mut self) {
        if self.indicator.is_some() {
            return;
        }
        if self.config.override_layout {
            self.registry
                .override_workspace_layout(WorkspaceLayout::single_row());
        }

        let indicator = IndicatorController::new(
            &self.registry,
            self.timers.clone(),
            PreviewSettings::from(&self.config),
            self.names.clone(),
            Some(self.panel.monitor_index()),
        );
        self.indicator = Some(indicator);
        self.panel.add_to_status_area(
            &self.config.status_area_role,
            self.config.status_area_position,
            self.config.status_area_box,
        );
        info!("Workspace indicator enabled");
    }

    pub fn disable(&mut self) {
        let Some(mut indicator) = self.indicator.take() else {
            return;
        };
        indicator.destroy();
        self.panel
            .remove_from_status_area(&self.config.status_area_role);
        info!("Workspace indicator disabled");
    }

    pub fn handle_notification(&mut self, notification: Notification) {
        match self.indicator.as_mut() {
            Some(indicator) => indicator.handle_notification(notification),
            None => debug!(
                "Indicator disabled, dropping {:?}",
                notification.event
            ),
        }
    }

    pub(crate) fn preview_settled(&mut self, container: ContainerId, window: WindowId, serial: u64) {
        if let Some(indicator) = self.indicator.as_mut() {
            indicator.preview_settled(container, window, serial);
        }
    }

    pub fn set_workspace_names(&mut self, names: WorkspaceNames) {
        debug!("Workspace names changed: {:?}", names.as_slice());
        if let Some(indicator) = self.indicator.as_mut() {
            indicator.update_names(names.clone());
        }
        self.names = names;
    }

    /// The host destroyed the panel surface before disabling the indicator.
    pub fn surface_destroyed(&mut self) {
        if let Some(indicator) = self.indicator.as_mut() {
            indicator.detach_surface();
        }
    }
}

/// Entry point for a host: set up logging, load the stored config and
/// workspace names, then [`run`] until the loop is stopped.
pub fn start(
    registry: SharedRegistry,
    panel: Rc<dyn Panel>,
    notifications: channel::Channel<Notification>,
    event_loop: EventLoop<'static, GlobalState>,
) -> anyhow::Result<()> {
    if let Err(err) = logging::init() {
        warn!("Logging was already set up: {}", err);
    }

    let state = GlobalState::from_xdg(registry, panel, event_loop.handle());
    state.insert_notification_source(notifications)?;
    run(state, event_loop)
}

/// Enable the indicator and dispatch the event loop until it is stopped
/// through its [`calloop::LoopSignal`].
pub fn run(
    mut state: GlobalState,
    mut event_loop: EventLoop<'static, GlobalState>,
) -> anyhow::Result<()> {
    if let Err(err) = state.watch_workspace_names() {
        error!("Failed to watch workspace names: {}", err);
    }
    state.enable();
    let result = event_loop.run(None::<Duration>, &mut state, |_| {});
    state.disable();
    result.map_err(|err| anyhow!("Event loop failed: {}", err))
}
