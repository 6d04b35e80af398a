// SPDX-License-Identifier: MPL-2.0-only

use std::{
    cell::RefCell,
    path::Path,
    rc::Rc,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use calloop::{channel::Channel, EventLoop};
use panel_workspaces::{
    config::{IndicatorConfig, StatusAreaBox, WorkspaceNames, NAME, WORKSPACE_NAMES_PATH},
    mock::{MockPanel, MockRegistry},
    panel::Panel,
    registry::{Notification, SharedRegistry},
    run, start,
    timer::Timers,
    GlobalState,
};
use tempfile::TempDir;

// XDG_CONFIG_HOME is process wide
static XDG_ENV: Mutex<()> = Mutex::new(());

struct Setup {
    _xdg: TempDir,
    _env: MutexGuard<'static, ()>,
    event_loop: EventLoop<'static, GlobalState>,
    notifications: Channel<Notification>,
    registry: Rc<MockRegistry>,
    panel: Rc<MockPanel>,
}

impl Setup {
    /// Point the xdg config dir at a fresh directory, after letting `fill`
    /// put files into `panel-workspaces/` inside it.
    fn new(n_workspaces: usize, fill: impl FnOnce(&Path)) -> Self {
        let env = XDG_ENV.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let xdg = tempfile::tempdir().unwrap();
        let config_dir = xdg.path().join(NAME);
        std::fs::create_dir_all(&config_dir).unwrap();
        fill(&config_dir);
        std::env::set_var("XDG_CONFIG_HOME", xdg.path());

        let event_loop = EventLoop::<GlobalState>::try_new().unwrap();
        let (tx, notifications) = calloop::channel::channel();
        Self {
            _xdg: xdg,
            _env: env,
            event_loop,
            notifications,
            registry: Rc::new(MockRegistry::new(tx, n_workspaces)),
            panel: Rc::new(MockPanel::default()),
        }
    }

    fn shared_registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    fn shared_panel(&self) -> Rc<dyn Panel> {
        self.panel.clone()
    }

    /// Stop the loop after `delay`, reporting what `inspect` saw right before.
    fn stop_after<T: 'static>(
        &self,
        delay: Duration,
        inspect: impl FnOnce(&mut GlobalState) -> T + 'static,
    ) -> Rc<RefCell<Option<T>>> {
        let seen = Rc::new(RefCell::new(None));
        let signal = self.event_loop.get_signal();
        let report = seen.clone();
        Timers::new(self.event_loop.handle())
            .schedule(delay, move |state: &mut GlobalState| {
                *report.borrow_mut() = Some(inspect(state));
                signal.stop();
            })
            .unwrap();
        seen
    }
}

fn write_names(dir: &Path, names: &[&str]) {
    WorkspaceNames::from(names.iter().map(|n| n.to_string()).collect::<Vec<_>>())
        .write_to(&dir.join(WORKSPACE_NAMES_PATH))
        .unwrap();
}

fn menu_labels(state: &GlobalState) -> Vec<String> {
    state
        .indicator
        .as_ref()
        .map(|indicator| {
            indicator
                .menu_items()
                .iter()
                .map(|item| item.label.clone())
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn stored_config_and_names_are_read_at_startup() {
    let setup = Setup::new(3, |dir| {
        write_names(dir, &["Mail", "Code"]);
        IndicatorConfig {
            status_area_position: 3,
            status_area_box: StatusAreaBox::Right,
            ..Default::default()
        }
        .write_to(&dir.join("config.ron"))
        .unwrap();
    });

    let mut state = GlobalState::from_xdg(
        setup.shared_registry(),
        setup.shared_panel(),
        setup.event_loop.handle(),
    );
    assert_eq!(state.config.status_area_position, 3);

    state.enable();
    assert_eq!(menu_labels(&state), vec!["Mail", "Code", "Workspace 3"]);
    assert_eq!(
        setup.panel.status_area(),
        vec![("workspace-indicator".to_string(), 3, StatusAreaBox::Right)]
    );
}

#[test]
fn missing_files_fall_back_to_defaults() {
    let setup = Setup::new(2, |_| {});
    let mut state = GlobalState::from_xdg(
        setup.shared_registry(),
        setup.shared_panel(),
        setup.event_loop.handle(),
    );
    assert_eq!(state.config, IndicatorConfig::default());
    assert!(state.names.is_empty());

    state.enable();
    assert_eq!(menu_labels(&state), vec!["Workspace 1", "Workspace 2"]);
}

#[test]
fn run_enables_until_the_loop_stops_then_disables() {
    let setup = Setup::new(2, |_| {});
    let panel = setup.panel.clone();
    let during = setup.stop_after(Duration::from_millis(50), move |state| {
        (state.is_enabled(), panel.status_area().len())
    });
    let state = GlobalState::new(
        setup.shared_registry(),
        setup.shared_panel(),
        IndicatorConfig::default(),
        WorkspaceNames::default(),
        setup.event_loop.handle(),
    );

    let Setup {
        _xdg,
        _env,
        event_loop,
        notifications,
        registry,
        panel,
    } = setup;
    state.insert_notification_source(notifications).unwrap();
    run(state, event_loop).unwrap();

    assert_eq!(*during.borrow(), Some((true, 1)));
    assert!(panel.status_area().is_empty());
    assert_eq!(registry.subscription_count(), 0);
}

#[test]
fn start_runs_with_the_stored_names() {
    let setup = Setup::new(2, |dir| write_names(dir, &["Web"]));
    let seen = setup.stop_after(Duration::from_millis(50), |state| menu_labels(state));

    let Setup {
        _xdg,
        _env,
        event_loop,
        notifications,
        registry,
        panel,
    } = setup;
    start(
        registry.clone(),
        panel.clone(),
        notifications,
        event_loop,
    )
    .unwrap();

    assert_eq!(
        seen.borrow().clone(),
        Some(vec!["Web".to_string(), "Workspace 2".to_string()])
    );
    assert!(panel.status_area().is_empty());
    assert_eq!(registry.subscription_count(), 0);
}
