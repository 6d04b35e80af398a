// SPDX-License-Identifier: MPL-2.0-only

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use calloop::{channel, LoopHandle};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use panel_workspaces_config::WorkspaceNames;
use tracing::{error, info, warn};

use crate::shared_state::GlobalState;

#[derive(Debug, Clone)]
enum ConfigUpdate {
    WorkspaceNames(WorkspaceNames),
}

/// Watch the workspace name store in the xdg config directory.
pub fn watch_workspace_names(
    handle: &LoopHandle<'static, GlobalState>,
) -> anyhow::Result<RecommendedWatcher> {
    let path = WorkspaceNames::path()?;
    watch_workspace_names_file(handle, path)
}

/// Watch the workspace name store at `path`, delivering reloaded names into
/// the event loop.
pub fn watch_workspace_names_file(
    handle: &LoopHandle<'static, GlobalState>,
    path: PathBuf,
) -> anyhow::Result<RecommendedWatcher> {
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .context("workspace names file has no parent directory")?;
    let (entries_tx, entries_rx) = channel::sync_channel::<ConfigUpdate>(30);

    handle
        .insert_source(entries_rx, move |event, _, state| {
            match event {
                channel::Event::Msg(ConfigUpdate::WorkspaceNames(names)) => {
                    state.set_workspace_names(names);
                },
                channel::Event::Closed => {},
            };
        })
        .map_err(|err| anyhow!("Failed to insert config channel into event loop: {}", err))?;

    let watched = path.clone();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| {
            let e = match res {
                Ok(e) => e,
                Err(err) => {
                    error!("Workspace names watcher failed: {:?}", err);
                    return;
                },
            };
            if !e.paths.iter().any(|p| p == &watched) {
                return;
            }
            match e.kind {
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {
                    let names = match WorkspaceNames::load_from(&watched) {
                        Ok(names) => names,
                        Err(_) if !watched.exists() => WorkspaceNames::default(),
                        Err(err) => {
                            warn!("Ignoring unreadable workspace names: {}", err);
                            return;
                        },
                    };
                    if let Err(err) = entries_tx.send(ConfigUpdate::WorkspaceNames(names)) {
                        error!("Failed to send workspace names update: {}", err);
                    }
                },
                _ => {},
            }
        },
        notify::Config::default(),
    )?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    info!("Watching workspace names in {}", path.display());

    Ok(watcher)
}
