// SPDX-License-Identifier: MPL-2.0-only

//! Workspace indicator for a desktop panel.
//!
//! Keeps a strip of workspace thumbnails, each holding previews of the
//! windows on that workspace, in sync with the window manager's
//! [`WindowRegistry`](registry::WindowRegistry). Previews can be dragged onto
//! another thumbnail to move their window there.
//!
//! Everything runs on one calloop event loop whose data is
//! [`GlobalState`](shared_state::GlobalState).

pub mod config_watching;
pub mod dnd;
pub mod indicator;
pub mod logging;
pub mod mock;
pub mod panel;
pub mod preview;
pub mod registry;
pub mod shared_state;
pub mod thumbnail;
pub mod timer;

pub use panel_workspaces_config as config;
pub use shared_state::{run, start, GlobalState};
