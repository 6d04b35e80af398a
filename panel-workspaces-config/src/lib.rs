// SPDX-License-Identifier: MPL-2.0-only

//! Config for panel-workspaces

mod indicator_config;
mod workspace_names;

pub use indicator_config::*;
pub use workspace_names::*;

/// xdg prefix shared by every panel-workspaces config file
pub const NAME: &str = "panel-workspaces";
