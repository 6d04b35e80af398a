// SPDX-License-Identifier: MPL-2.0-only

use std::fmt;

use panel_workspaces_config::StatusAreaBox;

/// The host panel the indicator lives in
pub trait Panel: fmt::Debug {
    /// monitor the panel is shown on
    fn monitor_index(&self) -> usize;
    fn add_to_status_area(&self, role: &str, position: usize, status_box: StatusAreaBox);
    fn remove_from_status_area(&self, role: &str);
}
