// SPDX-License-Identifier: MPL-2.0-only

// Installs the global subscriber and panic hook, so it gets a test binary of
// its own.

use panel_workspaces::logging;

#[test]
fn init_only_once() {
    logging::init().unwrap();
    tracing::info!("logging initialized");
    assert!(logging::init().is_err());
}
