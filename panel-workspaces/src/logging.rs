// SPDX-License-Identifier: MPL-2.0-only

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log to stderr and, when available, journald. Filtered by `RUST_LOG`,
/// `info` by default.
pub fn init() -> anyhow::Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter_layer = env_filter(directives.as_deref());
    let fmt_layer = fmt::layer().with_target(false);
    let journald_layer = match tracing_journald::layer() {
        Ok(layer) => Some(layer),
        Err(err) => {
            eprintln!("Failed to connect to journald: {}", err);
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(journald_layer)
        .try_init()?;
    log_panics::init();

    Ok(())
}

/// Unparsable directives fall back to `info`.
fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_defaults_to_info() {
        assert_eq!(env_filter(None).to_string(), "info");
    }

    #[test]
    fn filter_uses_given_directives() {
        assert_eq!(env_filter(Some("debug")).to_string(), "debug");
    }

    #[test]
    fn bad_directives_fall_back_to_info() {
        assert_eq!(env_filter(Some("panel=notalevel")).to_string(), "info");
    }
}
