//! Tracing setup for host applications embedding the widgets.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt};

/// Widget lifecycle at `info`, per-frame pointer and scheduler noise at `warn`.
pub const DEFAULT_LOG_FILTER: &str = "info,bevy_prodcalc_ui=info,bevy_app=warn,bevy_ecs=warn";

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

fn resolve_filter(from_env: Option<String>, default_filter: &str) -> EnvFilter {
    from_env
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter))
}

/// Initialize a process-wide tracing subscriber with [`DEFAULT_LOG_FILTER`].
///
/// Call this once from the host binary before building the `App`.
pub fn init_logging() {
    init_logging_with(DEFAULT_LOG_FILTER);
}

/// Like [`init_logging`], with a caller-chosen fallback filter.
///
/// `RUST_LOG` still takes precedence when it holds valid directives. Only the
/// first call in a process installs a subscriber.
pub fn init_logging_with(default_filter: &str) {
    LOGGING_INITIALIZED.get_or_init(|| {
        let env_filter = resolve_filter(
            std::env::var(EnvFilter::DEFAULT_ENV).ok(),
            default_filter,
        );

        let _ = fmt().with_env_filter(env_filter).try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_quiets_scheduler_targets() {
        assert!(DEFAULT_LOG_FILTER.contains("bevy_app=warn"));
        assert!(DEFAULT_LOG_FILTER.contains("bevy_ecs=warn"));
        assert!(DEFAULT_LOG_FILTER.contains("bevy_prodcalc_ui=info"));
    }

    #[test]
    fn env_directives_override_fallback() {
        let filter = resolve_filter(Some("bevy_prodcalc_ui=trace".to_string()), "warn");
        assert_eq!(filter.to_string(), "bevy_prodcalc_ui=trace");

        let filter = resolve_filter(None, "warn");
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn init_logging_can_be_called_multiple_times() {
        init_logging();
        init_logging_with("debug");
    }
}
