use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::Settings;

pub(crate) fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&settings.telemetry().log_level)));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(fmt::format::FmtSpan::CLOSE);

    let result =
        if settings.telemetry().json { builder.json().try_init() } else { builder.try_init() };
    result.map_err(|err| anyhow::anyhow!(err.to_string()))
}

/// A bare level such as `debug` is scoped to this crate and the HTTP layer so
/// dependency noise stays at `warn`. Full directive strings pass through.
fn default_directives(level: &str) -> String {
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }
    format!("warn,submission_roster={level},tower_http={level}")
}

#[cfg(test)]
mod tests {
    use super::default_directives;

    #[test]
    fn bare_level_is_scoped_to_crate() {
        assert_eq!(
            default_directives("debug"),
            "warn,submission_roster=debug,tower_http=debug"
        );
    }

    #[test]
    fn explicit_directives_are_kept() {
        assert_eq!(default_directives("info,axum=trace"), "info,axum=trace");
    }
}
