use once_cell::sync::OnceCell;
use tracing_subscriber::{
    fmt, fmt::time::UtcTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::error::{AppError, AppResult};
use crate::models::settings::{LoggingSettings, DEFAULT_LOG_DIRECTIVES};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();
static LOGGER_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// Installs the global subscriber once. Later calls are no-ops.
pub fn init_logging(settings: &LoggingSettings) -> AppResult<()> {
    LOGGER_INIT
        .get_or_try_init(|| {
            let env_filter = build_filter(&settings.directives)?;

            let (file_layer, file_guard) = match settings.log_dir.as_deref() {
                Some(dir) => {
                    std::fs::create_dir_all(dir)?;
                    let file_appender = tracing_appender::rolling::daily(dir, "slotstack.log");
                    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                    let layer = fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true)
                        .with_timer(UtcTime::rfc_3339());
                    (Some(layer), Some(guard))
                }
                None => (None, None),
            };

            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_timer(UtcTime::rfc_3339()),
                )
                .try_init()
                .map_err(|err| AppError::other(format!("failed to install subscriber: {err}")))?;

            // Kept only once the subscriber is installed.
            if let Some(guard) = file_guard {
                LOGGER_GUARD
                    .set(guard)
                    .map_err(|_| AppError::other("logger already initialised"))?;
            }

            Ok(())
        })
        .map(|_| ())
}

fn build_filter(directives: &str) -> AppResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives))
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_DIRECTIVES))
        .map_err(|err| AppError::config(format!("invalid log directives: {err}")))
}
