use crate::Environment;
use std::fs::File;
use std::sync::Mutex;
use tracing::{debug, info, Level};
use tracing_subscriber::{filter::Targets, prelude::*, EnvFilter};

/// Target used for per-request lines that go to the request log file.
pub const REQUEST_LOG_TARGET: &str = "request_log";

/// Install color-eyre with a project-standard configuration.
///
/// Call this early in main() before any fallible operations. Safe to call
/// multiple times.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Initialize tracing with environment-aware configuration and error span capture.
///
/// - **Production** (`APP_ENV=production`): JSON format, module targets hidden
/// - **Development** (default): pretty-printed format
///
/// `RUST_LOG` overrides the console level. When `request_log` is given, every
/// event emitted with target [`REQUEST_LOG_TARGET`] is also appended to that
/// file as a plain text line, independent of `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored (common in tests).
pub fn init_tracing(environment: &Environment, request_log: Option<File>) {
    let is_production = environment.is_production();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production {
            EnvFilter::new("info,sea_orm=warn,sqlx=warn")
        } else {
            EnvFilter::new("debug")
        }
    });

    let has_request_log = request_log.is_some();
    let request_log_layer = request_log.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
            .with_filter(Targets::new().with_target(REQUEST_LOG_TARGET, Level::INFO))
    });

    let result = if is_production {
        tracing_subscriber::registry()
            .with(request_log_layer)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true)
                    .with_filter(filter),
            )
            .with(tracing_error::ErrorLayer::default())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(request_log_layer)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty()
                    .with_filter(filter),
            )
            .with(tracing_error::ErrorLayer::default())
            .try_init()
    };

    match result {
        Ok(_) => {
            info!(
                request_log = has_request_log,
                "Tracing initialized. Environment: {:?}", environment
            );
        }
        Err(_) => {
            debug!("Tracing already initialized, skipping re-initialization");
        }
    }
}
