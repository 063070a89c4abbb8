use std::any::Any;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Initialize logging, panic handler, and build info reporting.
///
/// Logs go to stderr; stdout carries command output and backup streams.
/// The returned guard flushes buffered lines when dropped, so keep it alive
/// until just before the process exits.
pub fn init_logging(log_level: tracing::Level) -> WorkerGuard {
    let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());

    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stderr_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();

    register_panic_logger();
    report_build_info();

    stderr_guard
}

/// Log panics as errors, tagged with the panicking thread and source line.
fn register_panic_logger() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let thread = std::thread::current();

        tracing::error!(
            thread = thread.name().unwrap_or("unnamed"),
            location = %location,
            "panicked: {}",
            panic_reason(info.payload()),
        );
    }));
}

/// `panic!` payloads are a `&str` or a `String` unless raised with `panic_any`.
fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    if let Some(reason) = payload.downcast_ref::<&str>() {
        *reason
    } else if let Some(reason) = payload.downcast_ref::<String>() {
        reason.as_str()
    } else {
        "non-string payload"
    }
}

fn report_build_info() {
    let build = common::prelude::build_info();

    tracing::info!(
        build_profile = ?build.build_profile,
        features = ?build.build_features,
        version = ?build.version,
        "riak-migrate starting up"
    );
}
