//! Tracing setup: console layer plus optional rolling JSON file sink.

use acprio_config::Logging;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::cli::FILE_GUARD;

/// Install the global subscriber. `RUST_LOG` wins over `console_level`.
pub fn init_tracing(json: bool, console_level: &str, file_cfg: &Logging) {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(console_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    };

    let file = file_cfg.file.as_deref().and_then(|path| {
        let path = std::path::Path::new(path);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        let name = path.file_name()?;
        let appender = match file_cfg.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        let level = file_cfg.level.as_deref().unwrap_or("info");
        Some(
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")))
                .boxed(),
        )
    });

    // A second init (tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init();
}
