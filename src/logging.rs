use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

fn env_filter(debug: bool) -> EnvFilter {
    // When debug logging is disabled we force `info` level regardless of the
    // `RUST_LOG` environment variable.
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    }
}

/// Initialise logging. `debug` enables debug level (overridable via
/// `RUST_LOG`); otherwise the level is `info`. When `log_file` is given the
/// output goes to that file without ANSI colours.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let filter = env_filter(debug);

    let file_target = log_file.and_then(|path| {
        let file_name = path.file_name()?.to_os_string();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Some((dir, file_name))
    });

    let result = match file_target {
        Some((dir, file_name)) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(tracing_appender::rolling::never(dir, file_name))
            .try_init(),
        None => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
    };
    if result.is_err() {
        tracing::debug!("logger already initialised");
    }
}
