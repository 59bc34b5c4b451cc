use std::sync::Mutex;

use slog::Drain;
use slog::Fuse;
use slog_async::Async;
use slog_json::Json;

pub use slog::{debug, error, info, o, trace, warn, Discard, Logger};

/// Name reported in every log line.
pub const SERVICE: &str = "rarity";

/// Builds the JSON logger used by the server and the helper binaries.
pub fn initialize_logger() -> Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);
    let drain = Async::new(drain).build().fuse();

    Logger::root(
        drain,
        o!("service" => SERVICE, "version" => info::VERSION, "revision" => info::REVISION, "build_timestamp" => info::BUILD_TIMESTAMP),
    )
}

/// A logger that swallows every record.
pub fn discard_logger() -> Logger {
    Logger::root(Discard, o!())
}

/// Installs a global logger filtered by `RUST_LOG` and returns the
/// guard that keeps it alive.
#[cfg(feature = "env_logging")]
pub fn initialize_env_logger() -> slog_scope::GlobalLoggerGuard {
    slog_envlogger::init().expect("initialize slog-envlogger")
}
