//! Tracing setup for the `beacon` binary.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber, writing to stderr so dashboard output on
/// stdout stays clean.
///
/// `RUST_LOG` wins when set. Otherwise `level` applies to the Beacon crates
/// and everything else (HTTP client internals included) logs at `warn`.
/// Only the first call in a process has an effect.
pub fn init_tracing(json: bool, level: Level) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if json {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer).try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

fn default_filter(level: Level) -> EnvFilter {
    EnvFilter::new(format!(
        "warn,beacon={level},beacon_core={level},beacon_state={level},beacon_poll={level}"
    ))
}
