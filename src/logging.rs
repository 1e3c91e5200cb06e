use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
/// Installs a global compact subscriber. `RUST_LOG` takes precedence over
/// `default_level`. Returns `false` if a subscriber was already set.
pub fn init_tracing(default_level: &str) -> bool {
  let env_filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  let fmt_layer = tracing_subscriber::fmt::layer()
    .with_target(false)
    .with_thread_names(true)
    .compact();
  tracing_subscriber::registry()
    .with(env_filter)
    .with(fmt_layer)
    .try_init()
    .is_ok()
}
