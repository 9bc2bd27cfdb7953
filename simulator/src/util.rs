use tracing_forest::ForestLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// The default `Level` is `INFO`. It can be overridden with `RUST_LOG`.
/// Does nothing if a subscriber is already installed.
pub fn init_logger() {
    if cfg!(feature = "tracing-profile") {
        match tracing_profile::init_tracing() {
            // The guard flushes the profile on drop and must outlive the
            // whole process.
            Ok(guard) => std::mem::forget(guard),
            Err(err) => eprintln!("failed to initialize tracing-profile: {err:?}"),
        }
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(ForestLayer::default())
            .try_init();
    }
}
