//! Tracing subscriber setup shared by the binaries.
//!
//! `RUST_LOG` takes precedence over the configured default level:
//! ```bash
//! RUST_LOG=pdfchat=debug,tower_http=debug pdfchat-server
//! ```

use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: Once = Once::new();

/// Installs the global fmt subscriber. Only the first call takes effect.
pub fn init(default_level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_filter(filter);

        // a subscriber installed by an embedding application wins
        let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
    });
}
