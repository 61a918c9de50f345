//! Tracing setup

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Install the global fmt subscriber once
///
/// `RUST_LOG` wins over `default_filter`; an unparsable default falls back to
/// `info`. Output goes to stderr so command output stays clean.
pub fn init_tracing(default_filter: &str) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing("expense_ledger=debug");
        init_tracing("not a [valid filter");
        tracing::info!("tracing initialized");
    }
}
