//! Core functionality for routeprobe
//!
//! This crate holds the route prober, the smoke suite that drives it, route
//! plan configuration and console reporting. The CLI is a thin wrapper
//! around these pieces.

#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod config;
pub mod error;
pub mod probe;
pub mod report;
pub mod suite;


// Re-export schema types for convenience
pub use schema::*;

pub use config::{resolve_config, ConfigOverrides};
pub use error::{CoreError, Result};
pub use probe::{HttpTransport, ProbeError, RouteProber, Transport, TransportResponse};
pub use suite::{SmokeSuite, SuiteEvent, SuiteReport};

/// Core utilities and helper functions
pub mod utils {
    use tracing::debug;

    /// Initialize tracing for the application
    ///
    /// `RUST_LOG` wins over `level` when set. Output goes to stderr so the
    /// probe report on stdout stays readable.
    pub fn init_tracing(level: &str) -> crate::Result<()> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| crate::CoreError::InitializationError(e.to_string()))?;

        debug!("Tracing initialized with level: {}", level);
        Ok(())
    }
}
