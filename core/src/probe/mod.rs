//! Route probing
//!
//! A probe is a single HTTP request issued to check an endpoint's status
//! code. This module provides the pieces that make one:
//!
//! - [`RouteProber`]: dispatches a request and judges the response status
//! - [`Transport`]: the network seam the prober sends through
//! - [`HttpTransport`]: `reqwest`-backed HTTP/HTTPS transport
//! - [`ProbeError`]: why a probe failed
//!
//! Probes never return errors to their caller. Validation problems,
//! transport failures and status mismatches all end up as a failed
//! [`schema::ProbeResult`] carrying a message.

pub mod error;
pub mod prober;
pub mod transport;

pub use error::ProbeError;
pub use prober::{body_excerpt, evaluate, RouteProber, BODY_EXCERPT_LIMIT};
pub use transport::{HttpTransport, Transport, TransportResponse};
