//! HTTP module
//!
//! Provides the transport seam and the reqwest implementation behind it.
//!
//! # Features
//!
//! - **Bearer Authentication**: the API key is sent on every request
//! - **Rate Limiting**: token bucket rate limiter using governor
//! - **Swappable Transport**: tests and embedders can plug in their own

mod rate_limit;
mod transport;

pub use rate_limit::{RateLimiter, RateLimiterConfig, DEFAULT_REQUESTS_PER_SECOND};
pub use transport::{HttpTransport, Transport, TransportResponse};
