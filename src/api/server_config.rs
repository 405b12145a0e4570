//! Server-wide limits.

use std::time::Duration;

/// Concurrent in-flight requests
pub const MAX_CONCURRENCY: usize = 256;

/// Fallback per-request timeout when none is configured
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
