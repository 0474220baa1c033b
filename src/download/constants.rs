//! Constants for the download module (timeouts, partial files).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default idle read timeout (5 minutes between body chunks).
pub const READ_TIMEOUT: Duration = Duration::from_secs(300);

/// Extension appended to in-progress files next to the destination.
pub const PARTIAL_EXTENSION: &str = "part";

/// Buffer size for writes to the partial file.
pub(crate) const WRITE_BUFFER_BYTES: usize = 64 * 1024;
