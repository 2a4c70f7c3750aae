use thiserror::Error;

/// Errors from [`crate::distance::DistanceProvider`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistanceError {
    /// No points were provided.
    ///
    /// A matrix needs at least one point. Callers should pre-filter input to
    /// avoid this condition.
    #[error("at least one point is required")]
    EmptyInput,
    /// A coordinate was not finite or was out of range.
    #[error("invalid coordinate ({x}, {y})")]
    InvalidCoordinate {
        /// Longitude.
        x: f64,
        /// Latitude.
        y: f64,
    },
    /// The request timed out.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Timeout in seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    HttpError {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail.
        message: String,
    },
    /// The service could not be reached.
    #[error("network error requesting {url}: {message}")]
    NetworkError {
        /// Requested URL.
        url: String,
        /// Error detail.
        message: String,
    },
    /// The routing service reported a failure code.
    #[error("routing service returned {code}: {message}")]
    ServiceError {
        /// Service status code.
        code: String,
        /// Service message.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Decoder message.
        message: String,
    },
    /// No finite route exists between two points.
    #[error("no route from point {from} to point {to}")]
    Unreachable {
        /// Index of the origin point.
        from: usize,
        /// Index of the destination point.
        to: usize,
    },
    /// The returned matrix did not match the requested point count.
    #[error("expected a {expected}x{expected} distance matrix")]
    MalformedMatrix {
        /// Requested point count.
        expected: usize,
    },
}
