//! Failures of a MAP client session

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The client library could not be loaded. Callers may carry on with
    /// acquisition disabled.
    #[error("client library unavailable: {0}")]
    LibraryUnavailable(String),

    /// The server did not accept the client.
    #[error("failed to initialize client: {0}")]
    Init(String),

    #[error("unsupported timestamp tick {tick} us (expected 25, 40 or 50)")]
    Calibration { tick: i32 },

    #[error("channel {channel}: timestamp {timestamp} precedes {previous}")]
    OrderingViolation {
        channel: u16,
        previous: u64,
        timestamp: u64,
    },

    /// The library claimed more records than the batch can hold.
    #[error("library reported {count} events for a batch of {capacity}")]
    BatchOverrun { count: usize, capacity: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}
