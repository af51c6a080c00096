/// Errors surfaced to the filesystem dispatch layer.
///
/// Nothing here is fatal: `AccessDenied` and `QueueFull` are recoverable
/// (the caller may retry or drop), the rest are terminal for the single
/// call that produced them.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The read or write path lock was not acquired in time.
    #[error("serial line busy (path lock not acquired)")]
    AccessDenied,

    /// The output queue refused the write.
    #[error("output queue refused the write")]
    QueueFull,

    /// An open path longer than a stream tag allows.
    #[error("stream name too long: {name:?}")]
    NameTooLong { name: String },

    /// Seeking has no meaning on a serial stream.
    #[error("operation not supported on a serial stream")]
    Unsupported,

    /// A control call with an unrecognized action code.
    #[error("unknown serial control action {action}")]
    UnknownAction { action: u32 },
}

pub type Result<T> = std::result::Result<T, DriverError>;
