/// Errors that can occur while building tags or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A stream tag name was empty or longer than 4 bytes.
    #[error("stream tag must be 1-4 bytes, got {len}")]
    InvalidTag { len: usize },

    /// A COBS code byte pointed past the end of the frame body.
    #[error("malformed frame encoding (code byte overruns body)")]
    InvalidEncoding,

    /// A frame decoded to fewer bytes than a stream tag.
    #[error("truncated frame ({len} bytes, tag needs 4)")]
    TruncatedFrame { len: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
