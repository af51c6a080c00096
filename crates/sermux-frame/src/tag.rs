//! Stream tags.
//!
//! A tag is exactly 4 bytes. It doubles as a short human-readable name
//! ("sout", "jinx", ...) and as a little-endian `u32` multiplexing key.
//! The four reserved tags below identify the standard streams and the
//! debug channel; they are pre-allocated at driver initialization and
//! never created by the open path.

use std::fmt;

use crate::error::{FrameError, Result};

/// Number of bytes in a stream tag.
pub const TAG_LEN: usize = 4;

/// Standard input.
pub const STDIN: StreamTag = StreamTag(*b"sinp");

/// Standard output. Enabled by default, but not guaranteed delivery.
pub const STDOUT: StreamTag = StreamTag(*b"sout");

/// Standard error. Guaranteed delivery.
pub const STDERR: StreamTag = StreamTag(*b"serr");

/// Kernel debug channel.
pub const DEBUG: StreamTag = StreamTag(*b"kdbg");

/// A 4-byte logical stream identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamTag([u8; TAG_LEN]);

impl StreamTag {
    /// Tag from exactly 4 bytes.
    pub const fn new(bytes: [u8; TAG_LEN]) -> Self {
        Self(bytes)
    }

    /// Tag from a short name, zero-padded to 4 bytes.
    ///
    /// Names must be 1..=4 bytes; anything else is rejected. This is the
    /// validation applied to paths handed to the open path.
    pub fn from_name(name: &str) -> Result<Self> {
        let bytes = name.as_bytes();
        if bytes.is_empty() || bytes.len() > TAG_LEN {
            return Err(FrameError::InvalidTag { len: bytes.len() });
        }
        let mut tag = [0u8; TAG_LEN];
        tag[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(tag))
    }

    /// Tag from its little-endian `u32` key.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw.to_le_bytes())
    }

    /// The raw 4 tag bytes.
    pub const fn as_bytes(&self) -> &[u8; TAG_LEN] {
        &self.0
    }

    /// The tag as a little-endian `u32` key, used for set membership.
    pub const fn as_u32(self) -> u32 {
        u32::from_le_bytes(self.0)
    }
}

impl From<[u8; TAG_LEN]> for StreamTag {
    fn from(bytes: [u8; TAG_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for StreamTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            if byte == 0 {
                break;
            }
            if byte.is_ascii_graphic() {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{byte:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for StreamTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StreamTag(\"{self}\")")
    }
}

/// Diagnostic name for a reserved tag.
pub fn tag_name(tag: StreamTag) -> &'static str {
    match tag {
        STDIN => "STDIN",
        STDOUT => "STDOUT",
        STDERR => "STDERR",
        DEBUG => "DEBUG",
        _ => "USER",
    }
}
