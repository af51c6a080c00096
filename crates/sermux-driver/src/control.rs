//! Runtime control verbs.
//!
//! The filesystem layer exposes these as ioctl-style `(action, parameter)`
//! pairs; [`ControlRequest::from_raw`] decodes that boundary. The action
//! codes are part of the host-visible protocol and must not change.

use sermux_frame::tag::StreamTag;

/// Enable transmission for a stream tag.
pub const SERCTL_ACTIVATE: u32 = 10;
/// Disable transmission for a stream tag.
pub const SERCTL_DEACTIVATE: u32 = 11;
/// Make writes on a handle block when the output queue is full.
pub const SERCTL_BLKWRITE: u32 = 12;
/// Make writes on a handle fail immediately when the output queue is full.
pub const SERCTL_NOBLKWRITE: u32 = 13;
/// Turn frame encoding on for all subsequent writes.
pub const SERCTL_ENABLE_COBS: u32 = 14;
/// Turn frame encoding off; writes pass through raw.
pub const SERCTL_DISABLE_COBS: u32 = 15;

/// A decoded control verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    Activate(StreamTag),
    Deactivate(StreamTag),
    SetBlocking,
    SetNonblocking,
    EnableFraming,
    DisableFraming,
}

impl ControlRequest {
    /// Decode an ioctl-style `(action, parameter)` pair.
    ///
    /// The parameter is the little-endian `u32` form of a stream tag; it
    /// is only meaningful for activate/deactivate and ignored otherwise.
    /// Unknown action codes decode to `None`.
    pub fn from_raw(action: u32, parameter: u32) -> Option<Self> {
        match action {
            SERCTL_ACTIVATE => Some(Self::Activate(StreamTag::from_raw(parameter))),
            SERCTL_DEACTIVATE => Some(Self::Deactivate(StreamTag::from_raw(parameter))),
            SERCTL_BLKWRITE => Some(Self::SetBlocking),
            SERCTL_NOBLKWRITE => Some(Self::SetNonblocking),
            SERCTL_ENABLE_COBS => Some(Self::EnableFraming),
            SERCTL_DISABLE_COBS => Some(Self::DisableFraming),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use sermux_frame::tag::STDOUT;

    use super::*;

    #[test]
    fn decodes_every_action_code() {
        let key = STDOUT.as_u32();
        assert_eq!(
            ControlRequest::from_raw(SERCTL_ACTIVATE, key),
            Some(ControlRequest::Activate(STDOUT))
        );
        assert_eq!(
            ControlRequest::from_raw(SERCTL_DEACTIVATE, key),
            Some(ControlRequest::Deactivate(STDOUT))
        );
        assert_eq!(
            ControlRequest::from_raw(SERCTL_BLKWRITE, 0),
            Some(ControlRequest::SetBlocking)
        );
        assert_eq!(
            ControlRequest::from_raw(SERCTL_NOBLKWRITE, 0),
            Some(ControlRequest::SetNonblocking)
        );
        assert_eq!(
            ControlRequest::from_raw(SERCTL_ENABLE_COBS, 0),
            Some(ControlRequest::EnableFraming)
        );
        assert_eq!(
            ControlRequest::from_raw(SERCTL_DISABLE_COBS, 0),
            Some(ControlRequest::DisableFraming)
        );
    }

    #[test]
    fn unknown_action_decodes_to_none() {
        assert_eq!(ControlRequest::from_raw(0, 0), None);
        assert_eq!(ControlRequest::from_raw(99, 0), None);
    }
}
