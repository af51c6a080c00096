//! Zero-delimited COBS framing with stream-tag multiplexing.
//!
//! This is the core value-add layer of sermux. Every outbound message is
//! COBS-encoded together with its 4-byte stream tag so the body contains
//! no zero byte, then terminated with a single 0x00 delimiter:
//! - Frames are self-delimiting; a receiver resynchronizes at any 0x00.
//! - The tag rides inside the encoding, so one frame recovers both the
//!   originating stream and the payload.
//!
//! The encoder is what the device runs; the decoder here is the reference
//! implementation a host-side tool would use, and what the tests use.

pub mod codec;
pub mod error;
pub mod tag;

pub use codec::{decode_frame, encode, measure, Frame, FRAME_DELIMITER};
pub use error::{FrameError, Result};
pub use tag::{tag_name, StreamTag, DEBUG, STDERR, STDIN, STDOUT, TAG_LEN};
