//! Character-oriented serial transport multiplexing.
//!
//! sermux ships several logical byte streams — stdin, stdout, stderr, a
//! debug channel, and arbitrary named streams — over one physical serial
//! line, framed so a host-side tool can pull them apart again.
//!
//! # Crate Structure
//!
//! - [`transport`] — Byte-oriented serial device abstraction
//! - [`frame`] — COBS framing with stream-tag multiplexing
//! - [`driver`] — Output queue, delivery policy, read/write paths,
//!   control verbs

pub mod logging;

/// Re-export transport types.
pub mod transport {
    pub use sermux_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use sermux_frame::*;
}

/// Re-export driver types.
pub mod driver {
    pub use sermux_driver::*;
}
