//! Byte-oriented serial device abstraction.
//!
//! This is the lowest layer of sermux. The driver core never talks to
//! hardware directly; it consumes the [`SerialTransport`] trait provided
//! here. A real port exposes how many bytes it can currently accept, a
//! bulk write that may accept fewer bytes than offered, and a single-byte
//! timed read.

pub mod loopback;
pub mod traits;

pub use loopback::LoopbackTransport;
pub use traits::SerialTransport;
