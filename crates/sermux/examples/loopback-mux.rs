//! Loopback mux example — three streams share one serial line.
//!
//! Run with:
//!   cargo run --example loopback-mux

use std::sync::Arc;
use std::thread;

use bytes::BytesMut;
use sermux::driver::{ControlRequest, SerialDriver};
use sermux::frame::{decode_frame, tag_name};
use sermux::logging::{init_logging, LogFormat, LogLevel};
use sermux::transport::LoopbackTransport;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogFormat::Text, LogLevel::Debug);

    let driver = Arc::new(SerialDriver::new(LoopbackTransport::new()));

    // Enable the debug channel; stdout is on by default, stderr always is.
    let dbg_tag = driver.debug().tag();
    driver.control(driver.debug(), ControlRequest::Activate(dbg_tag))?;

    let writers: Vec<_> = [
        ("stdout", b"hello from stdout\n".as_ref()),
        ("stderr", b"something went wrong\n".as_ref()),
        ("debug", b"tick 42\n".as_ref()),
    ]
    .into_iter()
    .map(|(stream, payload)| {
        let driver = Arc::clone(&driver);
        thread::spawn(move || {
            let handle = match stream {
                "stdout" => Arc::clone(driver.stdout()),
                "stderr" => Arc::clone(driver.stderr()),
                _ => Arc::clone(driver.debug()),
            };
            driver
                .write(&handle, payload)
                .expect("write should succeed");
        })
    })
    .collect();

    for writer in writers {
        writer.join().expect("writer thread should not panic");
    }

    // The system daemon would call this periodically; here once is enough.
    driver.flush();

    // Host side: demultiplex the wire with the reference decoder.
    let mut wire = BytesMut::from(driver.transport().take_outbound().as_slice());
    while let Some(frame) = decode_frame(&mut wire)? {
        eprintln!(
            "[host] {} ({}): {:?}",
            frame.tag,
            tag_name(frame.tag),
            String::from_utf8_lossy(&frame.payload)
        );
    }

    Ok(())
}
