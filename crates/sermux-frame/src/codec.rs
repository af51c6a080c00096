use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::tag::{StreamTag, TAG_LEN};

/// Frame delimiter byte. Appended after each encoded body by the write
/// path, not by [`encode`] itself.
pub const FRAME_DELIMITER: u8 = 0x00;

/// Longest run of non-zero bytes a single code byte can cover.
const MAX_BLOCK: usize = 254;

/// A decoded frame: originating stream plus payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The stream this message belongs to.
    pub tag: StreamTag,
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(tag: StreamTag, payload: impl Into<Bytes>) -> Self {
        Self {
            tag,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (encoded body + delimiter).
    pub fn wire_size(&self) -> usize {
        measure(self.tag, &self.payload) + 1
    }
}

/// Exact encoded length of (tag ++ payload), excluding the trailing
/// delimiter.
///
/// COBS removes every zero byte from the body and pays for it with code
/// bytes: one opening code byte, one extra for each zero in the input,
/// and one extra for each full 254-byte run of non-zero bytes.
pub fn measure(tag: StreamTag, payload: &[u8]) -> usize {
    let mut encoded = 1; // opening code byte
    let mut run = 0usize;
    for &byte in tag.as_bytes().iter().chain(payload) {
        encoded += 1;
        if byte == 0 {
            run = 0;
        } else {
            run += 1;
            if run == MAX_BLOCK {
                encoded += 1;
                run = 0;
            }
        }
    }
    encoded
}

/// COBS-encode (tag ++ payload) into `dst`.
///
/// Appends exactly [`measure`]`(tag, payload)` bytes, none of which is
/// 0x00. The caller appends the trailing [`FRAME_DELIMITER`]. Pure and
/// deterministic; no shared state.
pub fn encode(tag: StreamTag, payload: &[u8], dst: &mut BytesMut) {
    dst.reserve(measure(tag, payload));
    let mut code_pos = dst.len();
    dst.put_u8(0); // placeholder, patched when the block closes
    let mut code = 1u8;
    for &byte in tag.as_bytes().iter().chain(payload) {
        if byte == 0 {
            dst[code_pos] = code;
            code_pos = dst.len();
            dst.put_u8(0);
            code = 1;
        } else {
            dst.put_u8(byte);
            code += 1;
            if code == 0xFF {
                dst[code_pos] = code;
                code_pos = dst.len();
                dst.put_u8(0);
                code = 1;
            }
        }
    }
    dst[code_pos] = code;
}

/// Decode the next delimited frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame body and its delimiter from the buffer.
///
/// This is the host-side reference decoder; the device itself only ever
/// encodes.
pub fn decode_frame(src: &mut BytesMut) -> Result<Option<Frame>> {
    let Some(end) = src.iter().position(|&byte| byte == FRAME_DELIMITER) else {
        return Ok(None); // Need more data
    };

    let body = src.split_to(end);
    src.advance(1); // the delimiter itself

    let decoded = cobs_decode(&body)?;
    if decoded.len() < TAG_LEN {
        return Err(FrameError::TruncatedFrame { len: decoded.len() });
    }

    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&decoded[..TAG_LEN]);

    Ok(Some(Frame {
        tag: StreamTag::new(tag),
        payload: Bytes::copy_from_slice(&decoded[TAG_LEN..]),
    }))
}

fn cobs_decode(body: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(body.len());
    let mut pos = 0usize;
    while pos < body.len() {
        let code = body[pos] as usize;
        let block_end = pos + code;
        if code == 0 || block_end > body.len() {
            return Err(FrameError::InvalidEncoding);
        }
        out.extend_from_slice(&body[pos + 1..block_end]);
        pos = block_end;
        // A short block implies a zero, except for the final virtual one.
        if code != 0xFF && pos < body.len() {
            out.push(0);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::{DEBUG, STDERR, STDOUT};

    fn roundtrip(tag: StreamTag, payload: &[u8]) -> Frame {
        let mut wire = BytesMut::new();
        encode(tag, payload, &mut wire);
        assert_eq!(wire.len(), measure(tag, payload));
        assert!(
            !wire.contains(&FRAME_DELIMITER),
            "encoded body must be zero-free"
        );
        wire.put_u8(FRAME_DELIMITER);
        decode_frame(&mut wire).unwrap().unwrap()
    }

    #[test]
    fn roundtrips_simple_payload() {
        let frame = roundtrip(STDOUT, b"hello, sermux!");
        assert_eq!(frame.tag, STDOUT);
        assert_eq!(frame.payload.as_ref(), b"hello, sermux!");
    }

    #[test]
    fn roundtrips_empty_payload() {
        let frame = roundtrip(STDERR, b"");
        assert_eq!(frame.tag, STDERR);
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn roundtrips_payloads_with_zeros() {
        for payload in [
            &[0u8][..],
            &[0, 0, 0][..],
            &[1, 0, 2, 0, 3][..],
            &[0, 1, 2, 3, 0][..],
            b"line\n\0line".as_ref(),
        ] {
            let frame = roundtrip(DEBUG, payload);
            assert_eq!(frame.tag, DEBUG);
            assert_eq!(frame.payload.as_ref(), payload);
        }
    }

    #[test]
    fn roundtrips_zero_padded_tag() {
        // A 2-byte name leaves zero bytes inside the tag itself.
        let tag = StreamTag::from_name("ab").unwrap();
        let frame = roundtrip(tag, b"payload");
        assert_eq!(frame.tag, tag);
        assert_eq!(frame.payload.as_ref(), b"payload");
    }

    #[test]
    fn roundtrips_long_runs() {
        // Exercise the 254-byte block split, on and around the boundary.
        for len in [249usize, 250, 253, 254, 255, 508, 509, 1000] {
            let payload: Vec<u8> = (0..len).map(|i| (i % 255) as u8 + 1).collect();
            let frame = roundtrip(STDOUT, &payload);
            assert_eq!(frame.payload.as_ref(), payload.as_slice());
        }
    }

    #[test]
    fn measure_matches_known_sizes() {
        // 4 non-zero tag bytes + n non-zero payload bytes under 254: n + 5.
        assert_eq!(measure(STDOUT, b""), 5);
        assert_eq!(measure(STDOUT, b"abc"), 8);
        // Each payload zero costs one code byte instead of the data byte.
        assert_eq!(measure(STDOUT, &[0, 0]), 7);
        // 250 payload bytes push the first block to exactly 254.
        assert_eq!(measure(STDOUT, &[1u8; 250]), 256);
    }

    #[test]
    fn frames_concatenate_on_the_wire() {
        let mut wire = BytesMut::new();
        encode(STDOUT, b"first", &mut wire);
        wire.put_u8(FRAME_DELIMITER);
        encode(STDERR, b"second", &mut wire);
        wire.put_u8(FRAME_DELIMITER);

        let f1 = decode_frame(&mut wire).unwrap().unwrap();
        let f2 = decode_frame(&mut wire).unwrap().unwrap();
        assert_eq!((f1.tag, f1.payload.as_ref()), (STDOUT, b"first".as_ref()));
        assert_eq!((f2.tag, f2.payload.as_ref()), (STDERR, b"second".as_ref()));
        assert!(wire.is_empty());
    }

    #[test]
    fn decode_waits_for_delimiter() {
        let mut wire = BytesMut::new();
        encode(STDOUT, b"partial", &mut wire);
        // No delimiter yet.
        assert!(decode_frame(&mut wire).unwrap().is_none());
        let body_len = wire.len();
        wire.put_u8(FRAME_DELIMITER);
        let frame = decode_frame(&mut wire).unwrap().unwrap();
        assert_eq!(frame.payload.as_ref(), b"partial");
        assert_eq!(body_len, measure(STDOUT, b"partial"));
    }

    #[test]
    fn decode_rejects_overrunning_code_byte() {
        // Code byte claims 9 following bytes; only 2 are present.
        let mut wire = BytesMut::from(&[0x0A, b'x', b'y', FRAME_DELIMITER][..]);
        assert!(matches!(
            decode_frame(&mut wire),
            Err(FrameError::InvalidEncoding)
        ));
    }

    #[test]
    fn decode_rejects_tagless_frame() {
        // A 2-byte body decodes to a single byte, shorter than a tag.
        let mut wire = BytesMut::from(&[0x02, b'x', FRAME_DELIMITER][..]);
        assert!(matches!(
            decode_frame(&mut wire),
            Err(FrameError::TruncatedFrame { len: 1 })
        ));
    }

    #[test]
    fn wire_size_counts_delimiter() {
        let frame = Frame::new(STDOUT, Bytes::from_static(b"test"));
        assert_eq!(frame.wire_size(), measure(STDOUT, b"test") + 1);
    }
}
