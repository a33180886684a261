#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Test frame-level deserialization
    let mut buf = BytesMut::from(data);

    // Try to decode a frame from arbitrary bytes
    // This tests:
    // - Header parsing robustness
    // - Magic number validation
    // - Protocol version checking
    // - Payload size limits (max 16 MiB)
    // - CRC32 checksum validation
    // - Buffer boundary conditions
    if let Ok(Some(frame)) = lockstep_wire::Frame::decode(&mut buf) {
        // If we successfully decoded a frame, try to deserialize as Request
        // This tests:
        // - Postcard deserialization robustness
        // - Enum variant handling
        // - Field validation
        // - Nested structure handling
        let _request = lockstep_wire::Request::from_frame(&frame);

        // Also try as Response
        let _response = lockstep_wire::Response::from_frame(&frame);
    }

    // Even if frame decode fails, test edge cases by attempting direct
    // header decode without validation
    let mut header_buf = data;
    let _header = lockstep_wire::FrameHeader::decode(&mut header_buf);
});
