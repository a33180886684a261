//! CRC32 (IEEE 802.3) payload checksums.
//!
//! Table-driven implementation using the reflected polynomial 0xEDB88320,
//! kept in-tree rather than pulled from a crate: the frame codec needs
//! nothing beyond a one-shot checksum, and the algorithm fits in a page.

const POLYNOMIAL: u32 = 0xEDB8_8320;

/// Lookup table, generated at compile time.
const TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut index = 0;
    while index < 256 {
        let mut crc = index as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 == 1 {
                (crc >> 1) ^ POLYNOMIAL
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[index] = crc;
        index += 1;
    }
    table
}

/// Computes the CRC32 of `data` in one shot.
pub(crate) fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ TABLE[index];
    }
    crc ^ 0xFFFF_FFFF
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_hashes_to_zero() {
        assert_eq!(crc32(b""), 0x0000_0000);
    }

    #[test]
    fn standard_check_vectors() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(
            crc32(b"The quick brown fox jumps over the lazy dog"),
            0x414F_A339
        );
        assert_eq!(crc32(b"a"), 0xE8B7_BE43);
    }

    #[test]
    fn single_bit_flips_change_the_checksum() {
        let clean = crc32(b"doStep");
        let dirty = crc32(b"doStep\x01");
        assert_ne!(clean, dirty);

        let mut flipped = *b"doStep";
        flipped[0] ^= 0x01;
        assert_ne!(crc32(b"doStep"), crc32(&flipped));
    }
}
