//! Mode S CRC-24 via Euclidean bit-walk XOR, and ICAO address recovery.
//!
//! This is deliberately not a table-driven polynomial CRC. The 24-bit
//! generator `FF FA 04 80` is applied as a destructive bit-walk over a
//! working copy of the frame with the trailing parity bytes zeroed,
//! matching how Mode S ground equipment actually computes the residue. Do
//! not replace this with a lookup-table CRC unless its bit order is
//! verified to match.

const GENERATOR: [u32; 4] = [0xFF, 0xFA, 0x04, 0x80];

/// Compute the CRC-24 residue of a Mode S frame.
///
/// `data` is the full wire frame (7 or 14 bytes) including its trailing
/// 3-byte parity/address field, which this function zeroes internally
/// before walking. The returned value is the trailing 3 bytes after the
/// walk: for DF11/17/18 a valid frame's residue is all-zero; for
/// DF0/4/5/16/20/21, XOR this with the wire's trailing 3 bytes to recover
/// the ICAO address.
pub fn residue(data: &[u8]) -> [u8; 3] {
    let len = data.len();
    if len < 4 {
        return [0, 0, 0];
    }

    let mut frame = data.to_vec();
    frame[len - 3] = 0;
    frame[len - 2] = 0;
    frame[len - 1] = 0;

    for ibyte in 0..=(len - 4) {
        for ibit in 0..8u32 {
            let mask = 0x80u8 >> ibit;
            if frame[ibyte] & mask == 0 {
                continue;
            }
            frame[ibyte] ^= (GENERATOR[0] >> ibit) as u8;
            frame[ibyte + 1] ^= (0xFF
                & ((GENERATOR[0] << (8 - ibit)) | (GENERATOR[1] >> ibit)))
                as u8;
            frame[ibyte + 2] ^= (0xFF
                & ((GENERATOR[1] << (8 - ibit)) | (GENERATOR[2] >> ibit)))
                as u8;
            frame[ibyte + 3] ^= (0xFF
                & ((GENERATOR[2] << (8 - ibit)) | (GENERATOR[3] >> ibit)))
                as u8;
        }
    }

    [frame[len - 3], frame[len - 2], frame[len - 1]]
}

/// Compute the 24-bit ICAO address of a DF0/4/5/16/20/21 frame by XORing
/// the wire's trailing 3 bytes with the computed CRC residue.
pub fn icao_from_crc(data: &[u8]) -> super::types::Icao {
    let r = residue(data);
    let len = data.len();
    [
        data[len - 3] ^ r[0],
        data[len - 2] ^ r[1],
        data[len - 1] ^ r[2],
    ]
}

/// True if the frame's CRC residue is all-zero. Used to validate
/// DF11/17/18 frames, whose ICAO is carried directly in bytes 1-3 rather
/// than recovered via XOR.
pub fn is_valid_explicit_icao_frame(data: &[u8]) -> bool {
    residue(data) == [0, 0, 0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::hex_decode;

    const VALID_FRAMES: &[&str] = &[
        "8D4840D6202CC371C32CE0576098",
        "8D40621D58C382D690C8AC2863A7",
        "8D485020994409940838175B284F",
    ];

    #[test]
    fn test_valid_df17_residue_zero() {
        for hex in VALID_FRAMES {
            let data = hex_decode(hex).unwrap();
            assert_eq!(
                residue(&data),
                [0, 0, 0],
                "residue should be 0 for valid DF17: {hex}"
            );
        }
    }

    #[test]
    fn test_is_valid_explicit_icao_frame() {
        for hex in VALID_FRAMES {
            let data = hex_decode(hex).unwrap();
            assert!(is_valid_explicit_icao_frame(&data));
        }
    }

    #[test]
    fn test_extract_icao_df17() {
        let data = hex_decode("8D4840D6202CC371C32CE0576098").unwrap();
        assert_eq!(&data[1..4], &[0x48, 0x40, 0xD6]);
    }

    #[test]
    fn test_corrupted_residue_nonzero() {
        let mut data = hex_decode(VALID_FRAMES[0]).unwrap();
        data[5] ^= 0x01;
        assert_ne!(residue(&data), [0, 0, 0]);
    }

    #[test]
    fn test_icao_from_crc_df4_scenario() {
        let data = hex_decode("20000294E7DC54").unwrap();
        assert_eq!(icao_from_crc(&data), [0x7C, 0x7F, 0x25]);
    }

    #[test]
    fn test_icao_from_crc_df5_scenario() {
        let data = hex_decode("2800 0A00 308D E4".replace(' ', "").as_str()).unwrap();
        assert_eq!(icao_from_crc(&data), [0x7C, 0x82, 0x2A]);
    }

    #[test]
    fn test_icao_from_crc_df0_scenario() {
        let data = hex_decode("0200081C5BBE71").unwrap();
        assert_eq!(icao_from_crc(&data), [0x7C, 0x80, 0x55]);
    }
}
