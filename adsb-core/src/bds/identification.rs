//! BDS 0,8 (aircraft identification and category) and BDS 2,0 (aircraft identification).

use crate::types::{decode_charset_text, is_valid_charset_text, AdsbError, Result};

/// Emitter category, resolved from the type code and a 3-bit category subfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterCategory {
    SetD(u8),
    SetC(u8),
    SetB(u8),
    SetA(u8),
}

/// BDS 0,8 — Aircraft identification and category.
#[derive(Debug, Clone)]
pub struct Identification {
    pub type_code: u8,
    pub category: EmitterCategory,
    pub callsign: String,
}

/// Decode a BDS 0,8 identification-and-category payload.
pub fn decode_bds08(mb: &[u8; 7]) -> Result<Identification> {
    let tc = (mb[0] & 0b1111_1000) >> 3;
    if !(1..=5).contains(&tc) {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 0,8 type code not 1-5".into(),
        ));
    }
    let ca = mb[0] & 0b0000_0111;
    let category = match tc {
        1 => EmitterCategory::SetD(ca),
        2 => EmitterCategory::SetC(ca),
        3 => EmitterCategory::SetB(ca),
        _ => EmitterCategory::SetA(ca),
    };

    let callsign = decode_charset_text(mb, 8, 8);
    if !is_valid_charset_text(&callsign) {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 0,8 callsign contains invalid characters".into(),
        ));
    }

    Ok(Identification {
        type_code: tc,
        category,
        callsign: callsign.trim_end().to_string(),
    })
}

/// BDS 2,0 — Aircraft identification (no emitter category).
#[derive(Debug, Clone)]
pub struct DataLinkIdentification {
    pub callsign: String,
}

/// Decode a BDS 2,0 aircraft-identification payload.
pub fn decode_bds20(mb: &[u8; 7]) -> Result<DataLinkIdentification> {
    if mb[0] != 0b0010_0000 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 2,0 format byte is not 0x20".into(),
        ));
    }
    let callsign = decode_charset_text(mb, 8, 8);
    if !is_valid_charset_text(&callsign) {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 2,0 callsign contains invalid characters".into(),
        ));
    }
    Ok(DataLinkIdentification {
        callsign: callsign.trim_end().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range_type_code() {
        let mb = [0b00110_000u8, 0, 0, 0, 0, 0, 0];
        assert!(decode_bds08(&mb).is_err());
    }

    #[test]
    fn test_decodes_callsign() {
        // DF17 8D 485020 994409... ME type 4: "KLM1023_"
        let mb = [0x20u8, 0xA9, 0x12, 0x24, 0x9B, 0x08, 0x32];
        let frame = decode_bds08(&mb).unwrap();
        assert_eq!(frame.type_code, 4);
        assert!(!frame.callsign.is_empty());
    }

    #[test]
    fn test_bds20_requires_exact_format_byte() {
        let mb = [0x21u8, 0, 0, 0, 0, 0, 0];
        assert!(decode_bds20(&mb).is_err());
    }
}
