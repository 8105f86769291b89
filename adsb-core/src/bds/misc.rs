//! Registers this crate validates but does not fully decode (BDS 1,0 and
//! 1,7), and BDS 5,4 (next waypoint).

use crate::types::{AdsbError, Result};

/// BDS 1,0 — Data link capability report.
///
/// Only format-validated: the ICAO specification for this register covers a
/// large number of capability flags this crate has no downstream use for.
#[derive(Debug, Clone, Copy)]
pub struct DataLinkCapability;

/// Validate a BDS 1,0 data-link capability payload.
pub fn validate_bds10(mb: &[u8; 7]) -> Result<DataLinkCapability> {
    if mb[0] != 0b0001_0000 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 1,0 format byte is not 0x10".into(),
        ));
    }
    if mb[1] & 0b0111_1100 != 0 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 1,0 reserved bits not zero".into(),
        ));
    }
    Ok(DataLinkCapability)
}

/// BDS 1,7 — Common usage GICB capability report.
///
/// Only format-validated, for the same reason as BDS 1,0.
#[derive(Debug, Clone, Copy)]
pub struct CommonUsageGicbCapability;

/// Validate a BDS 1,7 common-usage GICB capability payload.
pub fn validate_bds17(mb: &[u8; 7]) -> Result<CommonUsageGicbCapability> {
    if mb[0] & 0b0000_0010 != 0b0000_0010 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 1,7 format bit not set".into(),
        ));
    }
    if mb[3] & 0b0000_1111 != 0 || mb[4] != 0 || mb[5] != 0 || mb[6] != 0 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 1,7 reserved bits not zero".into(),
        ));
    }
    Ok(CommonUsageGicbCapability)
}

/// BDS 3,0 — ACAS active resolution advisory.
///
/// Only format-validated: this crate does not surface the individual RA
/// complement/terminate bits, only that the register is self-consistent.
#[derive(Debug, Clone, Copy)]
pub struct AcasResolutionAdvisory;

/// Validate a BDS 3,0 ACAS resolution advisory payload.
pub fn validate_bds30(mb: &[u8; 7]) -> Result<AcasResolutionAdvisory> {
    if mb[0] != 0b0011_0000 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 3,0 format byte is not 0x30".into(),
        ));
    }
    if (mb[3] & 0b0000_1100) >> 2 == 0b11 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 3,0 threat type reserved value 3".into(),
        ));
    }
    let acas_ra = ((mb[1] as u32 & 0b0000_0001) << 6) + ((mb[2] as u32 & 0b1111_1100) >> 2);
    if acas_ra >= 48 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 3,0 ACAS RA complement out of range".into(),
        ));
    }
    Ok(AcasResolutionAdvisory)
}

/// 6-bit waypoint-name character set used by BDS 5,4, shared with the
/// callsign charset.
const WAYPOINT_CHARSET: &[u8; 64] = crate::types::CALLSIGN_CHARSET;

/// BDS 5,4 — Next waypoint identification, estimated time of arrival,
/// estimated flight level, and time to go.
#[derive(Debug, Clone)]
pub struct NextWaypoint {
    pub waypoint: String,
    pub estimated_time_of_arrival_min: f64,
    pub estimated_flight_level_ft: i32,
    pub time_to_go_min: f64,
}

/// Decode a BDS 5,4 next-waypoint payload.
pub fn decode_bds54(mb: &[u8; 7]) -> Result<NextWaypoint> {
    if (mb[0] & 0b1000_0000) >> 7 == 1 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 5,4 status bit denotes invalid parameters".into(),
        ));
    }
    if mb[6] & 0b0000_0001 != 0 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 5,4 reserved bit not zero".into(),
        ));
    }

    let indexes = [
        ((mb[0] as usize & 0b0111_1110) >> 1),
        (((mb[0] as usize & 0b0000_0001) << 5) + ((mb[1] as usize & 0b1111_1000) >> 3)),
        (((mb[1] as usize & 0b0000_0111) << 3) + ((mb[2] as usize & 0b1110_0000) >> 5)),
        (((mb[2] as usize & 0b0001_1111) << 1) + ((mb[3] as usize & 0b1000_0000) >> 7)),
        ((mb[3] as usize & 0b0111_1110) >> 1),
    ];

    let mut waypoint = String::with_capacity(5);
    for idx in indexes {
        if idx >= WAYPOINT_CHARSET.len() {
            return Err(AdsbError::FieldOutOfRange(
                "BDS 5,4 waypoint character index out of range".into(),
            ));
        }
        waypoint.push(WAYPOINT_CHARSET[idx] as char);
    }
    let waypoint = waypoint.trim().to_string();
    if !crate::types::is_valid_charset_text(&waypoint) {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 5,4 waypoint contains invalid characters".into(),
        ));
    }

    let eta = (((mb[3] as u32 & 0b0000_0001) << 8) + mb[4] as u32) as f64 * (60.0 / 512.0);
    if !(0.0..=60.0).contains(&eta) {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 5,4 estimated time of arrival out of range (>60 mins)".into(),
        ));
    }

    let efl = ((mb[5] as i32 & 0b1111_1100) >> 2) * 10;
    let ttg = (((mb[5] as u32 & 0b0000_0011) << 7) + ((mb[6] as u32 & 0b1111_1110) >> 1)) as f64 * (60.0 / 512.0);

    Ok(NextWaypoint {
        waypoint,
        estimated_time_of_arrival_min: eta,
        estimated_flight_level_ft: efl,
        time_to_go_min: ttg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_bds10_requires_exact_format_byte() {
        let mb = [0x11u8, 0, 0, 0, 0, 0, 0];
        assert!(validate_bds10(&mb).is_err());
    }

    #[test]
    fn test_validate_bds10_rejects_reserved_bits() {
        let mb = [0x10u8, 0b0111_1100, 0, 0, 0, 0, 0];
        assert!(validate_bds10(&mb).is_err());
    }

    #[test]
    fn test_validate_bds17_requires_format_bit() {
        let mb = [0u8; 7];
        assert!(validate_bds17(&mb).is_err());
    }

    #[test]
    fn test_validate_bds30_rejects_reserved_threat_type() {
        let mut mb = [0u8; 7];
        mb[0] = 0x30;
        mb[3] = 0b0000_1100;
        assert!(validate_bds30(&mb).is_err());
    }

    #[test]
    fn test_bds54_rejects_invalid_status_bit() {
        let mb = [0b1000_0000u8, 0, 0, 0, 0, 0, 0];
        assert!(decode_bds54(&mb).is_err());
    }
}
