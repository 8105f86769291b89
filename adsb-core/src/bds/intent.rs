//! BDS 4,0 (selected vertical intention), 5,0 (track and turn report), and
//! 6,0 (heading and speed report) — all Comm-B-only registers, each subfield
//! independently status-gated.

use crate::types::{AdsbError, Result};

/// MCP/FCU autopilot mode flags, part of BDS 4,0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McpFcuMode {
    pub vnav: bool,
    pub alt_hold: bool,
    pub approach: bool,
}

/// BDS 4,0 — Selected vertical intention.
#[derive(Debug, Clone, Default)]
pub struct SelectedVerticalIntention {
    pub mcp_fcu_selected_altitude_ft: Option<i32>,
    pub fms_selected_altitude_ft: Option<i32>,
    pub barometric_pressure_setting_hpa: Option<f64>,
    pub mcp_fcu_mode: Option<McpFcuMode>,
    pub target_altitude_source: Option<u8>,
}

/// Decode a BDS 4,0 selected-vertical-intention payload.
///
/// The MCP/FCU altitude is scaled to feet (raw units of 16 ft); the FMS
/// altitude is carried through unscaled.
pub fn decode_bds40(mb: &[u8; 7]) -> Result<SelectedVerticalIntention> {
    let mut frame = SelectedVerticalIntention::default();

    if (mb[0] & 0b1000_0000) >> 7 == 1 {
        let raw = ((mb[0] as u32 & 0b0111_1111) << 5) + ((mb[1] as u32 & 0b1111_1000) >> 3);
        frame.mcp_fcu_selected_altitude_ft = Some(raw as i32 * 16);
    }

    if (mb[1] & 0b0000_0100) >> 2 == 1 {
        let raw =
            ((mb[1] as u32 & 0b0000_0011) << 10) + ((mb[2] as u32) << 2) + ((mb[3] as u32 & 0b1100_0000) >> 6);
        frame.fms_selected_altitude_ft = Some(raw as i32 * 16);
    }

    if (mb[3] & 0b0010_0000) >> 5 == 1 {
        let raw = ((mb[3] as u32 & 0b0001_1111) << 7) + ((mb[4] as u32 & 0b1111_1110) >> 1);
        frame.barometric_pressure_setting_hpa = Some(raw as f64 * 0.1 + 800.0);
    }

    if mb[5] & 0b0000_0001 == 1 {
        frame.mcp_fcu_mode = Some(McpFcuMode {
            vnav: (mb[6] & 0b1000_0000) >> 7 == 1,
            alt_hold: (mb[6] & 0b0100_0000) >> 6 == 1,
            approach: (mb[6] & 0b0010_0000) >> 5 == 1,
        });
    }

    if (mb[6] & 0b0000_0100) >> 2 == 1 {
        frame.target_altitude_source = Some(mb[6] & 0b0000_0011);
    }

    Ok(frame)
}

/// BDS 5,0 — Track and turn report.
#[derive(Debug, Clone, Default)]
pub struct TrackAndTurn {
    pub roll_angle_deg: Option<f64>,
    pub true_track_angle_deg: Option<f64>,
    pub ground_speed_kt: Option<f64>,
    pub track_angle_rate_deg_s: Option<f64>,
    pub true_airspeed_kt: Option<f64>,
}

/// Decode a BDS 5,0 track-and-turn payload.
pub fn decode_bds50(mb: &[u8; 7]) -> Result<TrackAndTurn> {
    let mut frame = TrackAndTurn::default();

    if (mb[0] & 0b1000_0000) >> 7 == 1 {
        let sign = (mb[0] & 0b0100_0000) >> 6;
        let raw = ((mb[0] as i32 & 0b0011_1111) << 3) + ((mb[1] as i32 & 0b1110_0000) >> 5);
        let mut roll = (raw as f64 - 512.0) * (45.0 / 256.0);
        if sign == 0 {
            roll += 90.0;
        }
        if !(-90.0..=90.0).contains(&roll) {
            return Err(AdsbError::FieldOutOfRange(
                "roll angle out of range [-90,+90] degrees".into(),
            ));
        }
        frame.roll_angle_deg = Some(roll);
    }

    if (mb[1] & 0b0001_0000) >> 4 == 1 {
        let sign = (mb[1] & 0b0000_1000) >> 3;
        let raw = ((mb[1] as u32 & 0b0000_0111) << 7) + ((mb[2] as u32 & 0b1111_1110) >> 1);
        let mut angle = raw as f64 * (90.0 / 512.0);
        if sign != 0 {
            angle += 180.0;
        }
        frame.true_track_angle_deg = Some(angle);
    }

    if mb[2] & 0b0000_0001 == 1 {
        let raw = ((mb[3] as u32) << 2) + ((mb[4] as u32 & 0b1100_0000) >> 6);
        let gs = raw as f64 * 2.0;
        if !(0.0..=2046.0).contains(&gs) {
            return Err(AdsbError::FieldOutOfRange(
                "true ground speed out of range [0,2046]".into(),
            ));
        }
        frame.ground_speed_kt = Some(gs);
    }

    if (mb[4] & 0b0010_0000) >> 5 == 1 {
        let sign = (mb[6] & 0b0001_0000) >> 4;
        let raw = ((mb[4] as i32 & 0b0000_1111) << 5) + ((mb[5] as i32 & 0b1111_1000) >> 3);
        let mut rate = raw as f64 * (8.0 / 256.0);
        if sign != 0 {
            rate = -rate;
        }
        frame.track_angle_rate_deg_s = Some(rate);
    }

    if (mb[5] & 0b0000_0100) >> 2 == 1 {
        let raw = ((mb[5] as u32 & 0b0000_0011) << 8) + mb[6] as u32;
        let tas = raw as f64 * 2.0;
        if !(0.0..=2046.0).contains(&tas) {
            return Err(AdsbError::FieldOutOfRange(
                "true airspeed out of range [0,2046]".into(),
            ));
        }
        frame.true_airspeed_kt = Some(tas);
    }

    Ok(frame)
}

/// BDS 6,0 — Heading and speed report.
#[derive(Debug, Clone, Default)]
pub struct HeadingAndSpeed {
    pub magnetic_heading_deg: Option<f64>,
    pub indicated_airspeed_kt: Option<u32>,
    pub mach_number: Option<f64>,
    pub barometric_altitude_rate_fpm: Option<f64>,
    pub gnss_altitude_rate_fpm: Option<f64>,
}

/// Decode a BDS 6,0 heading-and-speed payload.
pub fn decode_bds60(mb: &[u8; 7]) -> Result<HeadingAndSpeed> {
    let mut frame = HeadingAndSpeed::default();

    if (mb[0] & 0b1000_0000) >> 7 == 1 {
        let sign = (mb[0] & 0b1000_0000) >> 7;
        let raw = ((mb[0] as u32 & 0b0011_1111) << 4) + ((mb[1] as u32 & 0b1111_0000) >> 4);
        let mut hdg = raw as f64 * (90.0 / 512.0);
        if sign != 0 {
            hdg += 180.0;
        }
        frame.magnetic_heading_deg = Some(hdg);
    }

    if (mb[1] & 0b0000_1000) >> 3 == 1 {
        let ias = ((mb[1] as u32 & 0b0000_0111) << 7) + ((mb[2] as u32 & 0b1111_1110) >> 1);
        if ias > 1023 {
            return Err(AdsbError::FieldOutOfRange(
                "indicated airspeed out of range [0,1023]".into(),
            ));
        }
        frame.indicated_airspeed_kt = Some(ias);
    }

    if mb[2] & 0b0000_0001 == 1 {
        let raw = ((mb[3] as u32) << 2) + ((mb[4] as u32 & 0b1100_0000) >> 6);
        let mach = raw as f64 * 0.004;
        if !(0.0..=4.092).contains(&mach) {
            return Err(AdsbError::FieldOutOfRange(
                "Mach number out of range [0,4.092]".into(),
            ));
        }
        frame.mach_number = Some(mach);
    }

    if (mb[4] & 0b0010_0000) >> 5 == 1 {
        let sign = (mb[4] & 0b0001_0000) >> 4;
        let raw = ((mb[4] as i32 & 0b0000_1111) << 5) + ((mb[5] as i32 & 0b1111_1000) >> 3);
        let mut rate = (raw as f64 - 512.0) * 32.0;
        if sign != 1 {
            rate = -rate;
        }
        if !(-16384.0..=16352.0).contains(&rate) {
            return Err(AdsbError::FieldOutOfRange(
                "barometric altitude rate out of range [-16384,16352]".into(),
            ));
        }
        frame.barometric_altitude_rate_fpm = Some(rate);
    }

    if (mb[5] & 0b0000_0100) >> 2 == 1 {
        let sign = (mb[5] & 0b0000_0010) >> 1;
        let raw = ((mb[5] as i32 & 0b0000_0001) << 8) + mb[6] as i32;
        let mut ivv = (raw as f64 - 512.0) * 32.0;
        if sign != 1 {
            ivv = -ivv;
        }
        if !(-16384.0..=16352.0).contains(&ivv) {
            return Err(AdsbError::FieldOutOfRange(
                "GNSS altitude rate out of range [-16384,16352]".into(),
            ));
        }
        frame.gnss_altitude_rate_fpm = Some(ivv);
    }

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bds40_all_statuses_clear() {
        let mb = [0u8; 7];
        let frame = decode_bds40(&mb).unwrap();
        assert!(frame.mcp_fcu_selected_altitude_ft.is_none());
        assert!(frame.fms_selected_altitude_ft.is_none());
    }

    #[test]
    fn test_bds40_mcp_altitude_scaled() {
        let mut mb = [0u8; 7];
        mb[0] = 0b1000_0001; // status bit + low bits of value
        let frame = decode_bds40(&mb).unwrap();
        assert_eq!(frame.mcp_fcu_selected_altitude_ft, Some(32 * 16));
    }

    #[test]
    fn test_bds50_roll_angle_within_range() {
        let mut mb = [0u8; 7];
        mb[0] = 0b1000_0000; // status set, sign=0, magnitude bits zero -> roll = 0 deg
        let frame = decode_bds50(&mb).unwrap();
        assert_eq!(frame.roll_angle_deg, Some(0.0));
    }

    #[test]
    fn test_bds50_no_data_present() {
        let mb = [0u8; 7];
        let frame = decode_bds50(&mb).unwrap();
        assert!(frame.roll_angle_deg.is_none());
        assert!(frame.ground_speed_kt.is_none());
    }

    #[test]
    fn test_bds60_ias_range_check() {
        let mut mb = [0u8; 7];
        mb[1] = 0b0000_1000;
        let frame = decode_bds60(&mb).unwrap();
        assert_eq!(frame.indicated_airspeed_kt, Some(0));
    }

    #[test]
    fn test_bds60_no_subfields_present() {
        let mb = [0u8; 7];
        let frame = decode_bds60(&mb).unwrap();
        assert!(frame.magnetic_heading_deg.is_none());
        assert!(frame.mach_number.is_none());
    }
}
