//! BDS 0,9 — Airborne velocity, type code 19.

use crate::types::{AdsbError, Result};

/// Which velocity representation a BDS 0,9 payload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VelocitySubtype {
    GroundSpeedSubsonic,
    GroundSpeedSupersonic,
    AirspeedSubsonic,
    AirspeedSupersonic,
}

/// Source of the vertical rate subfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalRateSource {
    GnssNavigationAccuracy,
    BarometricPressureAltitude,
}

#[derive(Debug, Clone)]
pub enum VelocityData {
    Ground {
        east_west_velocity: Option<i32>,
        north_south_velocity: Option<i32>,
        ground_speed_kt: Option<f64>,
        /// Degrees clockwise from true north, derived from the two signed components.
        track_angle_deg: Option<f64>,
    },
    Air {
        heading_available: bool,
        heading_deg: Option<f64>,
        airspeed_kt: Option<u32>,
        airspeed_is_true: bool,
    },
}

/// BDS 0,9 — Airborne velocity.
#[derive(Debug, Clone)]
pub struct AirborneVelocity {
    pub subtype: VelocitySubtype,
    pub intent_change: bool,
    pub ifr_capability: bool,
    pub navigation_uncertainty_category: u8,
    pub data: VelocityData,
    pub vertical_rate_source: VerticalRateSource,
    pub vertical_rate_fpm: Option<i32>,
    pub gnss_baro_altitude_diff_ft: Option<i32>,
}

/// Decode a BDS 0,9 airborne velocity payload.
pub fn decode_bds09(mb: &[u8; 7]) -> Result<AirborneVelocity> {
    let tc = (mb[0] & 0b1111_1000) >> 3;
    if tc != 19 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 0,9 type code is not 19".into(),
        ));
    }
    let st = mb[0] & 0b0000_0111;

    let intent_change = (mb[1] & 0b1000_0000) >> 7 == 1;
    let ifr_capability = (mb[1] & 0b0010_0000) >> 5 == 1;
    let navigation_uncertainty_category = (mb[1] & 0b0001_1100) >> 2;

    let data = match st {
        1 | 2 => {
            let scale = if st == 2 { 4.0 } else { 1.0 };
            let dew = (mb[1] & 0b0000_0100) >> 2;
            let vew = (((mb[1] & 0b0000_0011) as u32) << 8) + mb[2] as u32;
            let dns = (mb[3] & 0b1000_0000) >> 7;
            let vns = (((mb[3] & 0b0111_1111) as u32) << 3) + ((mb[4] & 0b1110_0000) >> 5) as u32;

            let (ew_vel, ns_vel) = {
                let ew = if vew == 0 {
                    None
                } else {
                    let raw = (vew - 1) as f64 * scale;
                    Some(if dew != 0 { -raw } else { raw } as i32)
                };
                let ns = if vns == 0 {
                    None
                } else {
                    let raw = (vns - 1) as f64 * scale;
                    Some(if dns != 0 { -raw } else { raw } as i32)
                };
                (ew, ns)
            };

            let ground_speed_kt = match (ew_vel, ns_vel) {
                (Some(ew), Some(ns)) => {
                    Some(((ew * ew + ns * ns) as f64).sqrt())
                }
                _ => None,
            };
            let track_angle_deg = match (ew_vel, ns_vel) {
                (Some(ew), Some(ns)) => {
                    let angle = (ew as f64).atan2(ns as f64).to_degrees();
                    Some(if angle < 0.0 { angle + 360.0 } else { angle })
                }
                _ => None,
            };

            VelocityData::Ground {
                east_west_velocity: ew_vel,
                north_south_velocity: ns_vel,
                ground_speed_kt,
                track_angle_deg,
            }
        }
        3 | 4 => {
            let heading_available = (mb[1] & 0b0000_0100) >> 2 == 1;
            let hdg_raw = (((mb[1] & 0b0000_0011) as u32) << 8) + mb[2] as u32;
            let heading_deg = if heading_available {
                Some(hdg_raw as f64 * 360.0 / 1024.0)
            } else {
                None
            };
            let airspeed_is_true = (mb[3] & 0b1000_0000) >> 7 == 1;
            let as_raw = (((mb[3] & 0b0111_1111) as u32) << 3) + ((mb[4] & 0b1110_0000) >> 5) as u32;
            let scale = if st == 4 { 4.0 } else { 1.0 };
            let airspeed_kt = if as_raw == 0 {
                None
            } else {
                Some(((as_raw - 1) as f64 * scale) as u32)
            };

            VelocityData::Air {
                heading_available,
                heading_deg,
                airspeed_kt,
                airspeed_is_true,
            }
        }
        other => {
            return Err(AdsbError::FieldOutOfRange(format!(
                "BDS 0,9 reserved subtype {other}"
            )))
        }
    };

    let vertical_rate_source = if (mb[4] & 0b0001_0000) >> 4 == 0 {
        VerticalRateSource::GnssNavigationAccuracy
    } else {
        VerticalRateSource::BarometricPressureAltitude
    };
    let vr_sign = (mb[4] & 0b0000_1000) >> 3;
    let vr_raw = (((mb[4] & 0b0000_0111) as u32) << 6) + ((mb[5] & 0b1111_1100) >> 2) as u32;
    let vertical_rate_fpm = if vr_raw == 0 {
        None
    } else {
        let raw = (vr_raw as i32 - 1) * 64;
        Some(if vr_sign != 0 { -raw } else { raw })
    };

    let diff_sign = (mb[6] & 0b1000_0000) >> 7;
    let diff_raw = mb[6] & 0b0111_1111;
    let gnss_baro_altitude_diff_ft = if diff_raw == 0 {
        None
    } else {
        let raw = (diff_raw as i32 - 1) * 25;
        Some(if diff_sign != 0 { -raw } else { raw })
    };

    Ok(AirborneVelocity {
        subtype: match st {
            1 => VelocitySubtype::GroundSpeedSubsonic,
            2 => VelocitySubtype::GroundSpeedSupersonic,
            3 => VelocitySubtype::AirspeedSubsonic,
            _ => VelocitySubtype::AirspeedSupersonic,
        },
        intent_change,
        ifr_capability,
        navigation_uncertainty_category,
        data,
        vertical_rate_source,
        vertical_rate_fpm,
        gnss_baro_altitude_diff_ft,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_type_code() {
        let mb = [0b00000_000u8, 0, 0, 0, 0, 0, 0];
        assert!(decode_bds09(&mb).is_err());
    }

    #[test]
    fn test_rejects_reserved_subtype() {
        let mb = [(19u8 << 3) | 0b101, 0, 0, 0, 0, 0, 0];
        assert!(decode_bds09(&mb).is_err());
    }

    #[test]
    fn test_ground_velocity_subsonic() {
        // TC 19, ST 1.
        let mb = [(19u8 << 3) | 1, 0b0_00_00011, 0b1000_0000, 0b0_0000101, 0b000_00000, 0, 0];
        let frame = decode_bds09(&mb).unwrap();
        match frame.data {
            VelocityData::Ground {
                east_west_velocity,
                north_south_velocity,
                ..
            } => {
                assert!(east_west_velocity.is_some());
                assert!(north_south_velocity.is_some());
            }
            _ => panic!("expected ground velocity data"),
        }
    }

    #[test]
    fn test_airspeed_subtype() {
        let mb = [(19u8 << 3) | 3, 0b0000_0100, 0b0000_0000, 0b0000_0000, 0, 0, 0];
        let frame = decode_bds09(&mb).unwrap();
        match frame.data {
            VelocityData::Air {
                heading_available, ..
            } => assert!(heading_available),
            _ => panic!("expected air velocity data"),
        }
    }
}
