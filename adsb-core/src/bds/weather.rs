//! BDS 4,4 (meteorological routine air report) and BDS 4,5 (meteorological
//! hazard report).

use crate::types::{AdsbError, Result};

/// BDS 4,4 — Meteorological routine air report.
#[derive(Debug, Clone, Default)]
pub struct MeteorologicalRoutineReport {
    /// 0-15, how many of the other fields were independently cross-checked.
    pub figure_of_merit: u8,
    pub wind_speed_kt: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub static_air_temperature_c: Option<f64>,
}

/// Decode a BDS 4,4 meteorological routine air report.
pub fn decode_bds44(mb: &[u8; 7]) -> Result<MeteorologicalRoutineReport> {
    let figure_of_merit = (mb[0] & 0b1111_0000) >> 4;

    let (wind_speed_kt, wind_direction_deg) = if mb[0] & 0b0000_1000 == 0 {
        (None, None)
    } else {
        let speed = (((mb[0] as u32 & 0b0000_0111) << 6) + ((mb[1] as u32 & 0b1111_1100) >> 2)) as f64;
        if !(0.0..=511.0).contains(&speed) {
            return Err(AdsbError::FieldOutOfRange(
                "wind speed out of range [0,511]".into(),
            ));
        }
        let direction =
            (((mb[1] as u32 & 0b0000_0011) << 7) + ((mb[2] as u32 & 0b1111_1110) >> 1)) as f64 * (180.0 / 256.0);
        if !(0.0..=360.0).contains(&direction) {
            return Err(AdsbError::FieldOutOfRange(
                "wind direction out of range [0,360]".into(),
            ));
        }
        (Some(speed), Some(direction))
    };

    let sign = mb[2] & 0b0000_0001;
    let raw = ((mb[3] as i32) << 2) + ((mb[4] as i32 & 0b1100_0000) >> 6);
    let mut sat = (raw as f64 - 1024.0) * 0.25;
    if sign != 1 {
        sat = -sat;
    }
    if !(-80.0..=60.0).contains(&sat) {
        return Err(AdsbError::FieldOutOfRange(
            "static air temperature out of range [-80,60]".into(),
        ));
    }

    Ok(MeteorologicalRoutineReport {
        figure_of_merit,
        wind_speed_kt,
        wind_direction_deg,
        static_air_temperature_c: Some(sat),
    })
}

/// BDS 4,5 — Meteorological hazard report.
///
/// The turbulence subfield is an exception to how every other subfield in
/// this register behaves: when the status bit is clear, the magnitude is
/// still decoded and returned, alongside a `status_valid: false` flag,
/// rather than withheld entirely.
#[derive(Debug, Clone, Default)]
pub struct MeteorologicalHazardReport {
    pub turbulence: u8,
    pub turbulence_status_valid: bool,
    pub wind_shear: Option<u8>,
    pub microburst_status_valid: bool,
    pub icing: Option<u8>,
    pub wake_vortex: Option<u8>,
    pub static_air_temperature_c: Option<f64>,
    pub average_static_pressure_status_valid: bool,
    pub radio_height_status_valid: bool,
}

/// Decode a BDS 4,5 meteorological hazard report.
pub fn decode_bds45(mb: &[u8; 7]) -> Result<MeteorologicalHazardReport> {
    let turbulence_status_valid = (mb[0] & 0b1000_0000) >> 7 == 1;
    let turbulence = (mb[0] & 0b0110_0000) >> 5;

    let wind_shear = if (mb[0] & 0b0001_0000) >> 4 == 0 {
        None
    } else {
        Some((mb[0] & 0b0000_1100) >> 2)
    };

    let microburst_status_valid = (mb[0] & 0b0000_0010) >> 1 == 1;

    let icing = if (mb[1] & 0b0100_0000) >> 6 == 0 {
        None
    } else {
        Some((mb[1] & 0b0011_0000) >> 4)
    };

    let wake_vortex = if (mb[1] & 0b0000_1000) >> 3 == 0 {
        None
    } else {
        Some((mb[1] & 0b0000_0110) >> 1)
    };

    let static_air_temperature_c = if mb[1] & 0b0000_0001 == 0 {
        None
    } else {
        let sign = (mb[2] & 0b1000_0000) >> 7;
        let raw = ((mb[2] as i32 & 0b0111_1111) << 2) + ((mb[3] as i32 & 0b1100_0000) >> 6);
        let mut sat = (raw as f64 - 512.0) * 0.25;
        if sign != 1 {
            sat = -sat;
        }
        Some(sat)
    };

    let average_static_pressure_status_valid = (mb[3] & 0b0010_0000) >> 5 == 1;
    let radio_height_status_valid = (mb[4] & 0b0000_0010) >> 1 == 1;

    Ok(MeteorologicalHazardReport {
        turbulence,
        turbulence_status_valid,
        wind_shear,
        microburst_status_valid,
        icing,
        wake_vortex,
        static_air_temperature_c,
        average_static_pressure_status_valid,
        radio_height_status_valid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bds44_figure_of_merit_extraction() {
        let mut mb = [0u8; 7];
        mb[0] = 0b0101_0000;
        mb[2] = 0b0000_0001;
        mb[3] = 0xFF;
        mb[4] = 0b1100_0000; // raw=1023 -> sat = -0.25C, within range
        let frame = decode_bds44(&mb).unwrap();
        assert_eq!(frame.figure_of_merit, 5);
    }

    #[test]
    fn test_bds44_no_wind_data() {
        let mut mb = [0u8; 7];
        mb[2] = 0b0000_0001;
        mb[3] = 0xFF;
        mb[4] = 0b1100_0000;
        let frame = decode_bds44(&mb).unwrap();
        assert!(frame.wind_speed_kt.is_none());
        assert!(frame.wind_direction_deg.is_none());
    }

    #[test]
    fn test_bds45_turbulence_computed_even_when_invalid() {
        let mut mb = [0u8; 7];
        mb[0] = 0b0100_0000; // status clear, magnitude bits = 0b10 = 2
        let frame = decode_bds45(&mb).unwrap();
        assert!(!frame.turbulence_status_valid);
        assert_eq!(frame.turbulence, 2);
    }

    #[test]
    fn test_bds45_wind_shear_withheld_when_invalid() {
        let mb = [0u8; 7];
        let frame = decode_bds45(&mb).unwrap();
        assert!(frame.wind_shear.is_none());
    }
}
