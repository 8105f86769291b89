//! BDS 0,7 (aircraft operational status), 6,1 (aircraft status), 6,2 (target
//! state and status), and 6,5 (aircraft operational status — ELS/EHS form).

use super::{decode_emergency_state, EmergencyPriorityStatus};
use crate::types::{AdsbError, Result};

/// ADS-B version-0 capability/operational-mode nibbles, a plain pass-through
/// of the four 4-bit fields; version 0 never decomposes them further.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationalStatusVersion0 {
    pub cc4: u8,
    pub cc3: u8,
    pub cc2: u8,
    pub cc1: u8,
    pub om4: u8,
    pub om3: u8,
    pub om2: u8,
    pub om1: u8,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OperationalStatusVersion1 {
    pub airborne: bool,
    pub acas_operational_or_unknown: bool,
    pub cockpit_display_of_traffic_information: bool,
    pub air_referenced_velocity_report: bool,
    pub target_state_report: bool,
    pub acas_resolution_advisory_active: bool,
    pub ident_switch_active: bool,
    pub receiving_atc_services: bool,
    pub nic_supplement: u8,
    pub nacp: u8,
    pub sil: u8,
    pub horizontal_reference_direction: u8,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OperationalStatusVersion2 {
    pub airborne: bool,
    pub tcas_acas_operational: bool,
    pub extended_squitter_1090_receive: bool,
    pub air_referenced_velocity_report: bool,
    pub target_state_report: bool,
    pub universal_access_transceiver: bool,
    pub tcas_acas_resolution_advisory_active: bool,
    pub ident_switch_active: bool,
    pub single_antenna_flag: bool,
    pub nic_supplement_a: u8,
    pub nacp: u8,
    pub sil: u8,
    pub horizontal_reference_direction: u8,
    pub sil_supplement: u8,
}

#[derive(Debug, Clone)]
pub enum OperationalStatusData {
    Version0(OperationalStatusVersion0),
    Version1(OperationalStatusVersion1),
    Version2(OperationalStatusVersion2),
}

/// BDS 0,7 — Aircraft operational status, type code 31.
#[derive(Debug, Clone)]
pub struct OperationalStatus {
    pub subtype: u8,
    pub version: u8,
    pub data: OperationalStatusData,
}

fn infer_version(mb: &[u8; 7]) -> Result<u8> {
    let st = mb[0] & 0b0000_0111;
    let ver_bits = (mb[5] & 0b1110_0000) >> 5;

    if st == 0 && mb[5] == 0 && mb[6] == 0 {
        return Ok(0);
    }
    if ver_bits == 1 && mb[6] & 0b0000_0011 == 0 {
        return Ok(1);
    }
    if ver_bits == 2 && mb[6] & 0b0000_0001 == 0 {
        return Ok(2);
    }
    Err(AdsbError::FieldOutOfRange(
        "could not determine BDS 0,7 ADS-B version".into(),
    ))
}

/// Decode a BDS 0,7 aircraft-operational-status payload.
pub fn decode_bds07(mb: &[u8; 7]) -> Result<OperationalStatus> {
    let tc = (mb[0] & 0b1111_1000) >> 3;
    if tc != 31 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 0,7 type code is not 31".into(),
        ));
    }
    let subtype = mb[0] & 0b0000_0111;
    let version = infer_version(mb)?;

    let data = match version {
        0 => OperationalStatusData::Version0(OperationalStatusVersion0 {
            cc4: (mb[1] & 0b1111_0000) >> 4,
            cc3: mb[1] & 0b0000_1111,
            cc2: (mb[2] & 0b1111_0000) >> 4,
            cc1: mb[2] & 0b0000_1111,
            om4: (mb[3] & 0b1111_0000) >> 4,
            om3: mb[3] & 0b0000_1111,
            om2: (mb[4] & 0b1111_0000) >> 4,
            om1: mb[4] & 0b0000_1111,
        }),
        1 => {
            let airborne = subtype == 0;
            let mut v1 = OperationalStatusVersion1 {
                airborne,
                nic_supplement: (mb[5] & 0b0001_0000) >> 4,
                nacp: mb[5] & 0b0000_1111,
                sil: (mb[6] & 0b0011_0000) >> 4,
                horizontal_reference_direction: (mb[6] & 0b0000_0100) >> 2,
                ..Default::default()
            };
            if airborne {
                v1.acas_operational_or_unknown = (mb[1] & 0b0010_0000) >> 5 == 0;
                v1.cockpit_display_of_traffic_information = (mb[1] & 0b0001_0000) >> 4 == 1;
                v1.air_referenced_velocity_report = (mb[1] & 0b0000_0010) >> 1 == 1;
                v1.target_state_report = mb[1] & 0b0000_0001 == 1;
            } else {
                v1.cockpit_display_of_traffic_information = (mb[1] & 0b0001_0000) >> 4 == 1;
            }
            v1.acas_resolution_advisory_active = (mb[3] & 0b0010_0000) >> 5 == 1;
            v1.ident_switch_active = (mb[3] & 0b0001_0000) >> 4 == 1;
            v1.receiving_atc_services = (mb[3] & 0b0000_1000) >> 3 == 1;
            OperationalStatusData::Version1(v1)
        }
        _ => {
            let airborne = subtype == 0;
            let mut v2 = OperationalStatusVersion2 {
                airborne,
                nic_supplement_a: (mb[5] & 0b0001_0000) >> 4,
                nacp: mb[5] & 0b0000_1111,
                sil: (mb[6] & 0b0011_0000) >> 4,
                horizontal_reference_direction: (mb[6] & 0b0000_0100) >> 2,
                sil_supplement: (mb[6] & 0b0000_0010) >> 1,
                ..Default::default()
            };
            if airborne {
                v2.tcas_acas_operational = (mb[1] & 0b0010_0000) >> 5 == 1;
                v2.extended_squitter_1090_receive = (mb[1] & 0b0001_0000) >> 4 == 1;
                v2.air_referenced_velocity_report = (mb[1] & 0b0000_0010) >> 1 == 1;
                v2.target_state_report = mb[1] & 0b0000_0001 == 1;
                v2.universal_access_transceiver = (mb[2] & 0b0010_0000) >> 5 == 1;
                v2.tcas_acas_resolution_advisory_active = (mb[3] & 0b0010_0000) >> 5 == 1;
                v2.ident_switch_active = (mb[3] & 0b0001_0000) >> 4 == 1;
            } else {
                v2.extended_squitter_1090_receive = (mb[1] & 0b0001_0000) >> 4 == 1;
                v2.universal_access_transceiver = mb[1] & 0b0000_0001 == 1;
            }
            OperationalStatusData::Version2(v2)
        }
    };

    Ok(OperationalStatus {
        subtype,
        version,
        data,
    })
}

/// BDS 6,1 — Aircraft status, subtype 1 (emergency/priority status).
#[derive(Debug, Clone)]
pub struct AircraftStatus {
    pub subtype: u8,
    pub emergency_priority_status: Option<EmergencyPriorityStatus>,
}

/// Decode a BDS 6,1 aircraft-status payload.
pub fn decode_bds61(mb: &[u8; 7]) -> Result<AircraftStatus> {
    let tc = (mb[0] & 0b1111_1000) >> 3;
    if tc != 28 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 6,1 type code is not 28".into(),
        ));
    }
    let subtype = mb[0] & 0b0000_0111;
    let emergency_priority_status = if subtype == 1 {
        Some(decode_emergency_state(((mb[1] & 0b1110_0000) >> 5) as u32)?)
    } else {
        None
    };
    Ok(AircraftStatus {
        subtype,
        emergency_priority_status,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalTargetState {
    Unavailable,
    AutopilotSelectedValue,
    HoldingAltitude,
    FmsRnavSystem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalTargetState {
    Unavailable,
    AutopilotSelectedValue,
    MaintainingHeading,
    FmsRnavSystem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeIndicator {
    Unknown,
    Acquiring,
    CapturingOrMaintaining,
}

/// BDS 6,2 — Target state and status, type code 29, subtype 0.
#[derive(Debug, Clone)]
pub struct TargetStateAndStatus {
    pub vertical_data_available: bool,
    pub target_altitude_type: u8,
    pub target_altitude_capability: u8,
    pub vertical_mode_indicator: ModeIndicator,
    pub target_altitude_ft: i32,
    pub horizontal_data_available: bool,
    pub target_heading_track_angle_deg: f64,
    pub heading_is_track_angle: bool,
    pub horizontal_mode_indicator: ModeIndicator,
    pub nacp: u8,
    pub nic_baro_cross_checked: bool,
    pub sil: u8,
    pub capability_mode_codes_operational: bool,
    pub capability_mode_codes_resolution_advisory_active: bool,
    pub emergency_priority_status: EmergencyPriorityStatus,
}

fn mode_indicator(bits: u8) -> ModeIndicator {
    match bits {
        0 => ModeIndicator::Unknown,
        1 => ModeIndicator::Acquiring,
        _ => ModeIndicator::CapturingOrMaintaining,
    }
}

/// Decode a BDS 6,2 target-state-and-status payload.
pub fn decode_bds62(mb: &[u8; 7]) -> Result<TargetStateAndStatus> {
    let tc = (mb[0] & 0b1111_1000) >> 3;
    if tc != 29 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 6,2 type code is not 29".into(),
        ));
    }
    let subtype = (mb[0] & 0b0000_0110) >> 1;
    if subtype != 0 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 6,2 subtype is not 0".into(),
        ));
    }
    if mb[1] & 0b0010_0000 != 0 || mb[5] & 0b0000_0011 != 0 || mb[6] & 0b1110_0000 != 0 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 6,2 reserved bits not zero".into(),
        ));
    }

    let vertical_data_available = ((mb[0] as u32 & 0b0000_0001) << 1) + ((mb[0] as u32 & 0b1000_0000) >> 7) != 0;
    let target_altitude_type = (mb[1] & 0b0100_0000) >> 6;
    let target_altitude_capability = (mb[1] & 0b0001_1000) >> 3;
    if target_altitude_capability == 2 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 6,2 reserved target altitude capability value".into(),
        ));
    }
    let vmi_bits = (mb[1] & 0b0000_0110) >> 1;
    let vertical_mode_indicator = mode_indicator(vmi_bits);

    let target_altitude_ft = -1000
        + 100 * (((mb[1] as i32 & 0b0000_0001) << 9) + ((mb[2] as i32) << 1) + ((mb[3] as i32 & 0b1000_0000) >> 7));

    let horizontal_data_available = (mb[3] & 0b0110_0000) >> 5 != 0;
    let thta = ((mb[3] as u32 & 0b0001_1111) << 4) + ((mb[4] as u32 & 0b1111_0000) >> 4);
    let thta = thta as f64;
    if thta >= 360.0 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 6,2 target heading/track angle out of range".into(),
        ));
    }
    let heading_is_track_angle = (mb[4] & 0b0000_1000) >> 3 == 1;
    let hmi_bits = (mb[4] & 0b0000_0110) >> 1;
    let horizontal_mode_indicator = mode_indicator(hmi_bits);

    let nacp = ((mb[4] as u32 & 0b0000_0001) << 3) + ((mb[5] as u32 & 0b1110_0000) >> 5) as u32;
    if nacp > 11 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 6,2 NACp out of range [0,11]".into(),
        ));
    }
    let nic_baro_cross_checked = (mb[5] & 0b0001_0000) >> 4 == 1;
    let sil = (mb[5] & 0b0000_1100) >> 2;
    let capability_mode_codes_operational = (mb[6] & 0b0001_0000) >> 4 == 1;
    let capability_mode_codes_resolution_advisory_active = (mb[6] & 0b0000_1000) >> 3 == 1;
    let emergency_priority_status = decode_emergency_state((mb[6] & 0b0000_0111) as u32)?;

    Ok(TargetStateAndStatus {
        vertical_data_available,
        target_altitude_type,
        target_altitude_capability,
        vertical_mode_indicator,
        target_altitude_ft,
        horizontal_data_available,
        target_heading_track_angle_deg: thta,
        heading_is_track_angle,
        horizontal_mode_indicator,
        nacp: nacp as u8,
        nic_baro_cross_checked,
        sil,
        capability_mode_codes_operational,
        capability_mode_codes_resolution_advisory_active,
        emergency_priority_status,
    })
}

/// BDS 6,5 — Aircraft operational status (ELS/EHS form), type code 31, subtype 0.
#[derive(Debug, Clone)]
pub struct CapabilityAndOperationalMode {
    pub enroute_capability_class: u8,
    pub terminal_capability_class: u8,
    pub approach_landing_capability_class: u8,
    pub surface_capability_class: u8,
    pub enroute_operational_mode: u8,
    pub terminal_operational_mode: u8,
    pub approach_landing_operational_mode: u8,
    pub surface_operational_mode: u8,
}

/// Decode a BDS 6,5 capability-class/operational-mode payload.
pub fn decode_bds65(mb: &[u8; 7]) -> Result<CapabilityAndOperationalMode> {
    let tc = (mb[0] & 0b1111_1000) >> 3;
    if tc != 31 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 6,5 type code is not 31".into(),
        ));
    }
    if mb[0] & 0b0000_0111 != 0 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 6,5 subtype is not 0".into(),
        ));
    }
    if mb[5] != 0 || mb[6] != 0 {
        return Err(AdsbError::FieldOutOfRange(
            "BDS 6,5 reserved bytes not zero".into(),
        ));
    }

    Ok(CapabilityAndOperationalMode {
        enroute_capability_class: mb[1] & 0b0000_1111,
        terminal_capability_class: (mb[1] & 0b1111_0000) >> 4,
        approach_landing_capability_class: mb[2] & 0b0000_1111,
        surface_capability_class: (mb[2] & 0b1111_0000) >> 4,
        enroute_operational_mode: mb[3] & 0b0000_1111,
        terminal_operational_mode: (mb[3] & 0b1111_0000) >> 4,
        approach_landing_operational_mode: mb[4] & 0b0000_1111,
        surface_operational_mode: (mb[4] & 0b1111_0000) >> 4,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bds07_version0_reserved_bytes_zero() {
        let mut mb = [0u8; 7];
        mb[0] = 31 << 3;
        let frame = decode_bds07(&mb).unwrap();
        assert_eq!(frame.version, 0);
    }

    #[test]
    fn test_bds07_rejects_bad_type_code() {
        let mb = [0u8; 7];
        assert!(decode_bds07(&mb).is_err());
    }

    #[test]
    fn test_bds61_subtype_gates_eps() {
        let mut mb = [0u8; 7];
        mb[0] = 28 << 3; // subtype 0
        let frame = decode_bds61(&mb).unwrap();
        assert!(frame.emergency_priority_status.is_none());
    }

    #[test]
    fn test_bds61_rejects_wrong_type_code() {
        let mb = [0u8; 7];
        assert!(decode_bds61(&mb).is_err());
    }

    #[test]
    fn test_bds65_requires_reserved_bytes_zero() {
        let mut mb = [0u8; 7];
        mb[0] = 31 << 3;
        mb[5] = 1;
        assert!(decode_bds65(&mb).is_err());
    }

    #[test]
    fn test_bds62_rejects_reserved_tac() {
        let mut mb = [0u8; 7];
        mb[0] = 29 << 3;
        mb[1] = 0b0001_0000; // tac = 2, reserved
        assert!(decode_bds62(&mb).is_err());
    }
}
