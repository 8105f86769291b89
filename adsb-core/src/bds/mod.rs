//! Comm-B Data Selector (BDS) register decoders and inference.
//!
//! Each register is decoded by its own function from a 7-byte Comm-B (`MB`)
//! or extended-squitter (`ME`) payload. The wire format never carries which
//! register a payload holds for ELS/EHS Comm-B replies (DF20/21); see
//! [`inference::infer_bds`] for how the register is guessed from field
//! consistency. For extended squitter (DF17/18) the register follows
//! directly from the type code, also handled in `inference`.

pub mod identification;
pub mod inference;
pub mod intent;
pub mod misc;
pub mod position;
pub mod status;
pub mod velocity;
pub mod weather;

use crate::types::{AdsbError, Result};

/// The closed set of BDS registers this crate decodes or validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BdsCode {
    Bds05,
    Bds06,
    Bds07,
    Bds08,
    Bds09,
    Bds10,
    Bds17,
    Bds20,
    Bds30,
    Bds40,
    Bds44,
    Bds45,
    Bds50,
    Bds54,
    Bds60,
    Bds61,
    Bds62,
    Bds65,
}

/// Emergency / priority status, shared by BDS 6,1 and BDS 6,2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmergencyPriorityStatus {
    None,
    General,
    LifeguardMedical,
    MinimumFuel,
    NoCommunications,
    UnlawfulInterference,
    DownedAircraft,
}

/// A decoded BDS payload, tagged by register. One variant per register in
/// [`BdsCode`]; the register itself is resolved beforehand by
/// [`inference::infer_bds_extended_squitter`] or
/// [`inference::infer_bds_comm_b`] (or, for DF17/18, directly from the type
/// code — see [`decode_for_extended_squitter_type_code`]).
#[derive(Debug, Clone)]
pub enum DecodedBdsFrame {
    Bds05(position::AirbornePosition),
    Bds06(position::SurfacePosition),
    Bds07(status::OperationalStatus),
    Bds08(identification::Identification),
    Bds09(velocity::AirborneVelocity),
    Bds10(misc::DataLinkCapability),
    Bds17(misc::CommonUsageGicbCapability),
    Bds20(identification::DataLinkIdentification),
    Bds30(misc::AcasResolutionAdvisory),
    Bds40(intent::SelectedVerticalIntention),
    Bds44(weather::MeteorologicalRoutineReport),
    Bds45(weather::MeteorologicalHazardReport),
    Bds50(intent::TrackAndTurn),
    Bds54(misc::NextWaypoint),
    Bds60(intent::HeadingAndSpeed),
    Bds61(status::AircraftStatus),
    Bds62(status::TargetStateAndStatus),
    Bds65(status::CapabilityAndOperationalMode),
}

/// Decode a 7-byte payload against an already-resolved register.
///
/// Callers get `code` from [`inference::infer_bds_extended_squitter`] or
/// [`inference::infer_bds_comm_b`] first; this function does not re-infer.
pub fn decode(code: BdsCode, mb: &[u8; 7]) -> Result<DecodedBdsFrame> {
    Ok(match code {
        BdsCode::Bds05 => DecodedBdsFrame::Bds05(position::decode_bds05(mb)?),
        BdsCode::Bds06 => DecodedBdsFrame::Bds06(position::decode_bds06(mb)?),
        BdsCode::Bds07 => DecodedBdsFrame::Bds07(status::decode_bds07(mb)?),
        BdsCode::Bds08 => DecodedBdsFrame::Bds08(identification::decode_bds08(mb)?),
        BdsCode::Bds09 => DecodedBdsFrame::Bds09(velocity::decode_bds09(mb)?),
        BdsCode::Bds10 => DecodedBdsFrame::Bds10(misc::validate_bds10(mb)?),
        BdsCode::Bds17 => DecodedBdsFrame::Bds17(misc::validate_bds17(mb)?),
        BdsCode::Bds20 => DecodedBdsFrame::Bds20(identification::decode_bds20(mb)?),
        BdsCode::Bds30 => DecodedBdsFrame::Bds30(misc::validate_bds30(mb)?),
        BdsCode::Bds40 => DecodedBdsFrame::Bds40(intent::decode_bds40(mb)?),
        BdsCode::Bds44 => DecodedBdsFrame::Bds44(weather::decode_bds44(mb)?),
        BdsCode::Bds45 => DecodedBdsFrame::Bds45(weather::decode_bds45(mb)?),
        BdsCode::Bds50 => DecodedBdsFrame::Bds50(intent::decode_bds50(mb)?),
        BdsCode::Bds54 => DecodedBdsFrame::Bds54(misc::decode_bds54(mb)?),
        BdsCode::Bds60 => DecodedBdsFrame::Bds60(intent::decode_bds60(mb)?),
        BdsCode::Bds61 => DecodedBdsFrame::Bds61(status::decode_bds61(mb)?),
        BdsCode::Bds62 => DecodedBdsFrame::Bds62(status::decode_bds62(mb)?),
        BdsCode::Bds65 => DecodedBdsFrame::Bds65(status::decode_bds65(mb)?),
    })
}

/// Resolve and decode a DF17/18 extended-squitter `ME` field in one step.
pub fn decode_extended_squitter(me: &[u8; 7]) -> Result<DecodedBdsFrame> {
    let code = inference::infer_bds_extended_squitter(me)?;
    decode(code, me)
}

/// Resolve and decode a DF20/21 Comm-B `MB` field in one step.
pub fn decode_comm_b(mb: &[u8; 7]) -> Result<DecodedBdsFrame> {
    let code = inference::infer_bds_comm_b(mb)?;
    decode(code, mb)
}

/// Decode the 3-bit emergency/priority status subfield.
pub fn decode_emergency_state(code: u32) -> Result<EmergencyPriorityStatus> {
    match code {
        0 => Ok(EmergencyPriorityStatus::None),
        1 => Ok(EmergencyPriorityStatus::General),
        2 => Ok(EmergencyPriorityStatus::LifeguardMedical),
        3 => Ok(EmergencyPriorityStatus::MinimumFuel),
        4 => Ok(EmergencyPriorityStatus::NoCommunications),
        5 => Ok(EmergencyPriorityStatus::UnlawfulInterference),
        6 => Ok(EmergencyPriorityStatus::DownedAircraft),
        other => Err(AdsbError::FieldOutOfRange(format!(
            "emergency/priority status reserved value {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_emergency_state_reserved() {
        assert!(decode_emergency_state(7).is_err());
    }

    #[test]
    fn test_decode_emergency_state_known() {
        assert_eq!(
            decode_emergency_state(3).unwrap(),
            EmergencyPriorityStatus::MinimumFuel
        );
    }

    #[test]
    fn test_decode_extended_squitter_resolves_and_decodes() {
        // Same BDS 0,5 airborne position ME payload used in inference::tests.
        let me = [0x58u8, 0x13, 0xA2, 0xBD, 0x7A, 0x3D, 0x0E];
        match decode_extended_squitter(&me).unwrap() {
            DecodedBdsFrame::Bds05(frame) => assert_eq!(frame.type_code, 11),
            other => panic!("expected Bds05, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_comm_b_ambiguous_all_zero_payload_fails() {
        let mb = [0u8; 7];
        assert!(decode_comm_b(&mb).is_err());
    }
}
