//! BDS register inference.
//!
//! Extended squitter (DF17/18) payloads carry the register implicitly in
//! their type code, but several registers share overlapping byte layouts, so
//! this module resolves the register the same way for both paths: try every
//! decoder that could plausibly apply, and accept the result only if exactly
//! one decoded without error. Zero candidates or more than one candidate are
//! both treated as "could not infer" (debug-logged miss vs. a hard ambiguity
//! error further up the call chain).

use super::{identification, misc, position, status, velocity};
use super::BdsCode;
use crate::types::Result;

/// Resolve the BDS register carried by a DF17/18 extended-squitter `ME` field.
pub fn infer_bds_extended_squitter(me: &[u8; 7]) -> Result<BdsCode> {
    let mut candidates = Vec::with_capacity(1);

    if position::decode_bds05(me).is_ok() {
        candidates.push(BdsCode::Bds05);
    }
    if position::decode_bds06(me).is_ok() {
        candidates.push(BdsCode::Bds06);
    }
    if identification::decode_bds08(me).is_ok() {
        candidates.push(BdsCode::Bds08);
    }
    if velocity::decode_bds09(me).is_ok() {
        candidates.push(BdsCode::Bds09);
    }
    if status::decode_bds61(me).is_ok() {
        candidates.push(BdsCode::Bds61);
    }
    if status::decode_bds62(me).is_ok() {
        candidates.push(BdsCode::Bds62);
    }
    if status::decode_bds65(me).is_ok() {
        candidates.push(BdsCode::Bds65);
    }
    if status::decode_bds07(me).is_ok() {
        candidates.push(BdsCode::Bds07);
    }

    resolve(candidates)
}

/// Resolve the BDS register carried by a DF20/21 Comm-B `MB` field.
///
/// Unlike extended squitter, Comm-B replies carry no type-code hint at all;
/// the register is guessed purely from which decoder's status/reserved-bit
/// consistency checks the payload happens to satisfy. BDS 4,4, 4,5 and 5,3
/// are deliberately excluded from this candidate set (never reliably
/// distinguishable from the others by consistency checks alone).
pub fn infer_bds_comm_b(mb: &[u8; 7]) -> Result<BdsCode> {
    let mut candidates = Vec::with_capacity(1);

    if misc::validate_bds10(mb).is_ok() {
        candidates.push(BdsCode::Bds10);
    }
    if misc::validate_bds17(mb).is_ok() {
        candidates.push(BdsCode::Bds17);
    }
    if identification::decode_bds20(mb).is_ok() {
        candidates.push(BdsCode::Bds20);
    }
    if misc::validate_bds30(mb).is_ok() {
        candidates.push(BdsCode::Bds30);
    }
    if is_bds40_consistent(mb) {
        candidates.push(BdsCode::Bds40);
    }
    if is_bds50_consistent(mb) {
        candidates.push(BdsCode::Bds50);
    }
    if is_bds60_consistent(mb) {
        candidates.push(BdsCode::Bds60);
    }

    resolve(candidates)
}

fn resolve(candidates: Vec<BdsCode>) -> Result<BdsCode> {
    match candidates.len() {
        1 => Ok(candidates[0]),
        0 => Err(crate::types::AdsbError::BdsAmbiguous(0)),
        n => Err(crate::types::AdsbError::BdsAmbiguous(n)),
    }
}

fn is_bds40_consistent(mb: &[u8; 7]) -> bool {
    if mb[0] & 0b1000_0000 == 0 && (mb[0] & 0b0111_1111 != 0 || mb[1] & 0b1111_1000 != 0) {
        return false;
    }
    if mb[1] & 0b0000_0100 == 0
        && (mb[1] & 0b0000_0011 != 0 || mb[2] != 0 || mb[3] & 0b1100_0000 != 0)
    {
        return false;
    }
    if mb[3] & 0b0010_0000 == 0 && (mb[3] & 0b0001_1111 != 0 || mb[4] & 0b1111_1110 != 0) {
        return false;
    }
    if mb[4] & 0b0000_0001 != 0 || mb[5] & 0b1111_1110 != 0 || mb[6] & 0b0001_1000 != 0 {
        return false;
    }
    true
}

fn is_bds50_consistent(mb: &[u8; 7]) -> bool {
    if mb[0] & 0b1000_0000 == 0 {
        if mb[0] & 0b0011_1111 != 0 || mb[1] & 0b0110_0000 != 0 {
            return false;
        }
    } else {
        match super::intent::decode_bds50(mb) {
            Ok(frame) => match frame.roll_angle_deg {
                Some(roll) if !(-50.0..=50.0).contains(&roll) => return false,
                _ => {}
            },
            Err(_) => return false,
        }
    }

    if mb[1] & 0b0001_0000 == 0 && (mb[1] & 0b0000_1111 != 0 || mb[2] & 0b1111_1110 != 0) {
        return false;
    }

    if mb[2] & 0b0000_0001 == 0 {
        if mb[3] != 0 || mb[4] & 0b1100_0000 != 0 {
            return false;
        }
    } else {
        match super::intent::decode_bds50(mb) {
            Ok(frame) => match frame.ground_speed_kt {
                Some(gs) if !(0.0..=500.0).contains(&gs) => return false,
                _ => {}
            },
            Err(_) => return false,
        }
    }

    if mb[4] & 0b0010_0000 == 0 && (mb[4] & 0b0001_1111 != 0 || mb[5] != 0 || mb[6] & 0b0001_0000 != 0) {
        return false;
    }

    if mb[5] & 0b0000_0100 == 0 {
        if mb[5] & 0b0000_0011 != 0 || mb[6] != 0 {
            return false;
        }
    } else {
        match super::intent::decode_bds50(mb) {
            Ok(frame) => match frame.true_airspeed_kt {
                Some(tas) if !(0.0..=500.0).contains(&tas) => return false,
                _ => {}
            },
            Err(_) => return false,
        }
    }

    true
}

fn is_bds60_consistent(mb: &[u8; 7]) -> bool {
    if mb[0] & 0b1000_0000 == 0 && (mb[0] & 0b0111_1111 != 0 || mb[1] & 0b1111_0000 != 0) {
        return false;
    }

    if mb[1] & 0b0000_1000 == 0 {
        if mb[1] & 0b0000_0111 != 0 || mb[2] & 0b1111_1110 != 0 {
            return false;
        }
    } else {
        match super::intent::decode_bds60(mb) {
            Ok(frame) => match frame.indicated_airspeed_kt {
                Some(ias) if ias > 500 => return false,
                _ => {}
            },
            Err(_) => return false,
        }
    }

    if mb[2] & 0b0000_0001 == 0 {
        if mb[3] != 0 || mb[4] & 0b1100_0000 != 0 {
            return false;
        }
    } else {
        match super::intent::decode_bds60(mb) {
            Ok(frame) => match frame.mach_number {
                Some(mach) if !(0.0..=1.0).contains(&mach) => return false,
                _ => {}
            },
            Err(_) => return false,
        }
    }

    if mb[4] & 0b0010_0000 == 0 {
        if mb[4] & 0b0001_1111 != 0 || mb[5] & 0b1111_1000 != 0 {
            return false;
        }
    } else {
        match super::intent::decode_bds60(mb) {
            Ok(frame) => match frame.barometric_altitude_rate_fpm {
                Some(rate) if !(-6000.0..=6000.0).contains(&rate) => return false,
                _ => {}
            },
            Err(_) => return false,
        }
    }

    if mb[5] & 0b0000_0100 == 0 {
        if mb[5] & 0b0000_0011 != 0 || mb[6] != 0 {
            return false;
        }
    } else {
        match super::intent::decode_bds60(mb) {
            Ok(frame) => match frame.gnss_altitude_rate_fpm {
                Some(rate) if !(-6000.0..=6000.0).contains(&rate) => return false,
                _ => {}
            },
            Err(_) => return false,
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_is_ambiguous_not_bds40() {
        // An all-zero Comm-B payload is status-consistent for several
        // registers at once (10/17/30/40/50/60 all accept "no data"), so
        // it must resolve as ambiguous rather than picking one.
        let mb = [0u8; 7];
        let result = infer_bds_comm_b(&mb);
        assert!(result.is_err());
    }

    #[test]
    fn test_extended_squitter_airborne_position_resolves_uniquely() {
        let me = [0x58u8, 0x13, 0xA2, 0xBD, 0x7A, 0x3D, 0x0E];
        assert_eq!(
            infer_bds_extended_squitter(&me).unwrap(),
            BdsCode::Bds05
        );
    }
}
