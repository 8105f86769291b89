//! Compact Position Reporting — CPR decode for ADS-B positions.
//!
//! Two decode modes:
//! - Global: requires an even+odd frame pair. No reference needed.
//! - Local: single frame + reference position within ~180nm.
//!
//! Airborne positions (BDS 0,5) use the full 360 degree zone math below.
//! Surface positions (BDS 0,6) reuse the same `nl`/`modulo` machinery but
//! over a 90 degree range with hemisphere/zone ambiguity resolved against a
//! reference position — see the `surface_*` functions.
//!
//! Key constants:
//! - NZ = 15 (latitude zones per hemisphere for even frames)
//! - Nb = 17 (bits per coordinate)
//! - Dlat_even = 360 / (4 * NZ) = 6.0 degrees
//! - Dlat_odd = 360 / (4 * NZ - 1) ≈ 6.1017 degrees

/// Even/odd CPR frame parity, carried by BDS 0,5 and 0,6's `F` bit and by
/// the state store's bounded parity history (see `crate::state`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CprParity {
    Even,
    Odd,
}

impl CprParity {
    pub fn from_bit(bit: u8) -> Self {
        if bit == 0 { Self::Even } else { Self::Odd }
    }

    pub fn is_odd(self) -> bool {
        matches!(self, Self::Odd)
    }
}

/// Number of latitude zones per hemisphere.
const NZ: f64 = 15.0;

/// Bits per CPR coordinate.
const NB: u32 = 17;

/// Maximum CPR value (2^17 = 131072).
const CPR_MAX: f64 = (1u32 << NB) as f64;

/// Number of longitude zones at a given latitude (NL function).
///
/// Returns the number of CPR longitude zones for the latitude.
/// Ranges from 1 near poles to 59 at equator.
pub fn nl(lat: f64) -> i32 {
    if lat.abs() == 87.0 {
        return 2;
    }
    if lat.abs() > 87.0 {
        return 1;
    }

    let a = 1.0 - (std::f64::consts::PI / (2.0 * NZ)).cos();
    let b = (std::f64::consts::PI / 180.0 * lat.abs()).cos().powi(2);
    let nl_val = (2.0 * std::f64::consts::PI / (1.0 - a / b).acos()).floor() as i32;
    nl_val.max(1)
}

/// Modulo that always returns a non-negative result.
fn modulo(x: f64, y: f64) -> f64 {
    x - y * (x / y).floor()
}

/// Global CPR decode from an even/odd frame pair.
///
/// Returns `(latitude, longitude)` in degrees, or `None` if decode fails
/// (a zone boundary crossing between the two frames). Pair-age staleness is
/// the state store's concern, not this function's — it only ever sees two
/// frames the caller has already chosen to pair.
pub fn global_decode(
    lat_even: u32,
    lon_even: u32,
    lat_odd: u32,
    lon_odd: u32,
    t_even: f64,
    t_odd: f64,
) -> Option<(f64, f64)> {
    let dlat_even = 360.0 / (4.0 * NZ); // 6.0
    let dlat_odd = 360.0 / (4.0 * NZ - 1.0); // ~6.1017

    let lat_even_cpr = lat_even as f64 / CPR_MAX;
    let lon_even_cpr = lon_even as f64 / CPR_MAX;
    let lat_odd_cpr = lat_odd as f64 / CPR_MAX;
    let lon_odd_cpr = lon_odd as f64 / CPR_MAX;

    // Compute latitude zone index j
    let j = (59.0 * lat_even_cpr - 60.0 * lat_odd_cpr + 0.5).floor();

    // Compute candidate latitudes
    let mut lat_e = dlat_even * (modulo(j, 60.0) + lat_even_cpr);
    let mut lat_o = dlat_odd * (modulo(j, 59.0) + lat_odd_cpr);

    // Normalize to [-90, 90]
    if lat_e >= 270.0 {
        lat_e -= 360.0;
    }
    if lat_o >= 270.0 {
        lat_o -= 360.0;
    }

    // Check that both latitudes give the same NL value
    if nl(lat_e) != nl(lat_o) {
        return None; // Zone boundary crossing
    }

    let (lat, lon) = if t_even >= t_odd {
        // Use even frame
        let nl_val = nl(lat_e);
        let n_lon = nl_val.max(1);
        let dlon = 360.0 / n_lon as f64;
        let m = (lon_even_cpr * (nl_val - 1) as f64 - lon_odd_cpr * nl_val as f64 + 0.5).floor();
        let lon = dlon * (modulo(m, n_lon as f64) + lon_even_cpr);
        (lat_e, lon)
    } else {
        // Use odd frame
        let nl_val = nl(lat_o);
        let n_lon = (nl_val - 1).max(1);
        let dlon = 360.0 / n_lon as f64;
        let m = (lon_even_cpr * (nl_val - 1) as f64 - lon_odd_cpr * nl_val as f64 + 0.5).floor();
        let lon = dlon * (modulo(m, n_lon as f64) + lon_odd_cpr);
        (lat_o, lon)
    };

    // Normalize longitude to [-180, 180]
    let lon = if lon >= 180.0 { lon - 360.0 } else { lon };

    Some((round6(lat), round6(lon)))
}

/// Local CPR decode using a reference position.
///
/// Valid when the aircraft is within ~180nm of the reference.
pub fn local_decode(
    cpr_lat: u32,
    cpr_lon: u32,
    cpr_odd: bool,
    ref_lat: f64,
    ref_lon: f64,
) -> (f64, f64) {
    let i = if cpr_odd { 1.0 } else { 0.0 };
    let dlat = 360.0 / (4.0 * NZ - i);

    let cpr_lat_norm = cpr_lat as f64 / CPR_MAX;
    let cpr_lon_norm = cpr_lon as f64 / CPR_MAX;

    // Compute latitude zone index from reference
    let j = (ref_lat / dlat).floor()
        + (modulo(ref_lat, dlat) / dlat - cpr_lat_norm + 0.5).floor();
    let lat = dlat * (j + cpr_lat_norm);

    // Compute longitude zone size at this latitude
    let nl_val = nl(lat);
    let n_lon = (nl_val - i as i32).max(1);
    let dlon = 360.0 / n_lon as f64;

    // Compute longitude zone index from reference
    let m = (ref_lon / dlon).floor()
        + (modulo(ref_lon, dlon) / dlon - cpr_lon_norm + 0.5).floor();
    let mut lon = dlon * (m + cpr_lon_norm);

    // Normalize
    let mut lat = lat;
    if lat > 90.0 {
        lat -= 360.0;
    }
    if lon >= 180.0 {
        lon -= 360.0;
    }

    (round6(lat), round6(lon))
}

// ---------------------------------------------------------------------------
// Surface position (BDS 0,6) — same zone math as airborne, but the CPR
// encoding spans only a 90 degree range rather than 360, and the latitude
// hemisphere and longitude absolute zone are ambiguous without a reference
// near the aircraft.
// ---------------------------------------------------------------------------

/// Globally unambiguous surface latitude from an even/odd pair. The
/// hemisphere is resolved from `ref_lat`'s sign, not from the CPR bits.
pub fn surface_lat_global(ref_lat: f64, lat_even: u32, lat_odd: u32) -> (f64, f64) {
    let lce = lat_even as f64 / CPR_MAX;
    let lco = lat_odd as f64 / CPR_MAX;

    let dlat_even = 90.0 / (4.0 * NZ);
    let dlat_odd = 90.0 / (4.0 * NZ - 1.0);

    let j = (59.0 * lce - 60.0 * lco + 0.5).floor();

    let lat_even_base = dlat_even * (modulo(j, 60.0) + lce);
    let lat_odd_base = dlat_odd * (modulo(j, 59.0) + lco);

    if ref_lat > 0.0 {
        (lat_even_base, lat_odd_base)
    } else {
        (lat_even_base - 90.0, lat_odd_base - 90.0)
    }
}

/// Locally unambiguous surface latitude from a single frame and a reference
/// position known to be within the surface CPR's ambiguity range.
pub fn surface_lat_local(ref_lat: f64, cpr_lat: u32, odd: bool) -> f64 {
    let lc = cpr_lat as f64 / CPR_MAX;
    let dlat = if odd {
        90.0 / (4.0 * NZ - 1.0)
    } else {
        90.0 / (4.0 * NZ)
    };

    let j = (ref_lat / dlat).floor() + (0.5 + modulo(ref_lat, dlat) / dlat - lc).floor();
    dlat * (j + lc)
}

/// Globally unambiguous surface longitude from an even/odd pair. Surface CPR
/// only spans 90 degrees of longitude, so the absolute zone is ambiguous;
/// the candidate nearest `ref_lon` among the four 90-degree-spaced solutions
/// is taken as correct.
pub fn surface_lon_global(ref_lon: f64, lon_even: u32, lon_odd: u32, nl_val: i32) -> (f64, f64) {
    let lce = lon_even as f64 / CPR_MAX;
    let lco = lon_odd as f64 / CPR_MAX;
    let nl_f = nl_val as f64;

    let m = (lce * (nl_f - 1.0) - lco * nl_f + 0.5).floor();

    let n_even = nl_f.max(1.0);
    let n_odd = (nl_f - 1.0).max(1.0);

    let dlon_even = 90.0 / n_even;
    let dlon_odd = 90.0 / n_odd;

    let lon_even_base = dlon_even * (modulo(m, n_even) + lce);
    let lon_odd_base = dlon_odd * (modulo(m, n_odd) + lco);

    (
        nearest_surface_lon(ref_lon, lon_even_base),
        nearest_surface_lon(ref_lon, lon_odd_base),
    )
}

/// Locally unambiguous surface longitude from a single frame plus reference.
pub fn surface_lon_local(ref_lon: f64, cpr_lon: u32, nl_val: i32, odd: bool) -> f64 {
    let lc = cpr_lon as f64 / CPR_MAX;
    let n_lon = if odd { (nl_val - 1).max(1) } else { nl_val.max(1) } as f64;
    let dlon = 90.0 / n_lon;

    let m = (ref_lon / dlon).floor() + (modulo(ref_lon, dlon) / dlon - lc + 0.5).floor();
    dlon * (m + lc)
}

/// Pick whichever of the four 90-degree-spaced candidate longitudes is
/// closest to the reference, per the surface CPR's ambiguity resolution.
fn nearest_surface_lon(ref_lon: f64, base: f64) -> f64 {
    let mut candidates = [base, base + 90.0, base + 180.0, base + 270.0];
    for c in candidates.iter_mut() {
        if *c >= 180.0 {
            *c -= 360.0;
        }
    }
    candidates
        .into_iter()
        .min_by(|a, b| (ref_lon - a).abs().total_cmp(&(ref_lon - b).abs()))
        .unwrap()
}

/// Round to 6 decimal places (matching Python's behavior).
fn round6(val: f64) -> f64 {
    (val * 1_000_000.0).round() / 1_000_000.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nl_equator() {
        assert_eq!(nl(0.0), 59);
    }

    #[test]
    fn test_nl_poles() {
        assert_eq!(nl(87.0), 2);
        assert_eq!(nl(-87.0), 2);
        assert_eq!(nl(90.0), 1);
    }

    #[test]
    fn test_nl_mid_latitude() {
        // ~52° N (London area) should give NL around 36
        let n = nl(52.0);
        assert!(n > 30 && n < 40, "NL at 52° should be ~36, got {n}");
    }

    #[test]
    fn test_global_decode_known_pair() {
        // Test vectors from "The 1090MHz Riddle"
        // Even frame: cpr_lat=93000, cpr_lon=51372
        // Odd frame: cpr_lat=74158, cpr_lon=50194
        // Expected: lat≈52.2572, lon≈3.9194
        let result = global_decode(93000, 51372, 74158, 50194, 1.0, 0.0);
        assert!(result.is_some(), "Global decode should succeed");

        let (lat, lon) = result.unwrap();
        assert!(
            (lat - 52.2572).abs() < 0.01,
            "Latitude should be ~52.2572, got {lat}"
        );
        assert!(
            (lon - 3.9194).abs() < 0.01,
            "Longitude should be ~3.9194, got {lon}"
        );
    }

    #[test]
    fn test_local_decode() {
        // Use decoded position as reference, decode even frame locally
        let (lat, lon) = local_decode(93000, 51372, false, 52.25, 3.92);
        assert!(
            (lat - 52.2572).abs() < 0.01,
            "Local lat should be ~52.2572, got {lat}"
        );
        assert!(
            (lon - 3.9194).abs() < 0.01,
            "Local lon should be ~3.9194, got {lon}"
        );
    }

    #[test]
    fn test_local_decode_odd() {
        // Local decode accuracy depends on reference proximity.
        // With ref (52.25, 3.92), odd frame should decode near the actual position.
        let (lat, lon) = local_decode(74158, 50194, true, 52.25, 3.92);
        assert!(
            (lat - 52.2572).abs() < 0.05,
            "Local odd lat should be ~52.2572, got {lat}"
        );
        assert!(
            (lon - 3.92).abs() < 0.05,
            "Local odd lon should be ~3.92, got {lon}"
        );
    }

    #[test]
    fn test_modulo_positive() {
        assert!((modulo(7.0, 3.0) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_modulo_negative() {
        // modulo(-1, 60) should return 59
        assert!((modulo(-1.0, 60.0) - 59.0).abs() < 1e-10);
    }

    #[test]
    fn test_surface_lat_global_northern_hemisphere() {
        let (lat_e, lat_o) = surface_lat_global(52.0, 93000, 74158);
        // Southern-hemisphere base minus the 90 shift should not apply here.
        assert!(lat_e > 0.0 && lat_e < 90.0);
        assert!(lat_o > 0.0 && lat_o < 90.0);
    }

    #[test]
    fn test_surface_lat_global_southern_hemisphere_shift() {
        let (lat_e_n, _) = surface_lat_global(1.0, 93000, 74158);
        let (lat_e_s, _) = surface_lat_global(-1.0, 93000, 74158);
        assert!((lat_e_s - (lat_e_n - 90.0)).abs() < 1e-9);
    }

    #[test]
    fn test_surface_lon_global_picks_nearest_candidate() {
        let nl_val = nl(52.0);
        let (lon_e, _) = surface_lon_global(4.0, 51372, 50194, nl_val);
        assert!((lon_e - 4.0).abs() < 90.0);
    }

    #[test]
    fn test_surface_lat_local_matches_global_order_of_magnitude() {
        let lat = surface_lat_local(52.25, 93000, false);
        assert!(lat > 0.0 && lat < 90.0);
    }

    #[test]
    fn test_surface_lon_local_near_reference() {
        let nl_val = nl(52.0);
        let lon = surface_lon_local(3.9, 51372, nl_val, false);
        assert!((lon - 3.9).abs() < 1.0);
    }
}
