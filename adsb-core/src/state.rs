//! Aircraft state store — a concurrent per-ICAO map of live vessel state.
//!
//! Two-level locking: a `RwLock` over the `Icao -> AircraftRecord` map
//! protects insertion and removal, and each record carries its own
//! `RwLock` for field mutation. Lock order is always map then record; no
//! operation ever holds two record locks, and no operation ever blocks on
//! I/O while holding either lock.
//!
//! Grounded on `examples/original_source/vesselstate/vesselstate.go`
//! (`VesselState`/`Vessels`): the CPR history ring of 3, the evictor's
//! 1-second tick with 60-second full-evict and 2-second position-clear
//! thresholds, the ~1 NM "known position" debounce, and the 180 NM local
//! CPR sanity gate are all carried over from there.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::bds::position::{AirbornePosition, SurfacePosition};
use crate::bds::{self, identification, status, velocity, DecodedBdsFrame};
use crate::cpr::{self, CprParity};
use crate::df::DecodedFrame;
use crate::types::{icao_to_string, AdsbError, Icao, Result};

/// An aircraft is dropped from the store after this long without any frame.
pub const EVICT_AFTER: Duration = Duration::from_secs(60);
/// Positional state (both CPR buffers, last known lat/lon) is cleared after
/// this long without positional data, per RTCA DO-260B §A.2.3.2.3.1/.2.
pub const POSITION_CLEAR_AFTER: Duration = Duration::from_secs(2);
/// A CPR solve is accepted as "known" only once two consecutive solves land
/// within this distance of each other.
const KNOWN_POSITION_THRESHOLD_MI: f64 = 1.15;
/// A local CPR solve more than this far from the reference position is
/// rejected as ambiguous (RTCA DO-260B local-decode range).
const LOCAL_DECODE_MAX_RANGE_NM: f64 = 180.0;
/// An altitude update more than this far from the last known altitude is
/// rejected as a sanity failure.
const ALTITUDE_SANITY_THRESHOLD_FT: f64 = 2000.0;
/// Parity history kept per CPR buffer (need the last two to decide
/// global-vs-local, but keep one extra the way the source does).
const CPR_HISTORY_LEN: usize = 3;

/// How a reported (lat, lon) was produced, surfaced to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatLonMethod {
    AirborneGlobal,
    AirborneLocal,
    SurfaceGlobal,
    SurfaceLocal,
}

impl LatLonMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AirborneGlobal => "airborne,global",
            Self::AirborneLocal => "airborne,local",
            Self::SurfaceGlobal => "surface,global",
            Self::SurfaceLocal => "surface,local",
        }
    }
}

/// One slot of a CPR pair buffer: the last-seen (lat, lon) for a given
/// parity, plus when it arrived.
#[derive(Debug, Clone, Copy)]
struct CprSlot {
    lat_cpr: u32,
    lon_cpr: u32,
    received_at: Instant,
}

/// Bounded ring of the last [`CPR_HISTORY_LEN`] parities seen for one
/// position source (airborne or surface), plus the even/odd value slots
/// those parities refer to.
#[derive(Debug, Clone, Default)]
struct CprBuffer {
    even: Option<CprSlot>,
    odd: Option<CprSlot>,
    history: Vec<CprParity>,
}

impl CprBuffer {
    fn store(&mut self, lat_cpr: u32, lon_cpr: u32, parity: CprParity) {
        let slot = CprSlot {
            lat_cpr,
            lon_cpr,
            received_at: Instant::now(),
        };
        match parity {
            CprParity::Even => self.even = Some(slot),
            CprParity::Odd => self.odd = Some(slot),
        }
        self.history.push(parity);
        if self.history.len() > CPR_HISTORY_LEN {
            self.history.remove(0);
        }
    }

    /// The last two parities differ, i.e. the history ends in an
    /// even/odd (or odd/even) pair suitable for a global solve.
    fn last_two_differ(&self) -> bool {
        let len = self.history.len();
        len >= 2 && self.history[len - 1] != self.history[len - 2]
    }

    fn last_parity(&self) -> Option<CprParity> {
        self.history.last().copied()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Everything known about one aircraft, keyed by ICAO address.
#[derive(Debug, Clone, Default)]
pub struct AircraftRecord {
    pub message_count: u64,

    pub squawk: Option<u16>,
    pub callsign: Option<String>,
    pub airborne: Option<bool>,
    pub altitude_ft: Option<f64>,
    pub ground_speed: Option<String>,
    pub ground_track: Option<String>,

    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub lat_lon_method: Option<LatLonMethod>,
    pub lat_lon_known: bool,

    airborne_cpr: CprBuffer,
    surface_cpr: CprBuffer,

    pub last_updated: Option<Instant>,
    pub last_position_data: Option<Instant>,
}

impl AircraftRecord {
    fn touch(&mut self) {
        self.last_updated = Some(Instant::now());
    }

    fn clear_position_data(&mut self) {
        self.lat_lon_known = false;
        self.airborne_cpr.clear();
        self.surface_cpr.clear();
    }
}

/// The live per-aircraft state database.
///
/// Cheap to clone (an `Arc` handle) — the pipeline task and the observer
/// task each hold their own clone over the same underlying map.
#[derive(Clone)]
pub struct Vessels {
    inner: Arc<RwLock<HashMap<Icao, Arc<RwLock<AircraftRecord>>>>>,
    reference_position: Arc<RwLock<Option<(f64, f64)>>>,
}

impl Default for Vessels {
    fn default() -> Self {
        Self::new()
    }
}

impl Vessels {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            reference_position: Arc::new(RwLock::new(None)),
        }
    }

    /// Configure the receiver's own (lat, lon), required for surface-position
    /// global and local decoding.
    pub fn set_reference_position(&self, lat: f64, lon: f64) {
        *self.reference_position.write().unwrap() = Some((lat, lon));
    }

    pub fn reference_position(&self) -> Option<(f64, f64)> {
        *self.reference_position.read().unwrap()
    }

    /// Number of aircraft currently tracked.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` against a read-only snapshot of every tracked record, for
    /// observer rendering. Holds the map lock in shared mode for the scan
    /// and each record's lock in shared mode in turn — never two at once.
    pub fn for_each<F: FnMut(&Icao, &AircraftRecord)>(&self, mut f: F) {
        let map = self.inner.read().unwrap();
        for (icao, record) in map.iter() {
            let record = record.read().unwrap();
            f(icao, &record);
        }
    }

    fn get_or_create(&self, icao: Icao) -> Arc<RwLock<AircraftRecord>> {
        if let Some(existing) = self.inner.read().unwrap().get(&icao) {
            return Arc::clone(existing);
        }
        let mut map = self.inner.write().unwrap();
        Arc::clone(
            map.entry(icao)
                .or_insert_with(|| Arc::new(RwLock::new(AircraftRecord::default()))),
        )
    }

    fn get(&self, icao: &Icao) -> Option<Arc<RwLock<AircraftRecord>>> {
        self.inner.read().unwrap().get(icao).map(Arc::clone)
    }

    /// Idempotent upsert from a fully dispatched frame: creates the record
    /// if absent, bumps the message count, refreshes `last_updated`, and
    /// applies whatever fields this downlink format carries directly.
    /// Comm-B (DF20/21) and extended-squitter (DF17/18) payloads are
    /// classified and applied separately via [`Self::update_from_bds`].
    pub fn update_from(&self, frame: &DecodedFrame) {
        let icao = frame.icao();
        let record = self.get_or_create(icao);
        {
            let mut rec = record.write().unwrap();
            rec.message_count += 1;
            rec.touch();
        }

        match frame {
            DecodedFrame::Df0 {
                airborne,
                altitude_ft,
                ..
            } => {
                self.set_airborne(icao, *airborne);
                if let Some(ft) = altitude_ft {
                    self.set_altitude(icao, *ft);
                }
            }
            DecodedFrame::Df4 {
                flight_status,
                altitude_ft,
                ..
            } => {
                self.set_airborne(icao, flight_status.airborne());
                if let Some(ft) = altitude_ft {
                    self.set_altitude(icao, *ft);
                }
            }
            DecodedFrame::Df5 {
                flight_status,
                squawk,
                ..
            } => {
                self.set_airborne(icao, flight_status.airborne());
                self.set_squawk(icao, *squawk);
            }
            DecodedFrame::Df11 { .. } => {}
            DecodedFrame::Df16 {
                airborne,
                altitude_ft,
                ..
            } => {
                self.set_airborne(icao, *airborne);
                if let Some(ft) = altitude_ft {
                    self.set_altitude(icao, *ft);
                }
            }
            DecodedFrame::Df17 { me, .. } | DecodedFrame::Df18 { me, .. } => {
                match bds::decode_extended_squitter(me) {
                    Ok(decoded) => self.update_from_bds(icao, decoded),
                    Err(err) => debug!(icao = %icao_to_string(&icao), %err, "BDS inference failed"),
                }
            }
            DecodedFrame::Df20 {
                flight_status,
                altitude_ft,
                mb,
                ..
            } => {
                self.set_airborne(icao, flight_status.airborne());
                if let Some(ft) = altitude_ft {
                    self.set_altitude(icao, *ft);
                }
                match bds::decode_comm_b(mb) {
                    Ok(decoded) => self.update_from_bds(icao, decoded),
                    Err(err) => debug!(icao = %icao_to_string(&icao), %err, "BDS inference failed"),
                }
            }
            DecodedFrame::Df21 {
                flight_status,
                squawk,
                mb,
                ..
            } => {
                self.set_airborne(icao, flight_status.airborne());
                self.set_squawk(icao, *squawk);
                match bds::decode_comm_b(mb) {
                    Ok(decoded) => self.update_from_bds(icao, decoded),
                    Err(err) => debug!(icao = %icao_to_string(&icao), %err, "BDS inference failed"),
                }
            }
        }
    }

    /// Apply a resolved BDS payload's fields to the aircraft's record.
    fn update_from_bds(&self, icao: Icao, decoded: DecodedBdsFrame) {
        match decoded {
            DecodedBdsFrame::Bds05(frame) => self.apply_airborne_position(icao, &frame),
            DecodedBdsFrame::Bds06(frame) => self.apply_surface_position(icao, &frame),
            DecodedBdsFrame::Bds08(identification::Identification { callsign, .. }) => {
                self.set_callsign(icao, callsign);
            }
            DecodedBdsFrame::Bds20(identification::DataLinkIdentification { callsign }) => {
                self.set_callsign(icao, callsign);
            }
            DecodedBdsFrame::Bds50(frame) => {
                if let Some(gs) = frame.ground_speed_kt {
                    self.set_ground_speed(icao, format!("{:.4} km/h ({gs:.4} kt)", gs * 1.852));
                }
                if let Some(trk) = frame.true_track_angle_deg {
                    self.set_ground_track(icao, format!("{}°", trk.round() as i32));
                }
            }
            DecodedBdsFrame::Bds07(status::OperationalStatus { subtype, .. }) => {
                // Subtype 0 = airborne, subtype 1 = surface (RTCA DO-260B §2.2.3.2.7.2).
                self.set_airborne(icao, subtype == 0);
            }
            // BDS 0,9 (velocity), 1,0/1,7/3,0 (capability reports), 4,0/4,4/4,5/6,0
            // (intent/weather), and 6,1/6,2/6,5 (status) carry no field this store's
            // data model surfaces today; decoding them still validates the register,
            // which is the point of running inference at all.
            DecodedBdsFrame::Bds09(_)
            | DecodedBdsFrame::Bds10(_)
            | DecodedBdsFrame::Bds17(_)
            | DecodedBdsFrame::Bds30(_)
            | DecodedBdsFrame::Bds40(_)
            | DecodedBdsFrame::Bds44(_)
            | DecodedBdsFrame::Bds45(_)
            | DecodedBdsFrame::Bds54(_)
            | DecodedBdsFrame::Bds60(_)
            | DecodedBdsFrame::Bds61(_)
            | DecodedBdsFrame::Bds62(_)
            | DecodedBdsFrame::Bds65(_) => {}
        }
    }

    fn apply_airborne_position(&self, icao: Icao, frame: &AirbornePosition) {
        if let Some(ft) = frame.altitude_ft {
            self.set_altitude(icao, ft);
        }
        self.store_airborne_cpr(icao, frame.lat_cpr, frame.lon_cpr, frame.cpr_format);
    }

    fn apply_surface_position(&self, icao: Icao, frame: &SurfacePosition) {
        self.set_ground_speed(icao, frame.ground_speed.clone());
        self.set_ground_track(icao, frame.ground_track.clone());
        self.store_surface_cpr(icao, frame.lat_cpr, frame.lon_cpr, frame.cpr_format);
    }

    pub fn set_airborne(&self, icao: Icao, airborne: bool) {
        if let Some(record) = self.get(&icao) {
            record.write().unwrap().airborne = Some(airborne);
        }
    }

    pub fn set_squawk(&self, icao: Icao, squawk: u16) {
        if let Some(record) = self.get(&icao) {
            record.write().unwrap().squawk = Some(squawk);
        }
    }

    pub fn set_callsign(&self, icao: Icao, callsign: impl Into<String>) {
        if let Some(record) = self.get(&icao) {
            record.write().unwrap().callsign = Some(callsign.into());
        }
    }

    pub fn set_ground_speed(&self, icao: Icao, ground_speed: impl Into<String>) {
        if let Some(record) = self.get(&icao) {
            record.write().unwrap().ground_speed = Some(ground_speed.into());
        }
    }

    pub fn set_ground_track(&self, icao: Icao, ground_track: impl Into<String>) {
        if let Some(record) = self.get(&icao) {
            record.write().unwrap().ground_track = Some(ground_track.into());
        }
    }

    /// Write a new altitude, rejecting jumps of >= 2000 ft from the last
    /// known value as a sanity failure (the old value is left in place).
    pub fn set_altitude(&self, icao: Icao, altitude_ft: f64) {
        let Some(record) = self.get(&icao) else {
            return;
        };
        let mut rec = record.write().unwrap();
        if let Some(old) = rec.altitude_ft {
            if (altitude_ft - old).abs() >= ALTITUDE_SANITY_THRESHOLD_FT {
                warn!(
                    icao = %icao_to_string(&icao),
                    old, new = altitude_ft,
                    "altitude sanity check failed, keeping old value"
                );
                return;
            }
        }
        rec.altitude_ft = Some(altitude_ft);
    }

    /// Buffer an airborne CPR sample and attempt a position solve.
    pub fn store_airborne_cpr(&self, icao: Icao, lat_cpr: u32, lon_cpr: u32, parity: CprParity) {
        let Some(record) = self.get(&icao) else {
            return;
        };
        {
            let mut rec = record.write().unwrap();
            rec.airborne_cpr.store(lat_cpr, lon_cpr, parity);
            rec.last_position_data = Some(Instant::now());
        }
        if let Err(err) = self.solve_airborne_position(icao) {
            debug!(icao = %icao_to_string(&icao), %err, "airborne position not solved");
        }
    }

    /// Buffer a surface CPR sample and attempt a position solve.
    pub fn store_surface_cpr(&self, icao: Icao, lat_cpr: u32, lon_cpr: u32, parity: CprParity) {
        let Some(record) = self.get(&icao) else {
            return;
        };
        {
            let mut rec = record.write().unwrap();
            rec.surface_cpr.store(lat_cpr, lon_cpr, parity);
            rec.last_position_data = Some(Instant::now());
        }
        if let Err(err) = self.solve_surface_position(icao) {
            debug!(icao = %icao_to_string(&icao), %err, "surface position not solved");
        }
    }

    /// Attempt to resolve an airborne (lat, lon) from whatever CPR data is
    /// currently buffered: a global solve if the last two parities differ,
    /// otherwise a local solve against the last known position.
    pub fn solve_airborne_position(&self, icao: Icao) -> Result<()> {
        let Some(record) = self.get(&icao) else {
            return Ok(());
        };
        let mut rec = record.write().unwrap();
        let old = (rec.lat, rec.lon);

        if rec.airborne_cpr.history.len() < 2 {
            return Err(AdsbError::CprUnsolved("insufficient CPR parity history"));
        }

        let (lat, lon, method) = if rec.airborne_cpr.last_two_differ() {
            let (even, odd) = match (rec.airborne_cpr.even, rec.airborne_cpr.odd) {
                (Some(e), Some(o)) => (e, o),
                _ => return Err(AdsbError::CprUnsolved("missing even or odd slot")),
            };
            let (lat, lon) = cpr::global_decode(
                even.lat_cpr,
                even.lon_cpr,
                odd.lat_cpr,
                odd.lon_cpr,
                -duration_since(even.received_at),
                -duration_since(odd.received_at),
            )
            .ok_or(AdsbError::CprUnsolved(
                "even/odd latitude zone numbers do not match",
            ))?;
            (lat, lon, LatLonMethod::AirborneGlobal)
        } else if rec.lat_lon_known {
            let (ref_lat, ref_lon) = (rec.lat.unwrap(), rec.lon.unwrap());
            let parity = rec
                .airborne_cpr
                .last_parity()
                .ok_or(AdsbError::CprUnsolved("no CPR parity recorded"))?;
            let slot = match parity {
                CprParity::Even => rec.airborne_cpr.even,
                CprParity::Odd => rec.airborne_cpr.odd,
            }
            .ok_or(AdsbError::CprUnsolved("missing CPR slot for last parity"))?;
            let (lat, lon) = cpr::local_decode(
                slot.lat_cpr,
                slot.lon_cpr,
                parity.is_odd(),
                ref_lat,
                ref_lon,
            );
            if haversine_nm(ref_lat, ref_lon, lat, lon) > LOCAL_DECODE_MAX_RANGE_NM {
                return Err(AdsbError::CprUnsolved(
                    "local decode more than 180NM from reference position",
                ));
            }
            (lat, lon, LatLonMethod::AirborneLocal)
        } else {
            return Err(AdsbError::CprUnsolved(
                "no known reference position for local decode",
            ));
        };

        rec.lat = Some(lat);
        rec.lon = Some(lon);
        rec.lat_lon_method = Some(method);
        update_known_flag(&mut rec, old);
        Ok(())
    }

    /// Attempt to resolve a surface (lat, lon). Requires a configured
    /// receiver reference position for both the global and local solves.
    pub fn solve_surface_position(&self, icao: Icao) -> Result<()> {
        let Some((ref_lat, ref_lon)) = self.reference_position() else {
            return Err(AdsbError::CprUnsolved(
                "no receiver reference position configured",
            ));
        };
        let Some(record) = self.get(&icao) else {
            return Ok(());
        };
        let mut rec = record.write().unwrap();
        let old = (rec.lat, rec.lon);

        if rec.surface_cpr.history.len() < 2 {
            return Err(AdsbError::CprUnsolved("insufficient CPR parity history"));
        }

        let (lat, lon, method) = if rec.surface_cpr.last_two_differ() {
            let (even, odd) = match (rec.surface_cpr.even, rec.surface_cpr.odd) {
                (Some(e), Some(o)) => (e, o),
                _ => return Err(AdsbError::CprUnsolved("missing even or odd slot")),
            };
            let (lat_even, lat_odd) = cpr::surface_lat_global(ref_lat, even.lat_cpr, odd.lat_cpr);
            let nl_even = cpr::nl(lat_even);
            let nl_odd = cpr::nl(lat_odd);
            if nl_even != nl_odd {
                return Err(AdsbError::CprUnsolved(
                    "even/odd latitude zone numbers do not match",
                ));
            }
            let (lon_even, lon_odd) =
                cpr::surface_lon_global(ref_lon, even.lon_cpr, odd.lon_cpr, nl_even);
            let last_even = matches!(rec.surface_cpr.last_parity(), Some(CprParity::Even));
            if last_even {
                (lat_even, lon_even, LatLonMethod::SurfaceGlobal)
            } else {
                (lat_odd, lon_odd, LatLonMethod::SurfaceGlobal)
            }
        } else if rec.lat_lon_known {
            let parity = rec
                .surface_cpr
                .last_parity()
                .ok_or(AdsbError::CprUnsolved("no CPR parity recorded"))?;
            let slot = match parity {
                CprParity::Even => rec.surface_cpr.even,
                CprParity::Odd => rec.surface_cpr.odd,
            }
            .ok_or(AdsbError::CprUnsolved("missing CPR slot for last parity"))?;
            let lat = cpr::surface_lat_local(ref_lat, slot.lat_cpr, parity.is_odd());
            let nl = cpr::nl(lat);
            let lon = cpr::surface_lon_local(ref_lon, slot.lon_cpr, nl, parity.is_odd());
            if haversine_nm(ref_lat, ref_lon, lat, lon) > LOCAL_DECODE_MAX_RANGE_NM {
                return Err(AdsbError::CprUnsolved(
                    "local decode more than 180NM from reference position",
                ));
            }
            (lat, lon, LatLonMethod::SurfaceLocal)
        } else {
            return Err(AdsbError::CprUnsolved(
                "no known reference position for local decode",
            ));
        };

        rec.lat = Some(lat);
        rec.lon = Some(lon);
        rec.lat_lon_method = Some(method);
        update_known_flag(&mut rec, old);
        Ok(())
    }

    /// Sweep once: evict records with no frame in 60s, and clear positional
    /// substate on records with no positional data in 2s. Intended to be
    /// called once a second from a dedicated task.
    pub fn evict(&self) {
        let now = Instant::now();
        let mut to_evict = Vec::new();

        {
            let map = self.inner.read().unwrap();
            for (icao, record) in map.iter() {
                let should_evict;
                let should_clear_position;
                {
                    let rec = record.read().unwrap();
                    should_evict = rec
                        .last_updated
                        .is_none_or(|t| now.duration_since(t) > EVICT_AFTER);
                    should_clear_position = !should_evict
                        && rec
                            .last_position_data
                            .is_some_and(|t| now.duration_since(t) > POSITION_CLEAR_AFTER);
                }
                if should_evict {
                    to_evict.push(*icao);
                } else if should_clear_position {
                    record.write().unwrap().clear_position_data();
                }
            }
        }

        if !to_evict.is_empty() {
            let mut map = self.inner.write().unwrap();
            for icao in &to_evict {
                debug!(icao = %icao_to_string(icao), "evicting expired aircraft");
                map.remove(icao);
            }
        }
    }
}

fn update_known_flag(rec: &mut AircraftRecord, old: (Option<f64>, Option<f64>)) {
    rec.lat_lon_known = match (old.0, old.1, rec.lat, rec.lon) {
        (Some(old_lat), Some(old_lon), Some(new_lat), Some(new_lon)) => {
            haversine_mi(old_lat, old_lon, new_lat, new_lon) < KNOWN_POSITION_THRESHOLD_MI
        }
        _ => false,
    };
}

fn duration_since(instant: Instant) -> f64 {
    Instant::now().duration_since(instant).as_secs_f64()
}

/// Great-circle distance in nautical miles (haversine, earth radius 6371 km).
fn haversine_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    haversine_km(lat1, lon1, lat2, lon2) * 0.539957
}

/// Great-circle distance in statute miles.
fn haversine_mi(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    haversine_km(lat1, lon1, lat2, lon2) * 0.621371
}

fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let (lat1r, lat2r) = (lat1.to_radians(), lat2.to_radians());
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1r.cos() * lat2r.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::df;
    use crate::types::hex_decode;

    #[test]
    fn test_new_record_created_on_first_frame() {
        let vessels = Vessels::new();
        let data = hex_decode("8D4840D6202CC371C32CE0576098").unwrap();
        let frame = df::parse(&data).unwrap();
        vessels.update_from(&frame);
        assert_eq!(vessels.len(), 1);
    }

    #[test]
    fn test_airborne_position_global_solve_scenario() {
        // DF17 8D 7C534D ME=58 13A2BD 7A3D0E, TC 11, CPR even.
        let vessels = Vessels::new();
        let even = hex_decode("8D7C534D5813A2BD7A3D0E834424").unwrap();
        let odd = hex_decode("8D7C534D5813A71829 97F866EDBC".replace(' ', "")).unwrap();
        vessels.update_from(&df::parse(&even).unwrap());
        vessels.update_from(&df::parse(&odd).unwrap());

        let icao = [0x7C, 0x53, 0x4D];
        let record = vessels.get(&icao).unwrap();
        let rec = record.read().unwrap();
        assert_eq!(rec.altitude_ft, Some(2850.0));
        assert_eq!(rec.lat_lon_method, Some(LatLonMethod::AirborneGlobal));
        let lat = rec.lat.unwrap();
        let lon = rec.lon.unwrap();
        assert!((lat - (-31.88979)).abs() < 0.01, "lat={lat}");
        assert!((lon - 116.05858).abs() < 0.01, "lon={lon}");
        // Only one global solve has happened so far; "known" requires two
        // consecutive solves within ~1 NM of each other.
        assert!(!rec.lat_lon_known);
    }

    #[test]
    fn test_identification_scenario() {
        let vessels = Vessels::new();
        let data = hex_decode("8D7CF9D921589412D31820F98869").unwrap();
        vessels.update_from(&df::parse(&data).unwrap());
        let icao = [0x7C, 0xF9, 0xD9];
        let record = vessels.get(&icao).unwrap();
        let rec = record.read().unwrap();
        assert_eq!(rec.callsign.as_deref(), Some("NWK2931"));
    }

    #[test]
    fn test_df4_surveillance_altitude_scenario() {
        let vessels = Vessels::new();
        let data = hex_decode("20000294E7DC54").unwrap();
        vessels.update_from(&df::parse(&data).unwrap());
        let icao = [0x7C, 0x7F, 0x25];
        let record = vessels.get(&icao).unwrap();
        let rec = record.read().unwrap();
        assert_eq!(rec.airborne, Some(true));
        assert_eq!(rec.altitude_ft, Some(3100.0));
    }

    #[test]
    fn test_df5_identity_reply_scenario() {
        let vessels = Vessels::new();
        let data = hex_decode("2800 0A00 308D E4".replace(' ', "").as_str()).unwrap();
        vessels.update_from(&df::parse(&data).unwrap());
        let icao = [0x7C, 0x82, 0x2A];
        let record = vessels.get(&icao).unwrap();
        let rec = record.read().unwrap();
        assert_eq!(rec.airborne, Some(true));
        assert_eq!(rec.squawk, Some(3000));
    }

    #[test]
    fn test_df0_short_acas_scenario() {
        let vessels = Vessels::new();
        let data = hex_decode("0200081C5BBE71").unwrap();
        vessels.update_from(&df::parse(&data).unwrap());
        let icao = [0x7C, 0x80, 0x55];
        let record = vessels.get(&icao).unwrap();
        let rec = record.read().unwrap();
        assert_eq!(rec.airborne, Some(true));
        assert_eq!(rec.altitude_ft, Some(12100.0));
    }

    #[test]
    fn test_comm_b_altitude_reply_with_bds20_callsign_scenario() {
        let vessels = Vessels::new();
        let data = hex_decode("A0000128200C14A0820820715231").unwrap();
        vessels.update_from(&df::parse(&data).unwrap());
        let icao = [0x7C, 0x0A, 0x31];
        let record = vessels.get(&icao).unwrap();
        let rec = record.read().unwrap();
        assert_eq!(rec.altitude_ft, Some(800.0));
        assert_eq!(rec.callsign.as_deref(), Some("CAR"));
    }

    #[test]
    fn test_altitude_sanity_reject_large_jump() {
        let vessels = Vessels::new();
        let icao = [0x11, 0x22, 0x33];
        vessels.get_or_create(icao);
        vessels.set_altitude(icao, 10_000.0);
        vessels.set_altitude(icao, 13_000.0); // +3000ft, rejected
        let record = vessels.get(&icao).unwrap();
        assert_eq!(record.read().unwrap().altitude_ft, Some(10_000.0));
    }

    #[test]
    fn test_surface_position_requires_reference() {
        let vessels = Vessels::new();
        let icao = [0x11, 0x22, 0x33];
        vessels.get_or_create(icao);
        vessels.store_surface_cpr(icao, 1000, 2000, CprParity::Even);
        vessels.store_surface_cpr(icao, 1100, 2100, CprParity::Odd);
        assert!(vessels.solve_surface_position(icao).is_err());
    }

    #[test]
    fn test_cpr_history_length_one_is_unsolved() {
        let vessels = Vessels::new();
        let icao = [0x11, 0x22, 0x33];
        vessels.get_or_create(icao);
        vessels.store_airborne_cpr(icao, 1000, 2000, CprParity::Even);
        assert!(vessels.solve_airborne_position(icao).is_err());
    }

    #[test]
    fn test_eviction_removes_stale_record() {
        let vessels = Vessels::new();
        let icao = [0x11, 0x22, 0x33];
        let record = vessels.get_or_create(icao);
        // Backdate last_updated well past the eviction threshold.
        record.write().unwrap().last_updated =
            Some(Instant::now() - EVICT_AFTER - Duration::from_secs(1));
        vessels.evict();
        assert_eq!(vessels.len(), 0);
    }

    #[test]
    fn test_eviction_clears_position_but_keeps_record() {
        let vessels = Vessels::new();
        let icao = [0x11, 0x22, 0x33];
        let record = vessels.get_or_create(icao);
        {
            let mut rec = record.write().unwrap();
            rec.touch();
            rec.lat = Some(1.0);
            rec.lon = Some(2.0);
            rec.lat_lon_known = true;
            rec.last_position_data =
                Some(Instant::now() - POSITION_CLEAR_AFTER - Duration::from_secs(1));
        }
        vessels.evict();
        assert_eq!(vessels.len(), 1);
        assert!(!record.read().unwrap().lat_lon_known);
    }
}
