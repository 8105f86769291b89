//! adsb-core: Mode S / ADS-B decode and aircraft state tracking.
//!
//! No async, no I/O — just the BEAST framing protocol, downlink format and
//! BDS register decoders, and the concurrent aircraft state store built on
//! top of them. This crate is the shared core used by `adsb-server` (the
//! ingest pipeline and observer surface).

pub mod altitude;
pub mod bds;
pub mod beast;
pub mod config;
pub mod cpr;
pub mod crc;
pub mod df;
pub mod state;
pub mod types;

// Re-export commonly used types at crate root
pub use bds::{decode_comm_b, decode_extended_squitter, DecodedBdsFrame};
pub use beast::{BeastFrame, Decoder as BeastDecoder, FrameType};
pub use config::Config;
pub use df::DecodedFrame;
pub use state::{AircraftRecord, LatLonMethod, Vessels};
pub use types::*;
