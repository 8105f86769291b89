//! BEAST binary framing protocol: byte-stream resync and frame extraction.
//!
//! The wire format is `0x1A <type> <payload...>`, where `0x1A` bytes inside
//! the payload are escaped by doubling. This module turns an arbitrary byte
//! stream (as read off a TCP socket) into a sequence of [`BeastFrame`]s,
//! discarding anything that can't be resynced to a `0x1A`-prefixed frame.

use crate::types::{AdsbError, Result};
use tracing::{debug, trace, warn};

/// The four frame types the BEAST protocol defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    ModeAc,
    ModeSShort,
    ModeSLong,
    SignalLevel,
}

impl FrameType {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x31 => Some(Self::ModeAc),
            0x32 => Some(Self::ModeSShort),
            0x33 => Some(Self::ModeSLong),
            0x34 => Some(Self::SignalLevel),
            _ => None,
        }
    }

    /// Number of undoubled payload bytes following the type byte: a 6-byte
    /// MLAT timestamp, a 1-byte RSSI, and the Mode-A/C or Mode-S message.
    fn payload_len(self) -> Option<usize> {
        match self {
            Self::ModeAc => Some(9),
            Self::ModeSShort => Some(14),
            Self::ModeSLong => Some(21),
            Self::SignalLevel => None,
        }
    }
}

/// A fully reassembled BEAST frame.
#[derive(Debug, Clone)]
pub struct BeastFrame {
    pub frame_type: FrameType,
    pub mlat_timestamp: [u8; 6],
    pub rssi: u8,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncState {
    Unsynced,
    SeenEscape,
    InFrame,
    /// Inside a frame body, just consumed a raw `0x1A` and is waiting to see
    /// whether it's doubled (escaped literal) or a real frame boundary.
    InFramePendingEscape,
}

/// Incrementally decodes a raw (still-escaped) byte stream into
/// [`BeastFrame`]s.
///
/// Feed bytes with [`Decoder::push`]; each call returns any frame that
/// became complete. Bytes that can't be resynced to a frame boundary are
/// discarded and counted, mirroring the upstream reader's resync loop.
#[derive(Debug)]
pub struct Decoder {
    state: SyncState,
    frame_type: Option<FrameType>,
    buf: Vec<u8>,
    discarded: u64,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            state: SyncState::Unsynced,
            frame_type: None,
            buf: Vec::with_capacity(21),
            discarded: 0,
        }
    }

    /// Total bytes discarded while resyncing so far.
    pub fn discarded_byte_count(&self) -> u64 {
        self.discarded
    }

    /// Feed one raw byte of the stream, returning a completed frame if this
    /// byte closed one out.
    pub fn push(&mut self, byte: u8) -> Result<Option<BeastFrame>> {
        match self.state {
            SyncState::Unsynced => {
                if byte == 0x1A {
                    self.state = SyncState::SeenEscape;
                } else {
                    self.discarded += 1;
                }
                Ok(None)
            }
            SyncState::SeenEscape => {
                if let Some(ft) = FrameType::from_byte(byte) {
                    self.frame_type = Some(ft);
                    self.buf.clear();
                    self.state = SyncState::InFrame;
                } else if byte == 0x1A {
                    // Stay synced on a run of escapes.
                } else {
                    self.state = SyncState::Unsynced;
                    self.discarded += 1;
                }
                Ok(None)
            }
            SyncState::InFrame => {
                if byte == 0x1A {
                    self.state = SyncState::InFramePendingEscape;
                    Ok(None)
                } else {
                    self.accumulate(byte)
                }
            }
            SyncState::InFramePendingEscape => {
                if byte == 0x1A {
                    // Doubled 0x1A: a literal escaped byte inside the frame.
                    self.state = SyncState::InFrame;
                    self.accumulate(0x1A)
                } else {
                    // Non-doubled 0x1A: that was a real frame boundary, and
                    // this byte starts the next one. The frame in progress
                    // is incomplete garbage.
                    debug!(
                        got = self.buf.len(),
                        "BEAST frame truncated by unescaped 0x1A"
                    );
                    self.buf.clear();
                    self.frame_type = None;
                    self.state = SyncState::SeenEscape;
                    self.push(byte)
                }
            }
        }
    }

    fn accumulate(&mut self, byte: u8) -> Result<Option<BeastFrame>> {
        let ft = self
            .frame_type
            .expect("InFrame state always carries a frame_type");

        let Some(payload_len) = ft.payload_len() else {
            warn!(?ft, "BEAST frame type not implemented, discarding frame");
            self.state = SyncState::Unsynced;
            self.frame_type = None;
            return Ok(None);
        };

        self.buf.push(byte);

        if self.buf.len() < payload_len {
            return Ok(None);
        }

        let frame_data: Vec<u8> = self.buf.drain(..).collect();
        self.state = SyncState::Unsynced;
        self.frame_type = None;

        let mut mlat = [0u8; 6];
        mlat.copy_from_slice(&frame_data[0..6]);
        let rssi = frame_data[6];
        let data = frame_data[7..].to_vec();

        trace!(?ft, len = data.len(), "BEAST frame decoded");
        Ok(Some(BeastFrame {
            frame_type: ft,
            mlat_timestamp: mlat,
            rssi,
            data,
        }))
    }

    /// Feed a whole chunk of raw stream bytes at once, returning every
    /// frame it completed, in order. Framing errors are logged and treated
    /// as a resync point rather than propagated, matching how a live feed
    /// reader should behave: one bad frame must not kill the connection.
    pub fn push_chunk(&mut self, bytes: &[u8]) -> Vec<BeastFrame> {
        let mut frames = Vec::new();
        for &b in bytes {
            match self.push(b) {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => {}
                Err(err) => {
                    warn!(%err, "BEAST framing error, resyncing");
                }
            }
        }
        frames
    }
}

/// Validate that an unescaped frame body's length matches what its type
/// byte promises, used by callers that receive already-unescaped frames
/// (e.g. from a test fixture) rather than a raw byte stream.
pub fn validate_frame_length(frame_type_byte: u8, body_len: usize) -> Result<FrameType> {
    let ft = FrameType::from_byte(frame_type_byte).ok_or_else(|| {
        AdsbError::FramingFault(format!("unknown BEAST frame type byte {frame_type_byte:#x}"))
    })?;
    let expected = ft
        .payload_len()
        .ok_or_else(|| AdsbError::FramingFault(format!("{ft:?} frame type not implemented")))?;
    if body_len != expected {
        return Err(AdsbError::FramingFault(format!(
            "{ft:?} frame body length {body_len} != expected {expected}"
        )));
    }
    Ok(ft)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_s_short_frame_roundtrip() {
        let mut decoder = Decoder::new();
        let mut stream = vec![0x1A, 0x32];
        stream.extend_from_slice(&[0; 6]); // mlat
        stream.push(0x80); // rssi
        stream.extend_from_slice(&[0x5D, 0x7C, 0x53, 0x4D, 0x0A, 0x00, 0x00]); // 7-byte DF11 payload
        let frames = decoder.push_chunk(&stream);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].frame_type, FrameType::ModeSShort);
        assert_eq!(frames[0].data.len(), 7);
    }

    #[test]
    fn test_discards_garbage_before_escape() {
        let mut decoder = Decoder::new();
        decoder.push_chunk(&[0x00, 0xFF, 0x42]);
        assert_eq!(decoder.discarded_byte_count(), 3);
    }

    #[test]
    fn test_escaped_1a_inside_frame_is_collapsed() {
        let mut decoder = Decoder::new();
        let mut stream = vec![0x1A, 0x32];
        stream.extend_from_slice(&[0; 6]);
        stream.push(0x1A);
        stream.push(0x1A); // doubled 0x1A for rssi byte == 0x1A
        stream.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7]);
        let frames = decoder.push_chunk(&stream);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].rssi, 0x1A);
        assert_eq!(frames[0].data, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_signal_level_frame_type_not_implemented() {
        let mut decoder = Decoder::new();
        let frames = decoder.push_chunk(&[0x1A, 0x34, 0x01, 0x02]);
        assert!(frames.is_empty());
    }

    #[test]
    fn test_unescaped_1a_midframe_resyncs() {
        let mut decoder = Decoder::new();
        // Start a ModeSShort frame, then send an unescaped 0x1A partway
        // through the body followed by a fresh valid frame.
        let mut stream = vec![0x1A, 0x32, 0, 0, 0];
        stream.push(0x1A); // unescaped: truncates the frame in progress
        stream.push(0x32);
        stream.extend_from_slice(&[0; 6]);
        stream.push(0x00);
        stream.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7]);
        let frames = decoder.push_chunk(&stream);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_validate_frame_length_rejects_wrong_length() {
        assert!(validate_frame_length(0x32, 5).is_err());
        assert!(validate_frame_length(0x32, 14).is_ok());
    }
}
