//! CloudEngine - decode, project and accumulate in one entry point
//!
//! The engine owns the rotation history and the ingest counters, and is the
//! single place where a raw datagram turns into retained cloud points:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  CloudEngine                                             │
//! │  datagram ─► parse_packet ─► Projector ─► RotationBatch  │
//! │                                              │           │
//! │                                              ▼           │
//! │                                         CloudHistory     │
//! │  IngestStats (packets / blocks / rotations / points)     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! One batch is appended per accepted packet, in arrival order, even when
//! zero points were decoded. The engine is single-threaded; `ingest`,
//! `snapshot` and `clear` all take the same exclusive borrow, so a snapshot
//! can never observe a half-applied append.

use serde::Serialize;

use crate::cloud::{CloudHistory, CloudSnapshot, RotationBatch};
use crate::error::ParseError;
use crate::geometry::Projector;
use crate::protocol::vlp16;

/// Monotonic ingest counters.
///
/// Every anomaly the decoder can see ends up in one of these, so a caller
/// that watches the stats observes each rejected packet and skipped block
/// without any of them interrupting the stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStats {
    /// Packets decoded and turned into a rotation
    pub packets_accepted: u64,
    /// Datagrams rejected for not being exactly one packet long
    pub packets_rejected: u64,
    /// Blocks dropped for a bad header marker
    pub blocks_skipped: u64,
    /// Rotations appended to the history (equals `packets_accepted`)
    pub rotations: u64,
    /// Points projected over the lifetime of the engine
    pub points_projected: u64,
}

/// Outcome of ingesting one datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    /// Rotation number of the appended batch, starting at 1
    pub rotation: u64,
    /// Points projected from this packet
    pub points: usize,
    /// Blocks of this packet dropped for a bad header
    pub skipped_blocks: usize,
}

/// Decoder, projector and rotation history behind one `ingest` call.
#[derive(Debug)]
pub struct CloudEngine {
    projector: Projector,
    history: CloudHistory,
    stats: IngestStats,
}

impl CloudEngine {
    /// Create an engine retaining up to `capacity` rotations.
    pub fn new(capacity: usize) -> Self {
        Self {
            projector: Projector::new(),
            history: CloudHistory::with_capacity(capacity),
            stats: IngestStats::default(),
        }
    }

    /// Decode one datagram, project every sample in decode order (block
    /// order, then channel slot order) and append the resulting batch.
    ///
    /// A wrong-size datagram is counted, rejected and appends nothing; the
    /// caller moves on to the next datagram. Skipped blocks only reduce the
    /// batch, they never fail the call.
    pub fn ingest(&mut self, datagram: &[u8]) -> Result<IngestSummary, ParseError> {
        let packet = match vlp16::parse_packet(datagram) {
            Ok(packet) => packet,
            Err(e) => {
                self.stats.packets_rejected += 1;
                return Err(e);
            }
        };

        let mut batch = RotationBatch::with_capacity(packet.sample_count());
        for block in &packet.blocks {
            for (slot, channel) in block.channels.iter().enumerate() {
                batch.push(
                    self.projector
                        .project(channel.distance, block.azimuth_deg, slot),
                );
            }
        }

        let points = batch.len();
        self.history.push(batch);

        self.stats.packets_accepted += 1;
        self.stats.rotations += 1;
        self.stats.blocks_skipped += packet.skipped_blocks as u64;
        self.stats.points_projected += points as u64;

        Ok(IngestSummary {
            rotation: self.stats.rotations,
            points,
            skipped_blocks: packet.skipped_blocks,
        })
    }

    /// Concatenated view of the retained history, oldest rotation first.
    pub fn snapshot(&self) -> CloudSnapshot {
        self.history.snapshot()
    }

    /// Drop all retained rotations. Counters are lifetime totals and are
    /// not reset.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    pub fn history(&self) -> &CloudHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::vlp16::{
        BLOCKS_PER_PACKET, BLOCK_HEADER, BLOCK_SIZE, CHANNELS_PER_BLOCK, PACKET_SIZE,
    };

    fn valid_packet() -> Vec<u8> {
        let mut data = vec![0u8; PACKET_SIZE];
        for b in 0..BLOCKS_PER_PACKET {
            let offset = b * BLOCK_SIZE;
            data[offset..offset + 2].copy_from_slice(&BLOCK_HEADER);
            let azimuth = (b as u16) * 100;
            data[offset + 2..offset + 4].copy_from_slice(&azimuth.to_le_bytes());
            for c in 0..CHANNELS_PER_BLOCK {
                let ch_offset = offset + 4 + c * 3;
                data[ch_offset..ch_offset + 2].copy_from_slice(&200u16.to_le_bytes());
                data[ch_offset + 2] = 128;
            }
        }
        data
    }

    #[test]
    fn test_ingest_appends_one_rotation() {
        let mut engine = CloudEngine::new(16);

        let summary = engine.ingest(&valid_packet()).unwrap();

        assert_eq!(summary.rotation, 1);
        assert_eq!(summary.points, 384);
        assert_eq!(summary.skipped_blocks, 0);
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.snapshot().points.len(), 384);
        assert_eq!(engine.stats().packets_accepted, 1);
        assert_eq!(engine.stats().points_projected, 384);
    }

    #[test]
    fn test_rejected_datagram_appends_nothing() {
        let mut engine = CloudEngine::new(16);

        let err = engine.ingest(&[0u8; 100]).unwrap_err();

        assert!(matches!(err, ParseError::WrongPacketSize { actual: 100, .. }));
        assert_eq!(engine.history().len(), 0);
        assert_eq!(engine.stats().packets_rejected, 1);
        assert_eq!(engine.stats().rotations, 0);
    }

    #[test]
    fn test_all_blocks_bad_appends_empty_rotation() {
        let mut engine = CloudEngine::new(16);

        let zeroed = vec![0u8; PACKET_SIZE];
        let summary = engine.ingest(&zeroed).unwrap();

        assert_eq!(summary.points, 0);
        assert_eq!(summary.skipped_blocks, BLOCKS_PER_PACKET);
        // The empty rotation still counts
        assert_eq!(summary.rotation, 1);
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.history().point_count(), 0);
        assert_eq!(engine.stats().blocks_skipped, BLOCKS_PER_PACKET as u64);
    }

    #[test]
    fn test_ingest_order_is_arrival_order() {
        let mut engine = CloudEngine::new(16);

        let first = valid_packet();
        let mut second = valid_packet();
        // Give the second packet a distinct distance so its points differ
        second[4..6].copy_from_slice(&400u16.to_le_bytes());

        engine.ingest(&first).unwrap();
        engine.ingest(&second).unwrap();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.points.len(), 768);
        assert_eq!(snapshot.ranges[0], 1.0);
        assert_eq!(snapshot.ranges[384], 2.0);
    }

    #[test]
    fn test_clear_keeps_lifetime_counters() {
        let mut engine = CloudEngine::new(16);
        engine.ingest(&valid_packet()).unwrap();

        engine.clear();

        assert!(engine.snapshot().points.is_empty());
        assert_eq!(engine.history().len(), 0);
        assert_eq!(engine.stats().packets_accepted, 1);
    }

    #[test]
    fn test_capacity_bounds_retained_rotations() {
        let mut engine = CloudEngine::new(3);

        for _ in 0..5 {
            engine.ingest(&valid_packet()).unwrap();
        }

        assert_eq!(engine.history().len(), 3);
        assert_eq!(engine.stats().rotations, 5);
        assert_eq!(engine.snapshot().points.len(), 3 * 384);
    }
}
