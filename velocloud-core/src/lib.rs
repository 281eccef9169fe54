//! # Velocloud Core
//!
//! Platform-independent protocol and point cloud library for the Velodyne
//! VLP-16 lidar.
//!
//! This crate contains pure parsing and projection logic with **zero I/O
//! dependencies**: decoding fixed-size data packets, projecting channel
//! readings into Cartesian space, and keeping a bounded rolling history of
//! recent rotations.
//!
//! ## Architecture
//!
//! `velocloud-core` is the shared foundation under the native ingest daemon:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  velocloud-core (platform-independent, no tokio/async)     │
//! │  ├── protocol/vlp16  (wire format parsing)                 │
//! │  ├── geometry        (angle table, polar → Cartesian)      │
//! │  ├── cloud           (bounded rotation history)            │
//! │  └── engine          (decode → project → accumulate)       │
//! └────────────────────────────────────────────────────────────┘
//!                            ▲
//!               ┌────────────┴────────────┐
//!               │  velocloud-server       │
//!               │  (tokio UDP receiver)   │
//!               └─────────────────────────┘
//! ```
//!
//! ## Key Modules
//!
//! - [`protocol`] - Wire protocol parsing (1206-byte VLP-16 data packets)
//! - [`geometry`] - Vertical beam angle table and the [`Projector`]
//! - [`cloud`] - [`CloudHistory`], the capacity-bounded rotation FIFO
//! - [`engine`] - [`CloudEngine`], the single datagram-to-history entry point
//!
//! ## Example: Ingesting a Datagram
//!
//! ```rust
//! use velocloud_core::CloudEngine;
//!
//! let mut engine = CloudEngine::new(40000);
//!
//! // Datagram as received from the sensor's UDP data port
//! let datagram = [0u8; 1206];
//! let summary = engine.ingest(&datagram).unwrap();
//!
//! // Every block header was zero, so the rotation is empty but retained
//! assert_eq!(summary.points, 0);
//! assert_eq!(engine.history().len(), 1);
//! ```
//!
//! ## Example: Reading the Cloud
//!
//! ```rust
//! use velocloud_core::{CloudEngine, CloudSnapshot};
//!
//! let engine = CloudEngine::new(40000);
//! let snapshot: CloudSnapshot = engine.snapshot();
//!
//! // points[i] pairs with ranges[i], oldest rotation first
//! assert_eq!(snapshot.points.len(), snapshot.ranges.len());
//! ```

pub mod cloud;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod protocol;

// Re-export commonly used types
pub use cloud::{CloudHistory, CloudSnapshot, RotationBatch, DEFAULT_HISTORY_CAPACITY};
pub use engine::{CloudEngine, IngestStats, IngestSummary};
pub use error::ParseError;
pub use geometry::{CloudPoint, Projector, RANGE_SCALE, VERTICAL_ANGLES};
