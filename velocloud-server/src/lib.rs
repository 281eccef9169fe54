//! # Velocloud Server
//!
//! Native UDP ingest daemon for the Velodyne VLP-16 lidar.
//!
//! The server binds the sensor's data port, feeds every datagram through
//! [`velocloud_core::CloudEngine`] and keeps the rolling rotation history
//! that downstream consumers read. Decode anomalies never stop the stream:
//! a malformed datagram is counted and logged, and the loop moves on.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 velocloud-server                    │
//! │  ┌───────────────┐      ┌─────────────────────────┐ │
//! │  │ UDP socket    │ ──►  │ CloudEngine             │ │
//! │  │ (socket2 +    │      │  decode → project →     │ │
//! │  │  tokio)       │      │  rolling history        │ │
//! │  └───────────────┘      └─────────────────────────┘ │
//! │          │                         │                │
//! │          ▼                         ▼                │
//! │   periodic stats log        --output JSON lines     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example: Starting the Server
//!
//! ```rust,no_run
//! use clap::Parser;
//! use std::time::Duration;
//! use tokio_graceful_shutdown::{SubsystemBuilder, Toplevel};
//! use velocloud_server::{receiver::Receiver, Cli};
//!
//! #[tokio::main]
//! async fn main() {
//!     let args = Cli::parse_from(["velocloud-server", "-p", "2368"]);
//!
//!     Toplevel::new(move |s| async move {
//!         let receiver = Receiver::new(&args);
//!         s.start(SubsystemBuilder::new("Receiver", move |h| receiver.run(h)));
//!     })
//!     .catch_signals()
//!     .handle_shutdown_requests(Duration::from_secs(5))
//!     .await
//!     .unwrap();
//! }
//! ```

use clap::Parser;
use velocloud_core::DEFAULT_HISTORY_CAPACITY;

pub mod receiver;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default UDP data port of the VLP-16
pub const DEFAULT_DATA_PORT: u16 = 2368;

#[derive(Parser, Clone, Debug)]
#[command(version, about)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// UDP port to receive sensor data on
    #[arg(short, long, default_value_t = DEFAULT_DATA_PORT)]
    pub port: u16,

    /// Number of rotations to retain in the rolling history
    #[arg(short, long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    pub capacity: usize,

    /// Seconds between periodic ingest statistics log lines
    #[arg(long, default_value_t = 10)]
    pub stats_interval: u64,

    /// Write one JSON summary line per rotation to stdout
    #[arg(long, default_value_t = false)]
    pub output: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let args = Cli::parse_from(["velocloud-server"]);

        assert_eq!(args.port, 2368);
        assert_eq!(args.capacity, 40000);
        assert_eq!(args.stats_interval, 10);
        assert!(!args.output);
    }

    #[test]
    fn test_cli_overrides() {
        let args = Cli::parse_from([
            "velocloud-server",
            "-p",
            "9999",
            "--capacity",
            "100",
            "--output",
        ]);

        assert_eq!(args.port, 9999);
        assert_eq!(args.capacity, 100);
        assert!(args.output);
    }
}
