//! UDP data socket and receive loop.
//!
//! One subsystem owns the socket and the [`CloudEngine`]: datagrams are
//! decoded and appended in arrival order, so the rotation history always
//! matches the order the sensor produced. Anomalies are logged and counted,
//! never fatal.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use serde::Serialize;
use socket2::{Domain, Protocol, Socket, Type};
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tokio_graceful_shutdown::SubsystemHandle;

use velocloud_core::protocol::vlp16::PACKET_SIZE;
use velocloud_core::CloudEngine;

use crate::Cli;

/// Receive buffer size; a data packet is 1206 bytes, anything longer is
/// truncated to one packet before decoding.
const RECV_BUFFER_SIZE: usize = 2048;

#[derive(Error, Debug)]
pub enum ReceiverError {
    #[error("I/O operation failed")]
    Io(#[from] std::io::Error),
    #[error("Cannot bind UDP port {port}")]
    BindFailed {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// One line of the `--output` stream, emitted per appended rotation.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationRecord {
    pub rotation: u64,
    pub points: usize,
    pub skipped_blocks: usize,
    pub retained_rotations: usize,
    pub retained_points: usize,
}

/// Create the data socket: reusable address, nonblocking, bound to all
/// interfaces on `port`, then converted to a tokio socket.
fn bind_data_socket(port: u16) -> Result<UdpSocket, ReceiverError> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;

    socket.set_nonblocking(true)?;
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    {
        socket.set_reuse_port(true)?;
    }

    let bind_addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);
    socket
        .bind(&bind_addr.into())
        .map_err(|source| ReceiverError::BindFailed { port, source })?;

    let std_socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_socket)?)
}

/// Truncate an oversized datagram to exactly one data packet.
///
/// The sensor pads nothing, but capture replays and chatty senders can
/// deliver trailing bytes; only the first 1206 are the packet. Short
/// datagrams pass through unchanged so the decoder counts the rejection.
fn clamp_datagram(datagram: &[u8]) -> &[u8] {
    if datagram.len() >= PACKET_SIZE {
        &datagram[..PACKET_SIZE]
    } else {
        datagram
    }
}

/// UDP receive subsystem.
pub struct Receiver {
    port: u16,
    stats_interval: u64,
    output: bool,
    engine: CloudEngine,
}

impl Receiver {
    pub fn new(args: &Cli) -> Self {
        Self {
            port: args.port,
            stats_interval: args.stats_interval,
            output: args.output,
            engine: CloudEngine::new(args.capacity),
        }
    }

    /// Receive until shutdown is requested.
    pub async fn run(mut self, subsys: SubsystemHandle) -> Result<(), ReceiverError> {
        let socket = bind_data_socket(self.port)?;
        log::info!("Listening for sensor data on {}", socket.local_addr()?);

        let period = Duration::from_secs(self.stats_interval.max(1));
        let mut stats_timer = tokio::time::interval_at(Instant::now() + period, period);
        let mut buf = [0u8; RECV_BUFFER_SIZE];

        loop {
            tokio::select! {
                _ = subsys.on_shutdown_requested() => break,
                _ = stats_timer.tick() => self.log_stats(),
                received = socket.recv_from(&mut buf) => {
                    let (len, _addr) = received?;
                    self.handle_datagram(&buf[..len]);
                }
            }
        }

        let stats = self.engine.stats();
        log::info!(
            "Receiver stopping: {} rotations ingested, {} points retained",
            stats.rotations,
            self.engine.history().point_count()
        );
        Ok(())
    }

    fn handle_datagram(&mut self, datagram: &[u8]) {
        match self.engine.ingest(clamp_datagram(datagram)) {
            Ok(summary) => {
                if summary.skipped_blocks > 0 {
                    log::debug!(
                        "Rotation {}: {} blocks skipped for bad headers",
                        summary.rotation,
                        summary.skipped_blocks
                    );
                }
                if self.output {
                    let record = RotationRecord {
                        rotation: summary.rotation,
                        points: summary.points,
                        skipped_blocks: summary.skipped_blocks,
                        retained_rotations: self.engine.history().len(),
                        retained_points: self.engine.history().point_count(),
                    };
                    if let Ok(line) = serde_json::to_string(&record) {
                        println!("{}", line);
                    }
                }
            }
            Err(e) => log::warn!("Discarded datagram: {}", e),
        }
    }

    fn log_stats(&self) {
        let stats = self.engine.stats();
        log::info!(
            "Ingest: {} packets ok, {} rejected, {} blocks skipped, {} rotations retained ({} points)",
            stats.packets_accepted,
            stats.packets_rejected,
            stats.blocks_skipped,
            self.engine.history().len(),
            self.engine.history().point_count()
        );
    }
}
