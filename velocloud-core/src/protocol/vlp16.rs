//! Velodyne VLP-16 data packet parsing
//!
//! This module contains pure parsing functions for VLP-16 data packets.
//! No I/O operations - just `&[u8]` → `Result<T>` functions.
//!
//! A data packet is exactly 1206 bytes: 12 firing-sequence blocks of 100
//! bytes each, followed by a 6-byte tail (microsecond timestamp and two
//! factory bytes). Each block starts with the marker `0xFF 0xEE`, carries
//! one azimuth in hundredths of a degree, and 32 channel records of
//! (distance, reflectivity). The 16 lasers fire twice per block; both
//! halves share the block azimuth.

use crate::error::ParseError;
use serde::Deserialize;

// =============================================================================
// Constants
// =============================================================================

/// Total size of one data packet in bytes
pub const PACKET_SIZE: usize = 1206;

/// Number of firing-sequence blocks in one packet
pub const BLOCKS_PER_PACKET: usize = 12;

/// Number of channel records in one block (two firings of 16 lasers)
pub const CHANNELS_PER_BLOCK: usize = 32;

/// Number of physical laser channels
pub const LASER_COUNT: usize = 16;

/// Marker bytes at the start of every valid data block
pub const BLOCK_HEADER: [u8; 2] = [0xFF, 0xEE];

/// Size of one channel record in bytes (u16 distance + u8 reflectivity)
pub const CHANNEL_RECORD_SIZE: usize = 3;

/// Azimuth wire values are hundredths of a degree, [0, 36000)
pub const AZIMUTH_SCALE: f64 = 100.0;

/// Factory byte: product model for the VLP-16
pub const PRODUCT_ID_VLP16: u8 = 0x22;

// =============================================================================
// Raw Wire Structures
// =============================================================================

/// One channel record as laid out on the wire
#[derive(Deserialize, Debug, Copy, Clone)]
#[repr(C, packed)]
pub struct RawChannelData {
    pub distance: [u8; 2],
    pub reflectivity: u8,
}

/// One firing-sequence block as laid out on the wire (100 bytes)
#[derive(Deserialize, Debug, Copy, Clone)]
#[repr(C, packed)]
pub struct RawDataBlock {
    pub header: [u8; 2],
    pub azimuth: [u8; 2], // Hundredths of a degree, u16 LE
    pub channels: [RawChannelData; CHANNELS_PER_BLOCK],
}

/// Packet tail as laid out on the wire (6 bytes)
#[derive(Deserialize, Debug, Copy, Clone)]
#[repr(C, packed)]
pub struct RawPacketTail {
    pub timestamp: [u8; 4], // Microseconds since top of hour, u32 LE
    pub return_mode: u8,
    pub product_model: u8,
}

// Sizes
pub const BLOCK_SIZE: usize = std::mem::size_of::<RawDataBlock>();
pub const TAIL_SIZE: usize = std::mem::size_of::<RawPacketTail>();

// =============================================================================
// Return Mode
// =============================================================================

/// Return-mode factory byte of a data packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnMode {
    Strongest,
    LastReturn,
    Dual,
}

impl ReturnMode {
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0x37 => Some(ReturnMode::Strongest),
            0x38 => Some(ReturnMode::LastReturn),
            0x39 => Some(ReturnMode::Dual),
            _ => None,
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            ReturnMode::Strongest => 0x37,
            ReturnMode::LastReturn => 0x38,
            ReturnMode::Dual => 0x39,
        }
    }
}

// =============================================================================
// Parsed Data Structures
// =============================================================================

/// One decoded channel reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSample {
    /// Raw distance in hundredths of a length unit (0 = no return)
    pub distance: u16,
    /// Calibrated reflectivity, 0-255
    pub reflectivity: u8,
}

/// One decoded firing-sequence block
///
/// Channels are in slot order 0..31; `slot % 16` selects the laser and with
/// it the vertical beam angle. All 32 channels share the block azimuth.
#[derive(Debug, Clone)]
pub struct ParsedBlock {
    /// Horizontal rotation angle in degrees, [0, 360)
    pub azimuth_deg: f64,
    pub channels: [ChannelSample; CHANNELS_PER_BLOCK],
}

/// One fully decoded data packet
///
/// Blocks whose header marker did not match are absent from `blocks` and
/// counted in `skipped_blocks`; a corrupt block never rejects the packet.
#[derive(Debug, Clone)]
pub struct ParsedPacket {
    /// Valid blocks in wire order (length ≤ 12)
    pub blocks: Vec<ParsedBlock>,
    /// Number of blocks dropped for a bad header marker
    pub skipped_blocks: usize,
    /// Microseconds since the top of the hour
    pub timestamp_us: u32,
    /// Return-mode factory byte (0x37/0x38/0x39)
    pub return_mode: u8,
    /// Product model factory byte (0x22 for the VLP-16)
    pub product_model: u8,
}

impl ParsedPacket {
    /// Total number of channel samples carried by the valid blocks
    pub fn sample_count(&self) -> usize {
        self.blocks.len() * CHANNELS_PER_BLOCK
    }
}

// =============================================================================
// Parsing Functions
// =============================================================================

/// Parse one firing-sequence block.
///
/// `index` is the block's position within the packet and is only used for
/// error reporting.
pub fn parse_block(data: &[u8], index: usize) -> Result<ParsedBlock, ParseError> {
    if data.len() < BLOCK_SIZE {
        return Err(ParseError::TooShort {
            expected: BLOCK_SIZE,
            actual: data.len(),
        });
    }

    let raw: RawDataBlock = bincode::deserialize(&data[..BLOCK_SIZE])?;

    if raw.header != BLOCK_HEADER {
        return Err(ParseError::InvalidBlockHeader {
            index,
            actual: raw.header,
        });
    }

    let azimuth_deg = u16::from_le_bytes(raw.azimuth) as f64 / AZIMUTH_SCALE;

    let mut channels = [ChannelSample {
        distance: 0,
        reflectivity: 0,
    }; CHANNELS_PER_BLOCK];
    for (slot, raw_channel) in raw.channels.iter().enumerate() {
        channels[slot] = ChannelSample {
            distance: u16::from_le_bytes(raw_channel.distance),
            reflectivity: raw_channel.reflectivity,
        };
    }

    Ok(ParsedBlock {
        azimuth_deg,
        channels,
    })
}

/// Parse the 6-byte packet tail.
pub fn parse_tail(data: &[u8]) -> Result<RawPacketTail, ParseError> {
    if data.len() < TAIL_SIZE {
        return Err(ParseError::TooShort {
            expected: TAIL_SIZE,
            actual: data.len(),
        });
    }

    Ok(bincode::deserialize(&data[..TAIL_SIZE])?)
}

/// Parse one complete data packet.
///
/// The datagram must be exactly [`PACKET_SIZE`] bytes; anything else fails
/// with [`ParseError::WrongPacketSize`] and the caller should discard the
/// datagram and wait for the next one. Blocks with a bad header marker are
/// skipped and counted, never fatal - a single corrupt block must not lose
/// an otherwise valid packet.
pub fn parse_packet(data: &[u8]) -> Result<ParsedPacket, ParseError> {
    if data.len() != PACKET_SIZE {
        return Err(ParseError::WrongPacketSize {
            expected: PACKET_SIZE,
            actual: data.len(),
        });
    }

    let mut blocks = Vec::with_capacity(BLOCKS_PER_PACKET);
    let mut skipped_blocks = 0;

    for index in 0..BLOCKS_PER_PACKET {
        let offset = index * BLOCK_SIZE;
        match parse_block(&data[offset..offset + BLOCK_SIZE], index) {
            Ok(block) => blocks.push(block),
            Err(ParseError::InvalidBlockHeader { .. }) => skipped_blocks += 1,
            Err(e) => return Err(e),
        }
    }

    let tail = parse_tail(&data[BLOCKS_PER_PACKET * BLOCK_SIZE..])?;

    Ok(ParsedPacket {
        blocks,
        skipped_blocks,
        timestamp_us: u32::from_le_bytes(tail.timestamp),
        return_mode: tail.return_mode,
        product_model: tail.product_model,
    })
}
