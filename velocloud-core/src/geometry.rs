//! Polar to Cartesian projection for lidar samples
//!
//! Converts one decoded channel reading (distance, horizontal angle, channel
//! slot) into a Cartesian point plus the scaled range used downstream for
//! color mapping.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::protocol::vlp16::{CHANNELS_PER_BLOCK, LASER_COUNT};

/// Vertical beam angles of the 16 lasers in degrees, in firing order.
///
/// Channel slot `s` within a block maps to laser `s % 16`.
pub const VERTICAL_ANGLES: [f64; LASER_COUNT] = [
    -15.0, 1.0, -13.0, 3.0, -11.0, 5.0, -9.0, 7.0, -7.0, 9.0, -5.0, 11.0, -3.0, 13.0, -1.0, 15.0,
];

/// Raw distance units per coordinate-space length unit
pub const RANGE_SCALE: f64 = 200.0;

/// One projected cloud point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudPoint {
    /// Cartesian position in coordinate-space units
    pub position: Point3<f64>,
    /// Scaled range, also the color-mapping proxy value
    pub range: f64,
}

/// Projects channel readings into Cartesian space.
///
/// The sine and cosine of each channel slot's vertical angle are fixed for
/// the lifetime of the sensor, so they are computed once at construction.
#[derive(Debug, Clone)]
pub struct Projector {
    vertical_sin_cos: [(f64, f64); CHANNELS_PER_BLOCK],
}

impl Projector {
    pub fn new() -> Self {
        let mut vertical_sin_cos = [(0.0, 0.0); CHANNELS_PER_BLOCK];
        for (slot, entry) in vertical_sin_cos.iter_mut().enumerate() {
            *entry = VERTICAL_ANGLES[slot % LASER_COUNT].to_radians().sin_cos();
        }
        Self { vertical_sin_cos }
    }

    /// Project one channel reading.
    ///
    /// `azimuth_deg` is the horizontal angle measured from the sensor's
    /// rotation reference; the vertical angle comes from the channel slot.
    /// Pure and total: a distance of 0 ("no return") projects to the origin.
    pub fn project(&self, distance: u16, azimuth_deg: f64, channel: usize) -> CloudPoint {
        let (v_sin, v_cos) = self.vertical_sin_cos[channel % CHANNELS_PER_BLOCK];
        let (h_sin, h_cos) = azimuth_deg.to_radians().sin_cos();
        let range = distance as f64 / RANGE_SCALE;

        CloudPoint {
            position: Point3::new(range * v_cos * h_cos, range * v_cos * h_sin, range * v_sin),
            range,
        }
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::new()
    }
}
