//! Sensor wire protocol implementations.
//!
//! This module contains wire format parsing for the supported lidar sensors.
//! All functions are pure `&[u8]` → `Result<T>` with no I/O, so the same code
//! runs in the native server, in tests, and against recorded captures.

pub mod vlp16;
