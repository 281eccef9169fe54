//! Rolling rotation history
//!
//! A capacity-bounded FIFO of per-rotation point batches. One batch is
//! appended per decoded packet; when the buffer is full the single oldest
//! batch is evicted. Consumers read the concatenation of everything
//! retained, oldest first.

use std::collections::VecDeque;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::geometry::CloudPoint;

/// Default number of rotations retained in the history
pub const DEFAULT_HISTORY_CAPACITY: usize = 40000;

/// All points projected from one data packet.
///
/// May be empty when every block of the packet was rejected; an empty batch
/// still occupies one history slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RotationBatch {
    points: Vec<CloudPoint>,
}

impl RotationBatch {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, point: CloudPoint) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[CloudPoint] {
        &self.points
    }
}

impl From<Vec<CloudPoint>> for RotationBatch {
    fn from(points: Vec<CloudPoint>) -> Self {
        Self { points }
    }
}

/// Read-only projection of the retained history.
///
/// `points[i]` pairs with `ranges[i]`; both run oldest rotation first.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudSnapshot {
    pub points: Vec<Point3<f64>>,
    pub ranges: Vec<f64>,
}

/// Bounded FIFO of rotation batches.
///
/// Size never exceeds the capacity fixed at construction; `push` evicts at
/// most the one oldest batch. Single-threaded: callers needing concurrent
/// access must provide their own exclusion.
#[derive(Debug)]
pub struct CloudHistory {
    batches: VecDeque<RotationBatch>,
    capacity: usize,
    retained_points: usize,
}

impl CloudHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            batches: VecDeque::new(),
            capacity,
            retained_points: 0,
        }
    }

    /// Append a batch as the newest rotation, evicting the oldest rotation
    /// if the buffer would otherwise exceed its capacity. Never fails;
    /// empty batches are appended like any other.
    pub fn push(&mut self, batch: RotationBatch) {
        self.retained_points += batch.len();
        self.batches.push_back(batch);
        if self.batches.len() > self.capacity {
            if let Some(evicted) = self.batches.pop_front() {
                self.retained_points -= evicted.len();
            }
        }
    }

    /// Concatenate all retained batches, oldest to newest, into parallel
    /// point and range vectors.
    pub fn snapshot(&self) -> CloudSnapshot {
        let mut points = Vec::with_capacity(self.retained_points);
        let mut ranges = Vec::with_capacity(self.retained_points);
        for batch in &self.batches {
            for point in batch.points() {
                points.push(point.position);
                ranges.push(point.range);
            }
        }
        CloudSnapshot { points, ranges }
    }

    /// Drop every retained rotation immediately.
    pub fn clear(&mut self) {
        self.batches.clear();
        self.retained_points = 0;
    }

    /// Number of retained rotations
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of points across all retained rotations
    pub fn point_count(&self) -> usize {
        self.retained_points
    }
}

impl Default for CloudHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_point_batch(tag: f64) -> RotationBatch {
        let mut batch = RotationBatch::new();
        batch.push(CloudPoint {
            position: Point3::new(tag, 0.0, 0.0),
            range: tag,
        });
        batch
    }

    #[test]
    fn test_snapshot_preserves_append_order() {
        let mut history = CloudHistory::with_capacity(10);

        for i in 0..5 {
            history.push(single_point_batch(i as f64));
        }

        let snapshot = history.snapshot();
        assert_eq!(snapshot.points.len(), 5);
        assert_eq!(snapshot.ranges.len(), 5);
        for i in 0..5 {
            assert_eq!(snapshot.points[i].x, i as f64);
            assert_eq!(snapshot.ranges[i], i as f64);
        }
    }

    #[test]
    fn test_eviction_drops_single_oldest() {
        let mut history = CloudHistory::with_capacity(3);

        for i in 0..4 {
            history.push(single_point_batch(i as f64));
            assert!(history.len() <= 3);
        }

        assert_eq!(history.len(), 3);
        let snapshot = history.snapshot();
        assert_eq!(snapshot.ranges, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_size_never_exceeds_capacity() {
        let mut history = CloudHistory::with_capacity(7);

        for i in 0..50 {
            history.push(single_point_batch(i as f64));
            assert!(history.len() <= history.capacity());
        }

        assert_eq!(history.len(), 7);
        assert_eq!(history.point_count(), 7);
        assert_eq!(history.snapshot().ranges[0], 43.0);
    }

    #[test]
    fn test_empty_batch_occupies_a_slot() {
        let mut history = CloudHistory::with_capacity(2);

        history.push(single_point_batch(1.0));
        history.push(RotationBatch::new());
        history.push(single_point_batch(3.0));

        // The empty rotation is retained; the first batch was evicted
        assert_eq!(history.len(), 2);
        assert_eq!(history.point_count(), 1);
        assert_eq!(history.snapshot().ranges, vec![3.0]);
    }

    #[test]
    fn test_clear_empties_immediately() {
        let mut history = CloudHistory::with_capacity(10);
        for i in 0..5 {
            history.push(single_point_batch(i as f64));
        }

        history.clear();

        assert!(history.is_empty());
        assert_eq!(history.point_count(), 0);
        let snapshot = history.snapshot();
        assert!(snapshot.points.is_empty());
        assert!(snapshot.ranges.is_empty());
    }

    #[test]
    fn test_snapshot_serializes_for_consumers() {
        let mut history = CloudHistory::with_capacity(2);
        history.push(single_point_batch(0.5));

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&history.snapshot()).unwrap()).unwrap();

        assert!(json["points"].is_array());
        assert_eq!(json["points"].as_array().unwrap().len(), 1);
        assert_eq!(json["ranges"][0], 0.5);
    }

    #[test]
    fn test_snapshot_pairs_points_with_ranges() {
        let mut history = CloudHistory::with_capacity(4);
        let mut batch = RotationBatch::new();
        batch.push(CloudPoint {
            position: Point3::new(1.0, 2.0, 3.0),
            range: 0.5,
        });
        batch.push(CloudPoint {
            position: Point3::new(4.0, 5.0, 6.0),
            range: 0.7,
        });
        history.push(batch);

        let snapshot = history.snapshot();

        assert_eq!(snapshot.points.len(), snapshot.ranges.len());
        assert_eq!(snapshot.points[1], Point3::new(4.0, 5.0, 6.0));
        assert_eq!(snapshot.ranges[1], 0.7);
    }
}
