use rustc_hash::FxHashMap;

/// A data point and the distances it wants to have to its neighbors.
///
/// Neighbors are referenced by their index in the slice handed to the solver. The map may be
/// asymmetric: `a -> b` and `b -> a` are independent entries.
#[derive(Debug, Clone, Default)]
pub struct Point {
    pub distances: FxHashMap<usize, f64>,
    /// Final coordinates, written when a solve terminates.
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper for tests and small fixtures.
    pub fn with_distance(mut self, neighbor: usize, distance: f64) -> Self {
        self.distances.insert(neighbor, distance);
        self
    }

    pub fn set_distance(&mut self, neighbor: usize, distance: f64) {
        self.distances.insert(neighbor, distance);
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}
