use crate::error::{Error, Result};
use crate::point::Point;
use crate::rng::XorShift64Star;
use nalgebra as na;
use rand_distr::{Distribution, StandardNormal};

/// Flat coordinate vector `(x0, y0, x1, y1, ...)` owned by one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutState {
    coords: na::DVector<f64>,
}

impl LayoutState {
    /// Every coordinate is an independent standard-normal draw.
    pub fn random(point_count: usize, seed: u64) -> Self {
        let mut rng = XorShift64Star::new(seed);
        let coords =
            na::DVector::<f64>::from_fn(point_count * 2, |_, _| StandardNormal.sample(&mut rng));
        Self { coords }
    }

    /// `coords` must hold whole `(x, y)` pairs.
    pub fn from_coords(coords: na::DVector<f64>) -> Result<Self> {
        if coords.len() % 2 != 0 {
            return Err(Error::OddCoordinateCount { len: coords.len() });
        }
        Ok(Self { coords })
    }

    pub fn point_count(&self) -> usize {
        self.coords.len() / 2
    }

    pub fn coords(&self) -> &na::DVector<f64> {
        &self.coords
    }

    pub fn position(&self, index: usize) -> (f64, f64) {
        (self.coords[index * 2], self.coords[index * 2 + 1])
    }

    /// `coords -= scale * update`.
    pub fn apply_update(&mut self, update: &na::DVector<f64>, scale: f64) {
        self.coords.axpy(-scale, update, 1.0);
    }

    pub fn is_finite(&self) -> bool {
        self.coords.iter().all(|v| v.is_finite())
    }

    pub fn write_back(&self, points: &mut [Point]) {
        debug_assert_eq!(points.len(), self.point_count());
        for (i, p) in points.iter_mut().enumerate() {
            let (x, y) = self.position(i);
            p.x = x;
            p.y = y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LayoutState;
    use crate::error::Error;
    use crate::point::Point;
    use nalgebra as na;

    #[test]
    fn same_seed_same_layout() {
        assert_eq!(LayoutState::random(5, 9), LayoutState::random(5, 9));
        assert_ne!(LayoutState::random(5, 9), LayoutState::random(5, 10));
    }

    #[test]
    fn apply_update_subtracts_scaled_step() {
        let mut state = LayoutState::from_coords(na::DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0]))
            .unwrap();
        let update = na::DVector::from_vec(vec![10.0, -10.0, 0.0, 1.0]);
        state.apply_update(&update, 0.5);
        assert_eq!(state.coords().as_slice(), &[-4.0, 7.0, 3.0, 3.5]);
    }

    #[test]
    fn write_back_copies_pairs_in_order() {
        let state = LayoutState::from_coords(na::DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0]))
            .unwrap();
        let mut points = vec![Point::new(), Point::new()];
        state.write_back(&mut points);
        assert_eq!((points[0].x, points[0].y), (1.0, 2.0));
        assert_eq!((points[1].x, points[1].y), (3.0, 4.0));
    }

    #[test]
    fn odd_coordinate_count_is_rejected() {
        let err =
            LayoutState::from_coords(na::DVector::from_vec(vec![1.0, 2.0, 3.0])).unwrap_err();
        assert!(matches!(err, Error::OddCoordinateCount { len: 3 }));
    }

    #[test]
    fn random_layout_is_finite_and_spread() {
        let state = LayoutState::random(64, 7);
        assert!(state.is_finite());
        let coords = state.coords();
        let mean = coords.sum() / coords.len() as f64;
        assert!(mean.abs() < 0.5, "mean: {mean}");
        assert!(coords.iter().any(|&v| v != coords[0]));
    }
}
