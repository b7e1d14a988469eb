use crate::error::{Error, Result};
use crate::point::Point;
use nalgebra as na;

/// Target distances, row `i` column `j` holding what point `i` wants its distance to `j` to be.
///
/// The table is used as given. It is not symmetrized, so callers that store different values for
/// `i -> j` and `j -> i` get a layout that compromises between the two.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: na::DMatrix<f64>,
}

impl DistanceMatrix {
    /// Missing neighbors default to a target of 0. Neighbor indices outside `points` are skipped.
    pub fn build(points: &[Point]) -> Self {
        let n = points.len();
        let mut data = na::DMatrix::<f64>::zeros(n, n);
        let mut skipped = 0usize;
        for (i, p) in points.iter().enumerate() {
            for (&j, &d) in &p.distances {
                if j < n {
                    data[(i, j)] = d;
                } else {
                    skipped += 1;
                }
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, points = n, "ignored distances to unknown neighbors");
        }
        Self { data }
    }

    pub fn from_matrix(data: na::DMatrix<f64>) -> Result<Self> {
        if !data.is_square() {
            return Err(Error::NonSquareMatrix {
                rows: data.nrows(),
                cols: data.ncols(),
            });
        }
        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[(i, j)]
    }

    pub fn as_matrix(&self) -> &na::DMatrix<f64> {
        &self.data
    }
}
