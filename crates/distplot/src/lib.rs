#![forbid(unsafe_code)]

//! Lays points out on a plane so that their pairwise Euclidean distances approximate a table of
//! target distances (gradient-based metric MDS).
//!
//! `distplot` is used by `klvis` to place language models by their pairwise divergences; the
//! resulting coordinates are drawn by `scatterdraw`.

pub mod cancel;
pub mod cost;
pub mod error;
pub mod layout;
pub mod matrix;
pub mod optimizer;
pub mod point;
mod rng;
pub mod solve;

pub use cancel::{CancelSignal, CancelToken};
pub use cost::Evaluation;
pub use error::{Error, Result};
pub use layout::LayoutState;
pub use matrix::DistanceMatrix;
pub use optimizer::Adam;
pub use point::Point;
pub use solve::{SolveOptions, SolveReport, SolveState, Solver};

/// Solves until `cancel` fires, writing the final coordinates into `points`.
///
/// `progress`, when given, is called with `(iteration, cost)` once per iteration, before the
/// gradient step of that iteration.
pub fn solve<C, F>(
    points: &mut [Point],
    cancel: &C,
    progress: Option<F>,
    options: &SolveOptions,
) -> Result<SolveReport>
where
    C: CancelSignal + ?Sized,
    F: FnMut(usize, f64),
{
    Solver::new(points, options)?.run(points, cancel, progress)
}
