use crate::cancel::CancelSignal;
use crate::cost;
use crate::error::{Error, Result};
use crate::layout::LayoutState;
use crate::matrix::DistanceMatrix;
use crate::optimizer::Adam;
use crate::point::Point;

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Scale applied to every Adam update before it is subtracted from the coordinates.
    pub step_size: f64,
    /// Relative damping added to squared distances before the square root (see [`crate::cost`]).
    pub damping: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    /// Seed for the standard-normal initial layout.
    pub random_seed: u64,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            step_size: 1e-3,
            damping: cost::DEFAULT_DAMPING,
            beta1: Adam::DEFAULT_BETA1,
            beta2: Adam::DEFAULT_BETA2,
            epsilon: Adam::DEFAULT_EPSILON,
            random_seed: 0,
        }
    }
}

impl SolveOptions {
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidOption { name, value })
            }
        };
        let decay = |name: &'static str, value: f64| {
            if (0.0..1.0).contains(&value) {
                Ok(())
            } else {
                Err(Error::InvalidOption { name, value })
            }
        };
        positive("step_size", self.step_size)?;
        positive("damping", self.damping)?;
        decay("beta1", self.beta1)?;
        decay("beta2", self.beta2)?;
        positive("epsilon", self.epsilon)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveState {
    Running,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    /// Completed iterations, i.e. optimizer steps applied to the coordinates.
    pub iterations: usize,
    /// Cost observed at the start of the last completed iteration.
    pub last_cost: Option<f64>,
    pub state: SolveState,
}

impl SolveReport {
    /// Numeric degradation is never raised by the loop itself; this lets callers opt into
    /// treating non-finite output as an error.
    pub fn ensure_finite(&self, points: &[Point]) -> Result<()> {
        match points
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite()))
        {
            Some(point) => Err(Error::NonFiniteCoordinate { point }),
            None => Ok(()),
        }
    }
}

/// State of one solve: target table, coordinates, and optimizer moments.
///
/// Nothing here is shared between solves, so independent solves may run on separate threads.
#[derive(Debug, Clone)]
pub struct Solver {
    desired: DistanceMatrix,
    layout: LayoutState,
    adam: Adam,
    step_size: f64,
    damping: f64,
    state: SolveState,
    iteration: usize,
    last_cost: Option<f64>,
}

impl Solver {
    pub fn new(points: &[Point], options: &SolveOptions) -> Result<Self> {
        let desired = DistanceMatrix::build(points);
        let layout = LayoutState::random(points.len(), options.random_seed);
        Self::from_parts(desired, layout, options)
    }

    /// Starts from an explicit layout instead of a random one.
    pub fn from_parts(
        desired: DistanceMatrix,
        layout: LayoutState,
        options: &SolveOptions,
    ) -> Result<Self> {
        options.validate()?;
        if desired.len() != layout.point_count() {
            return Err(Error::PointCountMismatch {
                expected: desired.len(),
                actual: layout.point_count(),
            });
        }
        let adam = Adam::with_rates(
            layout.coords().len(),
            options.beta1,
            options.beta2,
            options.epsilon,
        );
        Ok(Self {
            desired,
            layout,
            adam,
            step_size: options.step_size,
            damping: options.damping,
            state: SolveState::Running,
            iteration: 0,
            last_cost: None,
        })
    }

    pub fn state(&self) -> SolveState {
        self.state
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    /// Runs one iteration and returns the cost measured before its update.
    pub fn step(&mut self) -> f64 {
        let eval = cost::evaluate(self.layout.coords(), &self.desired, self.damping);
        self.apply(eval)
    }

    fn apply(&mut self, eval: cost::Evaluation) -> f64 {
        let update = self.adam.step(&eval.gradient);
        self.layout.apply_update(&update, self.step_size);
        self.iteration += 1;
        self.last_cost = Some(eval.cost);
        eval.cost
    }

    /// Iterates until `cancel` fires, then writes the coordinates into `points`.
    ///
    /// There is no convergence check: callers decide when to stop, typically from `progress`.
    pub fn run<C, F>(
        mut self,
        points: &mut [Point],
        cancel: &C,
        mut progress: Option<F>,
    ) -> Result<SolveReport>
    where
        C: CancelSignal + ?Sized,
        F: FnMut(usize, f64),
    {
        if points.len() != self.layout.point_count() {
            return Err(Error::PointCountMismatch {
                expected: self.layout.point_count(),
                actual: points.len(),
            });
        }
        tracing::debug!(
            points = points.len(),
            step_size = self.step_size,
            damping = self.damping,
            "distplot solve started"
        );

        while self.state == SolveState::Running {
            if cancel.is_cancelled() {
                self.state = SolveState::Cancelled;
                break;
            }
            let eval = cost::evaluate(self.layout.coords(), &self.desired, self.damping);
            tracing::trace!(iteration = self.iteration, cost = eval.cost);
            if let Some(cb) = progress.as_mut() {
                cb(self.iteration, eval.cost);
            }
            self.apply(eval);
        }

        self.layout.write_back(points);
        let report = SolveReport {
            iterations: self.iteration,
            last_cost: self.last_cost,
            state: self.state,
        };
        tracing::debug!(
            iterations = report.iterations,
            cost = ?report.last_cost,
            finite = self.layout.is_finite(),
            "distplot solve cancelled"
        );
        Ok(report)
    }
}
