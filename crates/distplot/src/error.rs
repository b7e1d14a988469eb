#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid solve option `{name}`: {value}")]
    InvalidOption { name: &'static str, value: f64 },
    #[error("expected {expected} points, got {actual}")]
    PointCountMismatch { expected: usize, actual: usize },
    #[error("point {point} has a non-finite coordinate after solving")]
    NonFiniteCoordinate { point: usize },
    #[error("distance matrix must be square, got {rows}x{cols}")]
    NonSquareMatrix { rows: usize, cols: usize },
    #[error("coordinate vector must hold (x, y) pairs, got {len} values")]
    OddCoordinateCount { len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
