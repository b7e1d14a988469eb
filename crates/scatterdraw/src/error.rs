#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("output size must be at least one pixel")]
    ZeroSize,
    #[error("dot {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
    #[error("{points} points but only {colors} colors")]
    NotEnoughColors { points: usize, colors: usize },
    #[error("failed to allocate a {size}x{size} pixmap")]
    PixmapAllocation { size: u32 },
    #[error("failed to encode PNG: {0}")]
    PngEncode(String),
}

pub type Result<T> = std::result::Result<T, Error>;
