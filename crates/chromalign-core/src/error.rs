use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChromalignError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Search window out of bounds on {axis} axis: {detail}")]
    WindowOutOfBounds { axis: char, detail: String },

    #[error("Shift {0} outside [-31, 31]")]
    InvalidShift(i32),

    #[error("Worker pool error: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, ChromalignError>;
