use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("grid size must be at least 2, got {size}")]
    InvalidSize { size: usize },
    #[error("target tile must be a power of two between 4 and 2^30, got {target}")]
    InvalidTarget { target: u32 },
    #[error("invalid grid: {reason}")]
    InvalidGrid { reason: String },
    #[error("could not access best score file")]
    Io(#[from] std::io::Error),
    #[error("best score file is corrupt: {0:?}")]
    Parse(String),
}
