use std::fmt;

#[derive(Debug)]
pub enum PredictError {
    BadIndex(usize, usize),
    /// Ranges handed to `predict()` are not ascending, or extend past the
    /// energy model's bounds.
    BadRange,
    NotImplemented(String),
}

impl fmt::Display for PredictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictError::BadIndex(i, size) => write!(f, "index {} out of bounds (size {})", i, size),
            PredictError::BadRange => write!(f, "prediction range is not ascending or out of bounds"),
            PredictError::NotImplemented(what) => write!(f, "not supported: {}", what),
        }
    }
}

impl std::error::Error for PredictError {}
