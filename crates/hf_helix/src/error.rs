use std::fmt;

#[derive(Debug)]
pub enum HelixError {
    NoFeasibleHelix,
    BadIndex(usize, usize),
}

impl fmt::Display for HelixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HelixError::NoFeasibleHelix => write!(f, "no feasible helix within the queried range"),
            HelixError::BadIndex(i, size) => write!(f, "index {} out of bounds (size {})", i, size),
        }
    }
}

impl std::error::Error for HelixError {}
