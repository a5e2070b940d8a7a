use std::fmt;

#[derive(Debug)]
pub enum SeedError {
    NoFeasibleSeed,
    MalformedExplicitSeed(String),
    UnbalancedDotbar(String),
    BadIndex(usize, usize),
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedError::NoFeasibleSeed => write!(f, "no feasible seed within the queried range"),
            SeedError::MalformedExplicitSeed(s) => write!(f, "malformed explicit-seed encoding: '{}'", s),
            SeedError::UnbalancedDotbar(s) => write!(f, "dotbar '{}' is not bp-balanced or does not start/end with '|'", s),
            SeedError::BadIndex(i, size) => write!(f, "index {} out of bounds (size {})", i, size),
        }
    }
}

impl std::error::Error for SeedError {}
