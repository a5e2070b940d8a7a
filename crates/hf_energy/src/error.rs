use std::fmt;

#[derive(Debug)]
pub enum EnergyError {
    BadIndex(usize, usize),
    BadOffset(usize, usize),
    InteriorLoopTooLarge(usize, usize),
    PartitionOverflow,
}

impl fmt::Display for EnergyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnergyError::BadIndex(i, size) => {
                write!(f, "index {} out of bounds (size {})", i, size)
            }
            EnergyError::BadOffset(offset, size) => {
                write!(f, "offset {} not in [0, {})", offset, size)
            }
            EnergyError::InteriorLoopTooLarge(got, max) => {
                write!(f, "interior loop of size {} exceeds configured maximum {}", got, max)
            }
            EnergyError::PartitionOverflow => {
                write!(f, "partition function saturated")
            }
        }
    }
}

impl std::error::Error for EnergyError {}
