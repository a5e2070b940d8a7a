use std::fmt;

#[derive(Debug)]
pub enum StructureError {
    EmptySequence,
    InvalidChar(char, usize),
    IdMismatch(String, String),
    MalformedRange(String),
    UnorderedRange(usize, usize),
    OutOfBounds(usize, usize),
    InvalidToken(char, usize),
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureError::EmptySequence => write!(f, "sequence must not be empty"),
            StructureError::InvalidChar(c, i) => {
                write!(f, "unsupported nucleotide '{}' at position {}", c, i)
            }
            StructureError::IdMismatch(a, b) => {
                write!(f, "sequence id mismatch: '{}' vs '{}'", a, b)
            }
            StructureError::MalformedRange(s) => {
                write!(f, "malformed index-range encoding: '{}'", s)
            }
            StructureError::UnorderedRange(from, to) => {
                write!(f, "range ({},{}) is not ascending", from, to)
            }
            StructureError::OutOfBounds(i, max) => {
                write!(f, "index {} out of bounds (size {})", i, max)
            }
            StructureError::InvalidToken(c, i) => {
                write!(f, "invalid constraint token '{}' at position {}", c, i)
            }
        }
    }
}

impl std::error::Error for StructureError {}
