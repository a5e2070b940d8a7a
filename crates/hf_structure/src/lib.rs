mod error;
mod sequence;
mod index_range;
mod accessibility_constraint;

pub use error::*;
pub use sequence::*;
pub use index_range::*;
pub use accessibility_constraint::*;

/// Positions and lengths are 0-based internally, `usize`-sized: sequences
/// of the scale this crate targets (single mRNA/sRNA transcripts) never
/// approach the range where a narrower index type would pay for itself,
/// unlike the nucleic-acid-design tooling this workspace grew out of.
pub type Idx = usize;
