use std::fmt;
use std::ops::Deref;

use log::warn;
use colored::*;

use crate::StructureError;

#[derive(Clone, Copy, Hash, Debug, Eq, PartialEq)]
pub enum Base { A, C, G, U, N }
pub const BCOUNT: usize = 5;

impl TryFrom<char> for Base {
    type Error = StructureError;
    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'A' => Ok(Base::A),
            'C' => Ok(Base::C),
            'G' => Ok(Base::G),
            'U' | 'T' => Ok(Base::U),
            'N' => Ok(Base::N),
            _ => Err(StructureError::InvalidChar(c, 0)),
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Base::A => 'A',
            Base::C => 'C',
            Base::G => 'G',
            Base::U => 'U',
            Base::N => 'N',
        };
        write!(f, "{}", c)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PairTypeRNA { AU, UA, CG, GC, GU, UG, NN }

const PAIR_LOOKUP: [[PairTypeRNA; BCOUNT]; BCOUNT] = {
    use Base::*;
    use PairTypeRNA::*;
    let mut table = [[NN; BCOUNT]; BCOUNT];
    table[A as usize][U as usize] = AU;
    table[U as usize][A as usize] = UA;
    table[C as usize][G as usize] = CG;
    table[G as usize][C as usize] = GC;
    table[G as usize][U as usize] = GU;
    table[U as usize][G as usize] = UG;
    table
};

impl From<(Base, Base)> for PairTypeRNA {
    fn from(pair: (Base, Base)) -> Self {
        PAIR_LOOKUP[pair.0 as usize][pair.1 as usize]
    }
}

impl PairTypeRNA {
    pub fn can_pair(&self) -> bool {
        self != &PairTypeRNA::NN
    }

    pub fn is_wobble(&self) -> bool {
        matches!(self, PairTypeRNA::GU | PairTypeRNA::UG)
    }
}

/// IUPAC-normalized RNA sequence plus the user-origin/internal index
/// bookkeeping every hybridization component needs to report coordinates
/// back in the caller's frame.
///
/// Internally everything is 0-based; `in_out_offset` is added/subtracted
/// when translating to/from the caller-visible origin (1-based by default,
/// matching the rest of this workspace's I/O convention).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RnaSequence {
    id: String,
    bases: Vec<Base>,
    in_out_offset: isize,
}

impl RnaSequence {
    pub fn new(id: impl Into<String>, raw: &str) -> Result<Self, StructureError> {
        Self::with_origin(id, raw, 1)
    }

    /// `origin` is the caller-visible index of internal position 0 (1 for
    /// the conventional 1-based convention, 0 for already-0-based input).
    pub fn with_origin(id: impl Into<String>, raw: &str, origin: isize) -> Result<Self, StructureError> {
        if raw.is_empty() {
            return Err(StructureError::EmptySequence);
        }
        let mut bases = Vec::with_capacity(raw.len());
        for (i, c) in raw.chars().enumerate() {
            bases.push(Base::try_from(c).map_err(|_| StructureError::InvalidChar(c, i))?);
        }
        Ok(RnaSequence { id: id.into(), bases, in_out_offset: origin })
    }

    /// Like `new`, but IUPAC-invalid characters are reported via `log::warn!`
    /// and converted to `N` rather than failing the whole sequence.
    pub fn from_lossy(id: impl Into<String>, raw: &str) -> Self {
        let bases = raw.chars().map(|c| {
            Base::try_from(c).unwrap_or_else(|_| {
                warn!("{} unsupported nucleotide '{}' -> converted to 'N'", "WARNING:".red(), c);
                Base::N
            })
        }).collect();
        RnaSequence { id: id.into(), bases, in_out_offset: 1 }
    }

    pub fn id(&self) -> &str { &self.id }

    pub fn size(&self) -> usize { self.bases.len() }

    pub fn base_at(&self, i: usize) -> Base { self.bases[i] }

    pub fn char_at(&self, i: usize) -> char {
        format!("{}", self.bases[i]).chars().next().unwrap()
    }

    pub fn are_complementary(&self, other: &RnaSequence, i: usize, j: usize) -> bool {
        PairTypeRNA::from((self.bases[i], other.bases[j])).can_pair()
    }

    pub fn is_gu(&self, other: &RnaSequence, i: usize, j: usize) -> bool {
        PairTypeRNA::from((self.bases[i], other.bases[j])).is_wobble()
    }

    /// Maps an internal 0-based index to the caller-visible origin.
    pub fn get_in_out_index(&self, i: usize) -> isize {
        i as isize + self.in_out_offset
    }

    /// Inverse of `get_in_out_index`.
    pub fn get_index(&self, out_idx: isize) -> usize {
        (out_idx - self.in_out_offset) as usize
    }

    /// `newIdx = size-1-oldIdx`; involutive.
    pub fn get_reversed_index(&self, i: usize) -> usize {
        self.size() - 1 - i
    }
}

impl Deref for RnaSequence {
    type Target = [Base];
    fn deref(&self) -> &Self::Target { &self.bases }
}

impl fmt::Display for RnaSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.bases {
            write!(f, "{}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_displays() {
        let s = RnaSequence::new("q", "ACGUN").unwrap();
        assert_eq!(format!("{}", s), "ACGUN");
        assert_eq!(s.size(), 5);
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(RnaSequence::new("q", ""), Err(StructureError::EmptySequence)));
    }

    #[test]
    fn lossy_warns_and_substitutes() {
        let s = RnaSequence::from_lossy("q", "ACGX");
        assert_eq!(s.base_at(3), Base::N);
    }

    #[test]
    fn in_out_index_round_trips() {
        let s = RnaSequence::new("q", "ACGU").unwrap();
        for i in 0..s.size() {
            assert_eq!(s.get_index(s.get_in_out_index(i)), i);
        }
    }

    #[test]
    fn reversed_index_is_involutive() {
        let s = RnaSequence::new("q", "ACGUACGU").unwrap();
        for i in 0..s.size() {
            assert_eq!(s.get_reversed_index(s.get_reversed_index(i)), i);
        }
    }

    #[test]
    fn complementarity_and_wobble() {
        let s1 = RnaSequence::new("q", "GGGC").unwrap();
        let s2 = RnaSequence::new("t", "GCCU").unwrap();
        assert!(s1.are_complementary(&s2, 0, 1)); // G-C
        assert!(!s1.are_complementary(&s2, 0, 0)); // G-G
        assert!(s1.is_gu(&s2, 0, 3)); // G-U wobble
    }
}
