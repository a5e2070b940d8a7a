use crate::{IndexRange, IndexRangeList, StructureError};

/// Per-position annotation parsed from a dot-bracket-like string over
/// `{ . ( ) x b | }`. `(`/`)` are accepted but treated as unconstrained by
/// the core (the external fold back-end may give them meaning).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessibilityConstraint {
    length: usize,
    max_bp_span: usize,
    blocked: IndexRangeList,
    accessible: IndexRangeList,
    paired: IndexRangeList,
}

impl AccessibilityConstraint {
    pub fn unconstrained(length: usize, max_bp_span: usize) -> Self {
        AccessibilityConstraint {
            length,
            max_bp_span,
            blocked: IndexRangeList::new(),
            accessible: IndexRangeList::new(),
            paired: IndexRangeList::new(),
        }
    }

    pub fn parse(s: &str, max_bp_span: usize) -> Result<Self, StructureError> {
        let mut blocked = IndexRangeList::new();
        let mut accessible = IndexRangeList::new();
        let mut paired = IndexRangeList::new();

        let mut run_start: Option<(char, usize)> = None;
        let chars: Vec<char> = s.chars().collect();

        let flush = |run: Option<(char, usize)>, end: usize,
                     blocked: &mut IndexRangeList, accessible: &mut IndexRangeList, paired: &mut IndexRangeList| {
            if let Some((c, start)) = run {
                let range = IndexRange::new(start, end - 1);
                match c {
                    'b' => blocked.push_back(range),
                    'x' => accessible.push_back(range),
                    '|' => paired.push_back(range),
                    _ => {}
                }
            }
        };

        for (i, &c) in chars.iter().enumerate() {
            if !matches!(c, '.' | '(' | ')' | 'x' | 'b' | '|') {
                return Err(StructureError::InvalidToken(c, i));
            }
            let marked = matches!(c, 'x' | 'b' | '|');
            match run_start {
                Some((rc, _)) if marked && rc == c => {}
                _ => {
                    flush(run_start.take(), i, &mut blocked, &mut accessible, &mut paired);
                    if marked {
                        run_start = Some((c, i));
                    }
                }
            }
        }
        flush(run_start.take(), chars.len(), &mut blocked, &mut accessible, &mut paired);

        Ok(AccessibilityConstraint {
            length: chars.len(),
            max_bp_span,
            blocked,
            accessible,
            paired,
        })
    }

    pub fn length(&self) -> usize { self.length }
    pub fn max_bp_span(&self) -> usize { self.max_bp_span }
    pub fn blocked(&self) -> &IndexRangeList { &self.blocked }
    pub fn accessible(&self) -> &IndexRangeList { &self.accessible }
    pub fn paired(&self) -> &IndexRangeList { &self.paired }

    pub fn is_marked_blocked(&self, i: usize) -> bool { self.blocked.covers(i) }
    pub fn is_marked_accessible(&self, i: usize) -> bool { self.accessible.covers(i) }
    pub fn is_marked_paired(&self, i: usize) -> bool { self.paired.covers(i) }

    pub fn is_unconstrained(&self, i: usize) -> bool {
        !self.is_marked_blocked(i) && !self.is_marked_accessible(i) && !self.is_marked_paired(i)
    }

    pub fn is_accessible(&self, i: usize) -> bool {
        !self.is_marked_blocked(i) && !self.is_marked_paired(i)
    }

    /// Maps position `i` onto the back-end's reduced alphabet: `x`/`b`
    /// both render as `x`, `|` stays `|`, anything else is `.`.
    pub fn get_vrna_dot_bracket(&self, i: usize) -> char {
        if self.is_marked_paired(i) {
            '|'
        } else if self.is_marked_blocked(i) || self.is_marked_accessible(i) {
            'x'
        } else {
            '.'
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s6_scenario_from_spec() {
        let c = AccessibilityConstraint::parse("xxxbbbxxx", 0).unwrap();
        assert_eq!(c.accessible().to_string_1based(), "1-3,7-9");
        assert_eq!(c.blocked().to_string_1based(), "4-6");
        assert!(!c.is_accessible(4));
        assert!(c.is_marked_accessible(7));
    }

    #[test]
    fn parens_are_unconstrained() {
        let c = AccessibilityConstraint::parse("(...)", 0).unwrap();
        assert!(c.is_unconstrained(0));
        assert!(c.is_unconstrained(4));
    }

    #[test]
    fn rejects_invalid_token() {
        let err = AccessibilityConstraint::parse("..z..", 0).unwrap_err();
        assert!(matches!(err, StructureError::InvalidToken('z', 2)));
    }

    #[test]
    fn vrna_rendering_collapses_x_and_b() {
        let c = AccessibilityConstraint::parse("xb|.", 0).unwrap();
        assert_eq!(c.get_vrna_dot_bracket(0), 'x');
        assert_eq!(c.get_vrna_dot_bracket(1), 'x');
        assert_eq!(c.get_vrna_dot_bracket(2), '|');
        assert_eq!(c.get_vrna_dot_bracket(3), '.');
    }
}
