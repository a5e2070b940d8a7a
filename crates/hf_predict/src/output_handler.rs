use hf_interaction::Interaction;

/// Sink for reported interactions (§4.11). `add` is called once per
/// interaction a predictor considers worth reporting; what happens next
/// (store, print, discard) is entirely up to the implementer.
pub trait OutputHandler<'s> {
    fn add(&mut self, interaction: Interaction<'s>);
}

fn sort_key(i: &Interaction<'_>) -> (ordered_float::OrderedEnergy, Vec<(usize, usize)>) {
    (ordered_float::OrderedEnergy(i.energy), i.base_pairs().to_vec())
}

/// Thin `Ord` wrapper so energies (plain `f64`) can sort a `Vec` without
/// pulling in a crate just for this. NaN sorts last; it never legitimately
/// occurs among reported interactions.
mod ordered_float {
    use std::cmp::Ordering;

    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct OrderedEnergy(pub f64);

    impl Eq for OrderedEnergy {}

    impl PartialOrd for OrderedEnergy {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Ord for OrderedEnergy {
        fn cmp(&self, other: &Self) -> Ordering {
            self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
        }
    }
}

/// Bounded, sorted (by energy then lexicographic bp order) container of
/// at most `max_to_store` interactions; exact duplicates (same bp list
/// and energy) are dropped.
pub struct OutputHandlerInteractionList<'s> {
    max_to_store: usize,
    items: Vec<Interaction<'s>>,
}

impl<'s> OutputHandlerInteractionList<'s> {
    pub fn new(max_to_store: usize) -> Self {
        OutputHandlerInteractionList { max_to_store, items: Vec::new() }
    }

    pub fn items(&self) -> &[Interaction<'s>] { &self.items }

    pub fn best(&self) -> Option<&Interaction<'s>> { self.items.first() }
}

impl<'s> OutputHandler<'s> for OutputHandlerInteractionList<'s> {
    fn add(&mut self, interaction: Interaction<'s>) {
        let key = sort_key(&interaction);
        if self.items.iter().any(|existing| sort_key(existing) == key) {
            return;
        }
        let pos = self.items.partition_point(|existing| sort_key(existing) < key);
        self.items.insert(pos, interaction);
        self.items.truncate(self.max_to_store);
    }
}

/// Forwards every reported interaction to several handlers at once.
/// Interactions are cloned for every forward but the last.
pub struct OutputHandlerHub<'s, 'h> {
    handlers: Vec<&'h mut dyn OutputHandler<'s>>,
}

impl<'s, 'h> OutputHandlerHub<'s, 'h> {
    pub fn new(handlers: Vec<&'h mut dyn OutputHandler<'s>>) -> Self {
        OutputHandlerHub { handlers }
    }
}

impl<'s, 'h> OutputHandler<'s> for OutputHandlerHub<'s, 'h> {
    fn add(&mut self, interaction: Interaction<'s>) {
        let Some((last, rest)) = self.handlers.split_last_mut() else {
            return;
        };
        for handler in rest {
            handler.add(interaction.clone());
        }
        last.add(interaction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_structure::RnaSequence;

    fn interaction<'s>(seq1: &'s RnaSequence, seq2: &'s RnaSequence, bps: &[(usize, usize)], energy: f64) -> Interaction<'s> {
        let mut i = Interaction::new(seq1, seq2);
        for &(a, b) in bps {
            i.push_bp(a, b);
        }
        i.energy = energy;
        i
    }

    #[test]
    fn list_stays_sorted_and_bounded() {
        let s1 = RnaSequence::new("q", "GGGG").unwrap();
        let s2 = RnaSequence::new("t", "CCCC").unwrap();
        let mut list = OutputHandlerInteractionList::new(2);
        list.add(interaction(&s1, &s2, &[(0, 0)], -1.0));
        list.add(interaction(&s1, &s2, &[(0, 0), (1, 1)], -2.0));
        list.add(interaction(&s1, &s2, &[(2, 2)], -1.0));
        assert_eq!(list.items().len(), 2);
        assert_eq!(list.best().unwrap().energy, -2.0);
    }

    #[test]
    fn list_drops_exact_duplicates() {
        let s1 = RnaSequence::new("q", "GGGG").unwrap();
        let s2 = RnaSequence::new("t", "CCCC").unwrap();
        let mut list = OutputHandlerInteractionList::new(10);
        list.add(interaction(&s1, &s2, &[(0, 0)], -1.0));
        list.add(interaction(&s1, &s2, &[(0, 0)], -1.0));
        assert_eq!(list.items().len(), 1);
    }

    #[test]
    fn hub_forwards_to_every_handler() {
        let s1 = RnaSequence::new("q", "GGGG").unwrap();
        let s2 = RnaSequence::new("t", "CCCC").unwrap();
        let mut a = OutputHandlerInteractionList::new(10);
        let mut b = OutputHandlerInteractionList::new(10);
        {
            let mut hub = OutputHandlerHub::new(vec![&mut a, &mut b]);
            hub.add(interaction(&s1, &s2, &[(0, 0)], -1.0));
        }
        assert_eq!(a.items().len(), 1);
        assert_eq!(b.items().len(), 1);
    }
}
