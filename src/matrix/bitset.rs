use serde::{Deserialize, Serialize};

const WORD_BITS: usize = 64;

/// Fixed-capacity set of small indices packed into 64-bit words.
///
/// Two sets only compare meaningfully when they share a capacity; every
/// row of a `CoverageMatrix` does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitSet {
    words: Vec<u64>,
    capacity: usize,
}

impl BitSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(WORD_BITS)],
            capacity,
        }
    }

    pub fn from_indices(capacity: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::new(capacity);
        for i in indices {
            set.insert(i);
        }
        set
    }

    #[inline(always)]
    pub fn insert(&mut self, i: usize) {
        debug_assert!(i < self.capacity, "bit {} out of range {}", i, self.capacity);
        self.words[i / WORD_BITS] |= 1u64 << (i % WORD_BITS);
    }

    #[inline(always)]
    pub fn contains(&self, i: usize) -> bool {
        i < self.capacity && self.words[i / WORD_BITS] & (1u64 << (i % WORD_BITS)) != 0
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn union_with(&mut self, other: &BitSet) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= b;
        }
    }

    /// Number of members of `other` not already in `self`.
    #[inline(always)]
    pub fn count_new(&self, other: &BitSet) -> usize {
        self.words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (b & !a).count_ones() as usize)
            .sum()
    }

    #[inline(always)]
    pub fn is_subset(&self, other: &BitSet) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .all(|(a, b)| a & !b == 0)
    }

    /// Proper subset: contained in `other` and not equal to it.
    pub fn is_strict_subset(&self, other: &BitSet) -> bool {
        self.is_subset(other) && self.words != other.words
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            let mut w = word;
            std::iter::from_fn(move || {
                if w == 0 {
                    return None;
                }
                let bit = w.trailing_zeros() as usize;
                w &= w - 1;
                Some(wi * WORD_BITS + bit)
            })
        })
    }

    /// Keeps only the listed positions, renumbered in list order.
    pub fn project(&self, keep: &[usize]) -> BitSet {
        BitSet::from_indices(
            keep.len(),
            keep.iter()
                .enumerate()
                .filter(|&(_, &old)| self.contains(old))
                .map(|(new, _)| new),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_iterate_across_words() {
        let set = BitSet::from_indices(130, [0, 63, 64, 129]);
        assert_eq!(set.len(), 4);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 63, 64, 129]);
        assert!(set.contains(64));
        assert!(!set.contains(65));
        assert!(!set.contains(500));
    }

    #[test]
    fn test_subset_relations() {
        let small = BitSet::from_indices(10, [1, 3]);
        let big = BitSet::from_indices(10, [1, 3, 7]);
        assert!(small.is_subset(&big));
        assert!(small.is_strict_subset(&big));
        assert!(!big.is_subset(&small));
        assert!(big.is_subset(&big));
        assert!(!big.is_strict_subset(&big));
        assert_eq!(small.count_new(&big), 1);
    }

    #[test]
    fn test_project_renumbers() {
        let set = BitSet::from_indices(6, [0, 2, 5]);
        let projected = set.project(&[5, 1, 2]);
        assert!(!projected.contains(3));
        assert_eq!(projected.iter().collect::<Vec<_>>(), vec![0, 2]);
    }
}
