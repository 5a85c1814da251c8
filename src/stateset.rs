//! Dense, fixed-capacity set of graph states.
//!
//! Fixpoint iteration recomputes unions, intersections and equality checks on
//! every round, over graphs with many thousands of states. Packing the set
//! into u64 words makes each of those a short word-parallel loop instead of a
//! hash-set traversal, which is the dominant cost driver for both checkers.

/// A subset of `{0, ..., num_states - 1}` backed by a vector of u64 words.
///
/// The capacity is fixed at construction and equals the number of graph
/// states. Bits at positions `>= num_states` in the last word are always
/// zero; `full` masks them out and no other operation can set them. Equality
/// relies on that invariant to be a plain word-for-word comparison.
#[derive(Debug, Clone)]
pub struct StateSet {
    /// Storage: each u64 holds 64 bits.
    words: Vec<u64>,
    /// Fixed capacity in bits.
    num_states: usize,
}

impl StateSet {
    /// Number of bits per word.
    const BITS_PER_WORD: usize = 64;

    /// Creates a set containing no states.
    pub fn empty(num_states: usize) -> Self {
        let num_words = (num_states + Self::BITS_PER_WORD - 1) / Self::BITS_PER_WORD;
        Self {
            words: vec![0; num_words],
            num_states,
        }
    }

    /// Creates a set containing every state `0..num_states`.
    ///
    /// The trailing bits of the last word stay clear.
    pub fn full(num_states: usize) -> Self {
        let num_words = (num_states + Self::BITS_PER_WORD - 1) / Self::BITS_PER_WORD;
        let mut words = vec![u64::MAX; num_words];
        let offset = num_states % Self::BITS_PER_WORD;
        if offset != 0 {
            words[num_words - 1] = (1u64 << offset) - 1;
        }
        Self { words, num_states }
    }

    /// Returns the capacity in bits.
    #[inline]
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Gets the word index and bit position for a given state index.
    #[inline]
    fn word_and_bit(index: usize) -> (usize, usize) {
        let word = index / Self::BITS_PER_WORD;
        let bit = index % Self::BITS_PER_WORD;
        (word, bit)
    }

    /// Adds a state to the set. No-op if already present.
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_states`.
    #[inline]
    pub fn add(&mut self, index: usize) {
        assert!(index < self.num_states, "state {} out of range", index);
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        self.words[word_idx] |= 1u64 << bit_idx;
    }

    /// Returns true if the state is in the set.
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_states`.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        assert!(index < self.num_states, "state {} out of range", index);
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        (self.words[word_idx] >> bit_idx) & 1 != 0
    }

    /// In-place union: the receiver becomes `self | other`.
    ///
    /// # Panics
    ///
    /// Panics if the capacities differ.
    pub fn union_with(&mut self, other: &StateSet) {
        assert_eq!(self.num_states, other.num_states, "capacity mismatch");
        for (w, o) in self.words.iter_mut().zip(&other.words) {
            *w |= o;
        }
    }

    /// In-place intersection: the receiver becomes `self & other`.
    ///
    /// # Panics
    ///
    /// Panics if the capacities differ.
    pub fn intersect_with(&mut self, other: &StateSet) {
        assert_eq!(self.num_states, other.num_states, "capacity mismatch");
        for (w, o) in self.words.iter_mut().zip(&other.words) {
            *w &= o;
        }
    }

    /// Removes every state, keeping the capacity.
    pub fn clear(&mut self) {
        for word in &mut self.words {
            *word = 0;
        }
    }

    /// Returns true if at least one state is in the set.
    #[inline]
    pub fn any(&self) -> bool {
        self.words.iter().any(|&w| w != 0)
    }

    /// Returns true if no state is in the set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.any()
    }

    /// Returns the number of states in the set.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns an iterator over the states in ascending order.
    pub fn iter(&self) -> StateSetIter<'_> {
        StateSetIter {
            set: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }

    /// Collects the states into a vector. O(num_states); diagnostics only,
    /// never on a hot path.
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }
}

/// Exact bit-for-bit comparison. This is the fixpoint convergence test.
///
/// # Panics
///
/// Panics if the capacities differ; comparing sets over different graphs is
/// a programmer error, not a `false`.
impl PartialEq for StateSet {
    fn eq(&self, other: &Self) -> bool {
        assert_eq!(self.num_states, other.num_states, "capacity mismatch");
        self.words == other.words
    }
}

impl Eq for StateSet {}

/// Iterator over the states in a [`StateSet`].
pub struct StateSetIter<'a> {
    set: &'a StateSet,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for StateSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1; // Clear lowest set bit
                return Some(self.word_idx * StateSet::BITS_PER_WORD + bit_idx);
            }

            self.word_idx += 1;
            if self.word_idx >= self.set.words.len() {
                return None;
            }
            self.current_word = self.set.words[self.word_idx];
        }
    }
}
