//! Combinatorial enumeration of index subsets.
//!
//! All searches in the engine enumerate k-subsets of pool indices in
//! lexicographic order. The order is what makes tie-breaking reproducible,
//! so parallel searches work on lexicographic *ranks* and reduce by rank
//! instead of relying on the order in which threads finish.

/// Number of ways to choose `k` items from `n`, or `None` on overflow.
///
/// # Example
/// ```
/// use coverage_game_solver::engine::subsets::binomial;
///
/// assert_eq!(binomial(10, 3), Some(120));
/// assert_eq!(binomial(3, 5), Some(0));
/// ```
pub fn binomial(n: usize, k: usize) -> Option<usize> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // Exact at every step: C(n, i + 1) = C(n, i) * (n - i) / (i + 1).
        result = result.checked_mul((n - i) as u128)? / (i as u128 + 1);
    }
    usize::try_from(result).ok()
}

/// The `rank`-th k-subset of `0..n` in lexicographic order.
///
/// `rank` must be below `binomial(n, k)`.
pub fn unrank_combination(n: usize, k: usize, mut rank: usize) -> Vec<usize> {
    let mut combination = Vec::with_capacity(k);
    let mut next = 0;
    for slot in 0..k {
        let remaining = k - slot - 1;
        loop {
            // Subsets that start with `next` at this slot.
            let count = binomial(n - next - 1, remaining).unwrap_or(usize::MAX);
            if rank < count {
                break;
            }
            rank -= count;
            next += 1;
        }
        combination.push(next);
        next += 1;
    }
    combination
}

/// Lazy lexicographic iterator over the k-subsets of `0..n`.
///
/// The iterator is finite and can be restarted with [`Combinations::reset`].
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    k: usize,
    current: Vec<usize>,
    done: bool,
}

impl Combinations {
    /// Enumerate the k-subsets of `0..n`.
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            k,
            current: (0..k).collect(),
            done: k > n,
        }
    }

    /// Rewind to the first subset.
    pub fn reset(&mut self) {
        *self = Self::new(self.n, self.k);
    }

    fn advance(&mut self) {
        let (n, k) = (self.n, self.k);
        // Rightmost slot that can still move right.
        let Some(slot) = (0..k).rev().find(|&i| self.current[i] < n - k + i) else {
            self.done = true;
            return;
        };
        self.current[slot] += 1;
        for i in slot + 1..k {
            self.current[i] = self.current[i - 1] + 1;
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.current.clone();
        self.advance();
        Some(item)
    }
}

/// Indices of the set bits of `mask`, ascending.
pub fn mask_members(mask: u64) -> impl Iterator<Item = usize> {
    (0..u64::BITS as usize).filter(move |&i| mask & (1u64 << i) != 0)
}
