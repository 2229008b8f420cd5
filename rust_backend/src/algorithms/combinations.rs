//! Lexicographic k-combination generator over indices.
//!
//! Candidates are sorted brightest-first before enumeration, so combinations
//! come out with the brightest stars first. The generator keeps a single index
//! buffer and advances it in place.

/// Generates every k-subset of `0..n` in lexicographic order.
#[derive(Debug, Clone)]
pub struct IndexCombinations {
    n: usize,
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl IndexCombinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            started: false,
            done: k > n,
        }
    }

    /// Moves to the next combination and borrows it.
    ///
    /// `k = 0` yields a single empty combination.
    pub fn advance(&mut self) -> Option<&[usize]> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(&self.indices);
        }

        let k = self.indices.len();
        // Rightmost position that can still move forward.
        let Some(i) = (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) else {
            self.done = true;
            return None;
        };
        self.indices[i] += 1;
        for j in i + 1..k {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        Some(&self.indices)
    }
}

impl Iterator for IndexCombinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        self.advance().map(<[usize]>::to_vec)
    }
}

/// Binomial coefficient C(n, k), saturating at `u64::MAX`.
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        result = result * (n - i) as u128 / (i + 1) as u128;
        if result > u64::MAX as u128 {
            return u64::MAX;
        }
    }
    result as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinations_complete_and_ordered() {
        let combos: Vec<Vec<usize>> = IndexCombinations::new(5, 3).collect();
        assert_eq!(combos.len(), 10);
        assert_eq!(combos[0], vec![0, 1, 2]);
        assert_eq!(combos[9], vec![2, 3, 4]);
        for w in combos.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn test_zero_k_yields_one_empty_combination() {
        let combos: Vec<Vec<usize>> = IndexCombinations::new(3, 0).collect();
        assert_eq!(combos, vec![Vec::<usize>::new()]);
        let combos: Vec<Vec<usize>> = IndexCombinations::new(0, 0).collect();
        assert_eq!(combos.len(), 1);
    }

    #[test]
    fn test_too_few_items() {
        assert_eq!(IndexCombinations::new(2, 3).count(), 0);
    }

    #[test]
    fn test_k_equals_n() {
        let combos: Vec<Vec<usize>> = IndexCombinations::new(3, 3).collect();
        assert_eq!(combos, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_binomial_matches_enumeration() {
        for n in 0..8 {
            for k in 0..=n + 1 {
                assert_eq!(binomial(n, k), IndexCombinations::new(n, k).count() as u64);
            }
        }
        assert_eq!(binomial(60, 30), 118_264_581_564_861_424);
    }
}
