use core::cmp::Ordering;

/// Indices of `keys` ordered by key descending.
/// - Equal keys keep ascending index order (deterministic tie-break)
/// - NaN keys are placed last, in index order
///
/// Complexity: O(n log n)
#[inline]
pub fn argsort_desc(keys: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();

    // Small sizes: insertion sort avoids the merge sort scratch buffer.
    if keys.len() <= 16 {
        insertion_argsort_desc(keys, &mut order);
        return order;
    }

    // sort_by は安定ソートなので同値は元のインデックス順のまま
    order.sort_by(|&a, &b| cmp_desc(keys[a], keys[b]));
    order
}

#[inline(always)]
fn cmp_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Tiny stable insertion sort for small n.
#[inline(always)]
fn insertion_argsort_desc(keys: &[f64], order: &mut [usize]) {
    for i in 1..order.len() {
        let mut j = i;
        while j > 0 && cmp_desc(keys[order[j]], keys[order[j - 1]]) == Ordering::Less {
            order.swap(j, j - 1);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Compare with a baseline that sorts (key desc, index asc) explicitly.
    fn baseline(keys: &[f64]) -> Vec<usize> {
        let mut pairs: Vec<(f64, usize)> = keys.iter().copied().zip(0..).collect();
        pairs.sort_unstable_by(|a, b| cmp_desc(a.0, b.0).then_with(|| a.1.cmp(&b.1)));
        pairs.into_iter().map(|(_, i)| i).collect()
    }

    fn assert_sorted_desc(keys: &[f64], order: &[usize]) {
        for w in order.windows(2) {
            let (a, b) = (keys[w[0]], keys[w[1]]);
            assert!(a >= b || b.is_nan(), "not sorted: {a} before {b}");
            if a == b {
                assert!(w[0] < w[1], "tie not broken by index: {} before {}", w[0], w[1]);
            }
        }
    }

    /// tiny deterministic PRNG (xorshift32)
    struct Rng(u32);
    impl Rng {
        fn new(seed: u32) -> Self { Self(seed) }
        fn next_u32(&mut self) -> u32 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            self.0 = x;
            x
        }
    }

    #[test]
    fn argsort_handles_empty_and_single() {
        assert!(argsort_desc(&[]).is_empty());
        assert_eq!(argsort_desc(&[3.5]), vec![0]);
    }

    #[test]
    fn argsort_breaks_ties_by_index() {
        let keys = [0.0, 1.5, 0.0, 1.5, 0.0];
        assert_eq!(argsort_desc(&keys), vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn argsort_puts_nan_last() {
        let keys = [f64::NAN, 1.0, -1.0, f64::NAN, 2.0];
        assert_eq!(argsort_desc(&keys), vec![4, 1, 2, 0, 3]);
    }

    #[test]
    fn argsort_matches_baseline_many_sizes() {
        let mut rng = Rng::new(0x1234_5678);

        // Test a range of sizes around the insertion sort threshold.
        for &n in &[0usize, 1, 2, 3, 4, 7, 8, 15, 16, 17, 31, 64, 257] {
            // Few distinct values make ties likely.
            let keys: Vec<f64> = (0..n).map(|_| (rng.next_u32() % 7) as f64 - 3.0).collect();

            let order = argsort_desc(&keys);

            assert_sorted_desc(&keys, &order);
            assert_eq!(order, baseline(&keys), "order mismatch at n={n}");
        }
    }
}
