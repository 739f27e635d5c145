//! Uniformly random permutation of the playback order.

use rand::seq::SliceRandom;
use rand::Rng;

/// Return `items` in a uniformly random order (Fisher-Yates).
///
/// Every permutation is equally likely. The RNG is injected so the order
/// is deterministic under a seeded generator.
pub fn shuffled<T, R: Rng>(mut items: Vec<T>, rng: &mut R) -> Vec<T> {
    items.shuffle(rng);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn same_seed_gives_same_order() {
        let items: Vec<u32> = (0..16).collect();

        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);

        assert_eq!(
            shuffled(items.clone(), &mut rng_a),
            shuffled(items, &mut rng_b)
        );
    }

    #[test]
    fn preserves_elements() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut result = shuffled(vec![3, 1, 4, 1, 5, 9], &mut rng);
        result.sort_unstable();
        assert_eq!(result, vec![1, 1, 3, 4, 5, 9]);
    }

    #[test]
    fn four_items_cover_all_orderings_roughly_uniformly() {
        // 4 items have 24 permutations; over 1000 shuffles each should
        // appear with frequency near 1000/24 ~= 42.
        let mut counts: HashMap<Vec<u8>, u32> = HashMap::new();

        for seed in 0..1000u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let order = shuffled(vec![0u8, 1, 2, 3], &mut rng);
            *counts.entry(order).or_default() += 1;
        }

        assert_eq!(counts.len(), 24, "every ordering should occur");
        for (order, count) in &counts {
            assert!(
                (10..=100).contains(count),
                "ordering {order:?} occurred {count} times, expected near 42"
            );
        }
    }
}
