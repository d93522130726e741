//! In-place uniform shuffling.

use rand::Rng;

/// Shuffles `items` in place with the Durstenfeld variant of Fisher-Yates.
///
/// Every permutation is equally likely given a uniform `rng`.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_is_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let original: Vec<u32> = (0..100).collect();
        let mut items = original.clone();

        shuffle(&mut items, &mut rng);

        assert_ne!(items, original);
        items.sort_unstable();
        assert_eq!(items, original);
    }

    #[test]
    fn test_empty_and_single() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut empty: Vec<u8> = Vec::new();
        shuffle(&mut empty, &mut rng);
        assert!(empty.is_empty());

        let mut single = vec![42];
        shuffle(&mut single, &mut rng);
        assert_eq!(single, vec![42]);
    }

    #[test]
    fn test_positions_are_uniform() {
        const TRIALS: usize = 60_000;
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts = [[0usize; 3]; 3];

        for _ in 0..TRIALS {
            let mut items = [0usize, 1, 2];
            shuffle(&mut items, &mut rng);
            for (position, item) in items.iter().enumerate() {
                counts[*item][position] += 1;
            }
        }

        let expected = TRIALS / 3;
        let tolerance = expected / 20;
        for row in counts {
            for count in row {
                assert!(
                    count.abs_diff(expected) < tolerance,
                    "count {count} too far from {expected}"
                );
            }
        }
    }
}
