use rand::{seq::SliceRandom, Rng};

use crate::models::question::Question;

/// Picks up to `count` distinct questions in random order.
///
/// The whole pool is shuffled and the first `count` kept, so the result never
/// repeats a candidate and never pads a short pool.
pub fn sample<R>(mut candidates: Vec<Question>, count: usize, rng: &mut R) -> Vec<Question>
where
    R: Rng + ?Sized,
{
    candidates.shuffle(rng);
    candidates.truncate(count);
    candidates
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::models::question::{test_question, OptionKey, Topic};

    fn pool(size: usize) -> Vec<Question> {
        (0..size)
            .map(|i| test_question(&format!("q{}", i), Topic::Quantitative, OptionKey::A))
            .collect()
    }

    fn ids(questions: &[Question]) -> HashSet<String> {
        questions.iter().map(|q| q.id.clone()).collect()
    }

    #[test]
    fn returns_distinct_members_of_pool() {
        let candidates = pool(20);
        let pool_ids = ids(&candidates);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = sample(candidates.clone(), 7, &mut rng);

            assert_eq!(picked.len(), 7);
            let picked_ids = ids(&picked);
            assert_eq!(picked_ids.len(), 7);
            assert!(picked_ids.is_subset(&pool_ids));
        }
    }

    #[test]
    fn oversized_count_returns_whole_pool_once() {
        let candidates = pool(4);
        let mut rng = StdRng::seed_from_u64(7);
        let picked = sample(candidates.clone(), 10, &mut rng);

        assert_eq!(picked.len(), 4);
        assert_eq!(ids(&picked), ids(&candidates));
    }

    #[test]
    fn empty_pool_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sample(Vec::new(), 1, &mut rng).is_empty());
        assert!(sample(Vec::new(), 25, &mut rng).is_empty());
    }

    #[test]
    fn same_seed_reproduces_order() {
        let candidates = pool(12);
        let first = sample(candidates.clone(), 5, &mut StdRng::seed_from_u64(42));
        let second = sample(candidates, 5, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn order_varies_across_seeds() {
        let candidates = pool(12);
        let orders: HashSet<Vec<String>> = (0..10)
            .map(|seed| {
                sample(candidates.clone(), 12, &mut StdRng::seed_from_u64(seed))
                    .into_iter()
                    .map(|q| q.id)
                    .collect()
            })
            .collect();
        assert!(orders.len() > 1);
    }
}
