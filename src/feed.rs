//! Discovery feed sampling

use rand::seq::SliceRandom;
use rand::Rng;

use crate::memory::MemoryRecord;

/// Default number of memories in a discovery feed
pub const DEFAULT_FEED_SIZE: usize = 4;

/// Uniformly sample up to `count` memories from `candidates`.
///
/// Shuffles the whole candidate list and keeps the head, so every
/// subset of size `count` is equally likely. Calls are independent;
/// repeats across calls are expected. The caller provides the random
/// source, which keeps the function deterministic under a seeded RNG.
pub fn pick_random_feed<R: Rng + ?Sized>(
    mut candidates: Vec<MemoryRecord>,
    count: usize,
    rng: &mut R,
) -> Vec<MemoryRecord> {
    candidates.shuffle(rng);
    candidates.truncate(count);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn record(id: i64) -> MemoryRecord {
        MemoryRecord {
            id,
            image: vec![id as u8],
            latitude: id as f64,
            longitude: -(id as f64),
            message: None,
            owner_email: Some(format!("user{}@x.com", id)),
            created_at: None,
        }
    }

    #[test]
    fn empty_candidates_give_empty_feed() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(pick_random_feed(Vec::new(), DEFAULT_FEED_SIZE, &mut rng).is_empty());
    }

    #[test]
    fn small_candidate_set_is_returned_whole() {
        let mut rng = StdRng::seed_from_u64(1);
        let candidates: Vec<_> = (1..=3).map(record).collect();

        let feed = pick_random_feed(candidates, DEFAULT_FEED_SIZE, &mut rng);

        let ids: HashSet<i64> = feed.iter().map(|m| m.id).collect();
        assert_eq!(ids, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn large_candidate_set_yields_count_distinct_records() {
        let mut rng = StdRng::seed_from_u64(2);
        let candidates: Vec<_> = (1..=20).map(record).collect();

        let feed = pick_random_feed(candidates, DEFAULT_FEED_SIZE, &mut rng);

        assert_eq!(feed.len(), DEFAULT_FEED_SIZE);
        let ids: HashSet<i64> = feed.iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), DEFAULT_FEED_SIZE);
        assert!(ids.iter().all(|id| (1..=20).contains(id)));
    }

    #[test]
    fn same_seed_gives_same_feed() {
        let candidates: Vec<_> = (1..=20).map(record).collect();

        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);

        let feed_a = pick_random_feed(candidates.clone(), 4, &mut a);
        let feed_b = pick_random_feed(candidates, 4, &mut b);

        assert_eq!(feed_a, feed_b);
    }
}
