use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Pick up to `max` distinct candidates uniformly at random.
///
/// Returns the whole list (in random order) when it has fewer than `max`
/// entries.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use reviewroster_core::selection::pick_random;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let pool = vec!["b".to_string(), "c".to_string(), "d".to_string()];
///
/// assert_eq!(pick_random(&pool, 2, &mut rng).len(), 2);
/// assert_eq!(pick_random(&pool, 5, &mut rng).len(), 3);
/// assert!(pick_random(&[], 2, &mut rng).is_empty());
/// ```
pub fn pick_random<R: Rng + ?Sized>(candidates: &[String], max: usize, rng: &mut R) -> Vec<String> {
    candidates.choose_multiple(rng, max).cloned().collect()
}

/// Process-wide random source for reviewer selection
///
/// Every call is an independent draw from the same generator, so a seeded
/// picker produces a reproducible sequence of selections.
#[derive(Debug)]
pub struct CandidatePicker {
    rng: Mutex<StdRng>,
}

impl CandidatePicker {
    /// Picker seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic picker
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn pick(&self, candidates: &[String], max: usize) -> Vec<String> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        pick_random(candidates, max, &mut *rng)
    }

    pub fn pick_one(&self, candidates: &[String]) -> Option<String> {
        self.pick(candidates, 1).into_iter().next()
    }
}

impl Default for CandidatePicker {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn pool(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pick_returns_distinct_members() {
        let picker = CandidatePicker::seeded(1);
        let candidates = pool(&["b", "c", "d", "e"]);

        for _ in 0..50 {
            let picked = picker.pick(&candidates, 2);
            assert_eq!(picked.len(), 2);
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), 2);
            assert!(picked.iter().all(|id| candidates.contains(id)));
        }
    }

    #[test]
    fn test_pick_smaller_pool_returns_everything() {
        let picker = CandidatePicker::seeded(1);
        let candidates = pool(&["b"]);

        assert_eq!(picker.pick(&candidates, 2), pool(&["b"]));
        assert!(picker.pick(&[], 2).is_empty());
        assert_eq!(picker.pick_one(&[]), None);
    }

    #[test]
    fn test_seeded_pickers_are_reproducible() {
        let candidates = pool(&["a", "b", "c", "d", "e", "f"]);
        let first = CandidatePicker::seeded(42);
        let second = CandidatePicker::seeded(42);

        for _ in 0..20 {
            assert_eq!(first.pick(&candidates, 2), second.pick(&candidates, 2));
        }
    }

    #[test]
    fn test_pick_one_covers_whole_pool() {
        let picker = CandidatePicker::seeded(3);
        let candidates = pool(&["b", "c", "d"]);
        let mut seen: HashMap<String, usize> = HashMap::new();

        for _ in 0..300 {
            let id = picker.pick_one(&candidates).expect("pool is not empty");
            *seen.entry(id).or_default() += 1;
        }

        // Each of the three should come up roughly a third of the time
        assert_eq!(seen.len(), 3);
        assert!(seen.values().all(|count| *count > 50));
    }
}
