//! Core data types for propcheck property-based testing.

use std::fmt;

/// Size parameter for controlling test data generation.
///
/// Size bounds the magnitude of generated numbers and the length of
/// generated collections. The driver grows it across iterations so early
/// tests stay small and later tests explore larger inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Size(pub usize);

impl Size {
    /// Create a new size value.
    pub fn new(value: usize) -> Self {
        Size(value)
    }

    /// Get the inner size value.
    pub fn get(&self) -> usize {
        self.0
    }
}

impl From<usize> for Size {
    fn from(value: usize) -> Self {
        Size(value)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Size({})", self.0)
    }
}

/// Seed for deterministic test generation.
///
/// The same seed reproduces the same sequence of generated values,
/// ensuring deterministic and reproducible test runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed(pub u64);

impl Seed {
    /// Create a seed from a single value.
    pub fn from_u64(value: u64) -> Self {
        Seed(value)
    }

    /// Generate a random seed.
    pub fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        Seed(rng.gen())
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({})", self.0)
    }
}

/// Deterministic pseudo-random number generator (SplitMix64).
///
/// Given the same seed and the same sequence of calls, a `Prng` produces
/// identical outputs. Reseeding is a cheap constructor call, which is how
/// dependent draws are replayed across driver phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prng {
    state: u64,
}

impl Prng {
    /// Create a generator from a raw seed value.
    pub fn new(seed: u64) -> Self {
        Prng { state: seed }
    }

    /// Create a generator from a [`Seed`].
    pub fn from_seed(seed: Seed) -> Self {
        Prng::new(seed.0)
    }

    /// Produce the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    /// Produce a value in `[0, bound)`. A zero bound yields zero.
    pub fn next_bounded(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        self.next_u64() % bound
    }

    /// Produce a signed value in `[low, high)`. A degenerate range yields `low`.
    pub fn next_range_i64(&mut self, low: i64, high: i64) -> i64 {
        if low >= high {
            return low;
        }
        let width = high.wrapping_sub(low) as u64;
        low.wrapping_add(self.next_bounded(width) as i64)
    }

    /// Produce a uniform float in `[0, 1)` with 53 bits of precision.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// Configuration for property checking.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of tests to run.
    pub test_limit: usize,

    /// Maximum number of shrink candidates to evaluate.
    pub shrink_limit: usize,

    /// Size used for the first iteration; later iterations grow from it.
    pub size_initial: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            test_limit: 100,
            shrink_limit: 1000,
            size_initial: 10,
        }
    }
}

impl Config {
    /// Create a new config with the given number of tests.
    pub fn with_tests(mut self, tests: usize) -> Self {
        self.test_limit = tests;
        self
    }

    /// Create a new config with the given shrink limit.
    pub fn with_shrinks(mut self, shrinks: usize) -> Self {
        self.shrink_limit = shrinks;
        self
    }

    /// Create a new config with the given initial size.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size_initial = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prng_determinism() {
        let mut a = Prng::new(42);
        let mut b = Prng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
        assert_eq!(a, b, "equal call sequences should leave equal states");
    }

    #[test]
    fn test_prng_seeds_diverge() {
        let mut a = Prng::new(1);
        let mut b = Prng::new(2);
        let same = (0..10).filter(|_| a.next_u64() == b.next_u64()).count();
        assert!(same < 10, "different seeds should produce different streams");
    }

    #[test]
    fn test_next_bounded_in_range() {
        let mut prng = Prng::new(7);
        for _ in 0..1000 {
            let value = prng.next_bounded(10);
            assert!(value < 10);
        }
        assert_eq!(prng.next_bounded(0), 0);
    }

    #[test]
    fn test_next_range_i64() {
        let mut prng = Prng::new(13);
        for _ in 0..1000 {
            let value = prng.next_range_i64(-5, 5);
            assert!((-5..5).contains(&value));
        }
        assert_eq!(prng.next_range_i64(3, 3), 3, "degenerate range yields low");
        assert_eq!(prng.next_range_i64(9, 2), 9);
    }

    #[test]
    fn test_next_f64_unit_interval() {
        let mut prng = Prng::new(99);
        for _ in 0..1000 {
            let value = prng.next_f64();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_config_builders() {
        let config = Config::default().with_tests(50).with_shrinks(10).with_size(3);
        assert_eq!(config.test_limit, 50);
        assert_eq!(config.shrink_limit, 10);
        assert_eq!(config.size_initial, 3);
    }
}
