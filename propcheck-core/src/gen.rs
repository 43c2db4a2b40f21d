//! Generator combinators for property-based testing.

use crate::data::{Prng, Seed, Size};
use crate::error::{PropcheckError, Result};
use std::rc::Rc;

/// How many times `filter` resamples before giving up.
const FILTER_LIMIT: usize = 100;

/// Candidate set for character generation: letters, digits, punctuation,
/// space, tab, and newline.
const CHAR_POOL: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                         abcdefghijklmnopqrstuvwxyz\
                         0123456789\
                         !\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~ \t\n";

/// A generator for test data of type `T`.
///
/// Generators are explicit, first-class values composed with combinator
/// functions. A generator is a pure function of the PRNG state and the
/// size budget: evaluating it twice from equally-seeded PRNGs with the
/// same size produces the same value and leaves the PRNGs in equal
/// states. That determinism is what lets the driver replay draws.
pub struct Gen<T> {
    run: Rc<dyn Fn(&mut Prng, Size) -> Result<T>>,
}

impl<T> Clone for Gen<T> {
    fn clone(&self) -> Self {
        Gen {
            run: Rc::clone(&self.run),
        }
    }
}

impl<T> Gen<T> {
    /// Create a new generator from a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Prng, Size) -> Result<T> + 'static,
    {
        Gen { run: Rc::new(f) }
    }

    /// Generate a value using the given PRNG and size.
    pub fn sample(&self, prng: &mut Prng, size: Size) -> Result<T> {
        (self.run)(prng, size)
    }

    /// Create a generator that always produces the same value.
    pub fn constant(value: T) -> Self
    where
        T: Clone + 'static,
    {
        Gen::new(move |_prng, _size| Ok(value.clone()))
    }
}

impl<T> Gen<T>
where
    T: 'static,
{
    /// Map a function over the generated values.
    pub fn map<U, F>(self, f: F) -> Gen<U>
    where
        F: Fn(T) -> U + 'static,
        U: 'static,
    {
        Gen::new(move |prng, size| Ok(f(self.sample(prng, size)?)))
    }

    /// Bind for dependent generation. The second generator runs against
    /// the same PRNG, advanced sequentially past the first draw.
    pub fn bind<U, F>(self, f: F) -> Gen<U>
    where
        F: Fn(T) -> Gen<U> + 'static,
        U: 'static,
    {
        Gen::new(move |prng, size| {
            let value = self.sample(prng, size)?;
            f(value).sample(prng, size)
        })
    }

    /// Filter generated values by a predicate, resampling on mismatch.
    ///
    /// Gives up with [`PropcheckError::GeneratorExhausted`] after 100
    /// attempts.
    pub fn filter<F>(self, predicate: F) -> Gen<T>
    where
        F: Fn(&T) -> bool + 'static,
    {
        Gen::new(move |prng, size| {
            for _ in 0..FILTER_LIMIT {
                let value = self.sample(prng, size)?;
                if predicate(&value) {
                    return Ok(value);
                }
            }
            Err(PropcheckError::GeneratorExhausted {
                attempts: FILTER_LIMIT,
            })
        })
    }

    /// Uniform choice from a fixed, nonempty set of values.
    pub fn elements(items: Vec<T>) -> Result<Gen<T>>
    where
        T: Clone,
    {
        if items.is_empty() {
            return Err(PropcheckError::invalid_argument(
                "elements requires a nonempty list",
            ));
        }
        Ok(Gen::new(move |prng, _size| {
            let index = prng.next_bounded(items.len() as u64) as usize;
            Ok(items[index].clone())
        }))
    }

    /// Uniform choice from an enumeration, evaluated once up front.
    pub fn from_iter<I>(items: I) -> Result<Gen<T>>
    where
        T: Clone,
        I: IntoIterator<Item = T>,
    {
        Gen::elements(items.into_iter().collect())
    }

    /// Uniform choice among generators.
    pub fn one_of(gens: Vec<Gen<T>>) -> Result<Gen<T>> {
        if gens.is_empty() {
            return Err(PropcheckError::invalid_argument(
                "one_of requires a nonempty list of generators",
            ));
        }
        Ok(Gen::new(move |prng, size| {
            let index = prng.next_bounded(gens.len() as u64) as usize;
            gens[index].sample(prng, size)
        }))
    }

    /// Weighted choice among generators. Weights must be positive.
    ///
    /// The running-sum table is computed once here; selection draws an
    /// integer in `[1, total]` and scans for the first prefix sum at or
    /// above it.
    pub fn frequency(weighted: Vec<(u64, Gen<T>)>) -> Result<Gen<T>> {
        if weighted.is_empty() {
            return Err(PropcheckError::invalid_argument(
                "frequency requires a nonempty list of weighted generators",
            ));
        }
        let mut table = Vec::with_capacity(weighted.len());
        let mut total = 0u64;
        for (weight, gen) in weighted {
            if weight == 0 {
                return Err(PropcheckError::invalid_argument(
                    "frequency weights must be positive",
                ));
            }
            total += weight;
            table.push((total, gen));
        }
        Ok(Gen::new(move |prng, size| {
            let roll = prng.next_bounded(total) + 1;
            for (prefix, gen) in &table {
                if *prefix >= roll {
                    return gen.sample(prng, size);
                }
            }
            // Unreachable: the last prefix equals the total.
            table[table.len() - 1].1.sample(prng, size)
        }))
    }

    /// An endless stream of samples drawn from this generator.
    ///
    /// The stream fuses if the generator ever fails (e.g. an exhausted
    /// filter).
    pub fn samples(&self, seed: Seed, size: Size) -> Samples<T> {
        Samples {
            gen: self.clone(),
            prng: Prng::from_seed(seed),
            size,
            done: false,
        }
    }
}

/// Iterator over an unbounded stream of generated values.
pub struct Samples<T> {
    gen: Gen<T>,
    prng: Prng,
    size: Size,
    done: bool,
}

impl<T> Iterator for Samples<T>
where
    T: 'static,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.done {
            return None;
        }
        match self.gen.sample(&mut self.prng, self.size) {
            Ok(value) => Some(value),
            Err(_) => {
                self.done = true;
                None
            }
        }
    }
}

/// Primitive generators.
impl Gen<bool> {
    /// Generate a random boolean.
    pub fn bool() -> Self {
        Gen::new(|prng, _size| Ok(prng.next_bounded(2) == 1))
    }
}

impl Gen<i64> {
    /// Generate an integer bounded by size, in `[-size/2, size/2)`.
    pub fn int() -> Self {
        Gen::new(|prng, size| {
            let half = (size.get() / 2) as i64;
            Ok(prng.next_range_i64(-half, half))
        })
    }

    /// Generate an integer in `[min, min + size)`.
    pub fn int_from(min: i64) -> Self {
        Gen::new(move |prng, size| {
            Ok(prng.next_range_i64(min, min.saturating_add(size.get() as i64)))
        })
    }

    /// Generate an integer in `[min, max)`.
    pub fn int_range(min: i64, max: i64) -> Self {
        Gen::new(move |prng, _size| Ok(prng.next_range_i64(min, max)))
    }
}

impl Gen<i32> {
    /// Generate an `i32` bounded by size, in `[-size/2, size/2)`.
    pub fn int() -> Self {
        Gen::<i64>::int().map(|value| value as i32)
    }

    /// Generate an `i32` in `[min, max)`.
    pub fn int_range(min: i32, max: i32) -> Self {
        Gen::<i64>::int_range(min as i64, max as i64).map(|value| value as i32)
    }
}

impl Gen<f64> {
    /// Generate a float around zero, scaled by size: `[-size/2, size/2)`.
    pub fn float() -> Self {
        Gen::new(|prng, size| {
            let scale = size.get() as f64;
            Ok(prng.next_f64() * scale - scale / 2.0)
        })
    }

    /// Generate a float in `[min, min + size)`.
    pub fn float_from(min: f64) -> Self {
        Gen::new(move |prng, size| Ok(min + prng.next_f64() * size.get() as f64))
    }

    /// Generate a float in `[min, max)`. A degenerate range yields `min`.
    pub fn float_range(min: f64, max: f64) -> Self {
        Gen::new(move |prng, _size| {
            if min >= max {
                return Ok(min);
            }
            Ok(min + prng.next_f64() * (max - min))
        })
    }
}

impl Gen<char> {
    /// Generate a character from the fixed candidate set: letters,
    /// digits, punctuation, space, tab, and newline.
    pub fn ascii() -> Self {
        let pool: Vec<char> = CHAR_POOL.chars().collect();
        Gen::new(move |prng, _size| {
            let index = prng.next_bounded(pool.len() as u64) as usize;
            Ok(pool[index])
        })
    }
}

impl Gen<String> {
    /// Generate a string as a character vector of length `[0, size)`,
    /// packed.
    pub fn ascii() -> Self {
        Gen::<Vec<char>>::vec_of(Gen::<char>::ascii()).map(|chars| chars.into_iter().collect())
    }
}

impl<T> Gen<Vec<T>>
where
    T: 'static,
{
    /// Generate vectors with length drawn uniformly from `[0, size)`.
    pub fn vec_of(element: Gen<T>) -> Self {
        Gen::new(move |prng, size| {
            let length = prng.next_bounded(size.get() as u64) as usize;
            let mut items = Vec::with_capacity(length);
            for _ in 0..length {
                items.push(element.sample(prng, size)?);
            }
            Ok(items)
        })
    }

    /// Generate vectors of a fixed length.
    pub fn vec_of_len(element: Gen<T>, length: usize) -> Self {
        Gen::new(move |prng, size| {
            let mut items = Vec::with_capacity(length);
            for _ in 0..length {
                items.push(element.sample(prng, size)?);
            }
            Ok(items)
        })
    }
}

impl<T> Gen<Option<T>>
where
    T: 'static,
{
    /// Generate optional values, `None` a quarter of the time.
    pub fn option_of(inner: Gen<T>) -> Self {
        Gen::new(move |prng, size| {
            if prng.next_bounded(4) == 0 {
                Ok(None)
            } else {
                Ok(Some(inner.sample(prng, size)?))
            }
        })
    }
}

impl<T> Gen<Vec<Vec<T>>>
where
    T: 'static,
{
    /// Generate a fixed 2-D array with the given dimensions.
    pub fn vec2_of(element: Gen<T>, rows: usize, cols: usize) -> Self {
        Gen::new(move |prng, size| {
            let mut grid = Vec::with_capacity(rows);
            for _ in 0..rows {
                let mut row = Vec::with_capacity(cols);
                for _ in 0..cols {
                    row.push(element.sample(prng, size)?);
                }
                grid.push(row);
            }
            Ok(grid)
        })
    }
}

impl<A, B> Gen<(A, B)>
where
    A: 'static,
    B: 'static,
{
    /// Generate pairs using the given generators, drawn sequentially.
    pub fn pair(first: Gen<A>, second: Gen<B>) -> Self {
        Gen::new(move |prng, size| {
            let a = first.sample(prng, size)?;
            let b = second.sample(prng, size)?;
            Ok((a, b))
        })
    }
}

impl<A, B, C> Gen<(A, B, C)>
where
    A: 'static,
    B: 'static,
    C: 'static,
{
    /// Generate triples using the given generators, drawn sequentially.
    pub fn triple(first: Gen<A>, second: Gen<B>, third: Gen<C>) -> Self {
        Gen::new(move |prng, size| {
            let a = first.sample(prng, size)?;
            let b = second.sample(prng, size)?;
            let c = third.sample(prng, size)?;
            Ok((a, b, c))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fresh<T: 'static>(gen: &Gen<T>, seed: u64, size: usize) -> T {
        let mut prng = Prng::new(seed);
        gen.sample(&mut prng, Size::new(size)).unwrap()
    }

    #[test]
    fn test_generator_determinism() {
        let gen = Gen::<Vec<i64>>::vec_of(Gen::<i64>::int());
        for seed in 0..20 {
            let a = sample_fresh(&gen, seed, 30);
            let b = sample_fresh(&gen, seed, 30);
            assert_eq!(a, b, "same seed and size must reproduce the value");
        }
    }

    #[test]
    fn test_determinism_leaves_equal_prng_states() {
        let gen = Gen::<(i64, f64)>::pair(Gen::<i64>::int(), Gen::<f64>::float());
        let mut a = Prng::new(77);
        let mut b = Prng::new(77);
        let va = gen.sample(&mut a, Size::new(20)).unwrap();
        let vb = gen.sample(&mut b, Size::new(20)).unwrap();
        assert_eq!(va, vb);
        assert_eq!(a, b, "evaluation must advance both PRNGs identically");
    }

    #[test]
    fn test_int_bounded_by_size() {
        let gen = Gen::<i64>::int();
        for seed in 0..100 {
            let value = sample_fresh(&gen, seed, 10);
            assert!((-5..5).contains(&value), "got {value} for size 10");
        }
    }

    #[test]
    fn test_int_from_window() {
        let gen = Gen::<i64>::int_from(100);
        for seed in 0..100 {
            let value = sample_fresh(&gen, seed, 10);
            assert!((100..110).contains(&value));
        }
    }

    #[test]
    fn test_int_range_half_open() {
        let gen = Gen::<i64>::int_range(-3, 3);
        let mut seen_low = false;
        for seed in 0..200 {
            let value = sample_fresh(&gen, seed, 50);
            assert!((-3..3).contains(&value));
            seen_low |= value == -3;
        }
        assert!(seen_low, "lower bound should be reachable");
    }

    #[test]
    fn test_float_scaled_by_size() {
        let gen = Gen::<f64>::float();
        for seed in 0..100 {
            let value = sample_fresh(&gen, seed, 10);
            assert!((-5.0..5.0).contains(&value));
        }
    }

    #[test]
    fn test_constant() {
        let gen = Gen::constant(17);
        assert_eq!(sample_fresh(&gen, 0, 0), 17);
        assert_eq!(sample_fresh(&gen, 99, 50), 17);
    }

    #[test]
    fn test_map_and_bind_advance_sequentially() {
        let doubled = Gen::<i64>::int_range(0, 100).map(|x| x * 2);
        for seed in 0..50 {
            assert_eq!(sample_fresh(&doubled, seed, 10) % 2, 0);
        }

        // Bind draws the inner generator from the same advanced PRNG.
        let dependent = Gen::<i64>::int_range(1, 10)
            .bind(|n| Gen::<Vec<i64>>::vec_of_len(Gen::<i64>::int_range(0, 100), n as usize));
        for seed in 0..50 {
            let items = sample_fresh(&dependent, seed, 10);
            assert!((1..10).contains(&(items.len() as i64)));
        }
    }

    #[test]
    fn test_filter_passes_and_exhausts() {
        let evens = Gen::<i64>::int_range(0, 100).filter(|x| x % 2 == 0);
        for seed in 0..50 {
            assert_eq!(sample_fresh(&evens, seed, 10) % 2, 0);
        }

        let impossible = Gen::<i64>::int_range(0, 100).filter(|_| false);
        let mut prng = Prng::new(5);
        match impossible.sample(&mut prng, Size::new(10)) {
            Err(PropcheckError::GeneratorExhausted { attempts }) => assert_eq!(attempts, 100),
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[test]
    fn test_elements_and_empty_error() {
        let gen = Gen::elements(vec!['x', 'y', 'z']).unwrap();
        for seed in 0..50 {
            assert!("xyz".contains(sample_fresh(&gen, seed, 10)));
        }

        match Gen::<char>::elements(Vec::new()) {
            Err(PropcheckError::InvalidArgument { .. }) => {}
            other => panic!("expected invalid argument, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_from_iter_snapshots_the_enumeration() {
        let gen = Gen::from_iter(0..5).unwrap();
        for seed in 0..50 {
            assert!((0..5).contains(&sample_fresh(&gen, seed, 10)));
        }
    }

    #[test]
    fn test_one_of_picks_among_generators() {
        let gen = Gen::one_of(vec![Gen::constant(1), Gen::constant(100)]).unwrap();
        let mut seen = [false, false];
        for seed in 0..100 {
            match sample_fresh(&gen, seed, 10) {
                1 => seen[0] = true,
                100 => seen[1] = true,
                other => panic!("unexpected value {other}"),
            }
        }
        assert!(seen[0] && seen[1], "both generators should be chosen");
    }

    #[test]
    fn test_one_of_empty_error() {
        match Gen::<i64>::one_of(Vec::new()) {
            Err(PropcheckError::InvalidArgument { .. }) => {}
            other => panic!("expected invalid argument, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_float_windows() {
        let gen = Gen::<f64>::float_from(5.0);
        for seed in 0..100 {
            let value = sample_fresh(&gen, seed, 10);
            assert!((5.0..15.0).contains(&value));
        }

        let gen = Gen::<f64>::float_range(-1.0, 1.0);
        for seed in 0..100 {
            let value = sample_fresh(&gen, seed, 10);
            assert!((-1.0..1.0).contains(&value));
        }
        assert_eq!(sample_fresh(&Gen::<f64>::float_range(2.0, 2.0), 0, 10), 2.0);
    }

    #[test]
    fn test_option_mixes_none_and_some() {
        let gen = Gen::option_of(Gen::<i64>::int_range(0, 10));
        let mut nones = 0;
        let mut somes = 0;
        for seed in 0..200 {
            match sample_fresh(&gen, seed, 10) {
                None => nones += 1,
                Some(value) => {
                    assert!((0..10).contains(&value));
                    somes += 1;
                }
            }
        }
        assert!(nones > 0 && somes > nones, "None should be the minority case");
    }

    #[test]
    fn test_frequency_prefers_heavy_weights() {
        let gen = Gen::frequency(vec![
            (9, Gen::constant(true)),
            (1, Gen::constant(false)),
        ])
        .unwrap();
        let hits = (0..200)
            .filter(|&seed| sample_fresh(&gen, seed, 10))
            .count();
        assert!(hits > 140, "9:1 weighting should dominate, got {hits}/200");
    }

    #[test]
    fn test_frequency_rejects_bad_input() {
        match Gen::<bool>::frequency(Vec::new()) {
            Err(PropcheckError::InvalidArgument { .. }) => {}
            other => panic!("expected invalid argument, got {:?}", other.map(|_| ())),
        }
        match Gen::frequency(vec![(0, Gen::constant(true))]) {
            Err(PropcheckError::InvalidArgument { .. }) => {}
            other => panic!("expected invalid argument, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_vec_lengths() {
        let gen = Gen::<Vec<i64>>::vec_of(Gen::<i64>::int());
        for seed in 0..100 {
            let items = sample_fresh(&gen, seed, 10);
            assert!(items.len() < 10);
        }

        let fixed = Gen::<Vec<i64>>::vec_of_len(Gen::<i64>::int(), 4);
        for seed in 0..20 {
            assert_eq!(sample_fresh(&fixed, seed, 10).len(), 4);
        }
    }

    #[test]
    fn test_vec2_dimensions() {
        let gen = Gen::<Vec<Vec<bool>>>::vec2_of(Gen::bool(), 3, 5);
        let grid = sample_fresh(&gen, 42, 10);
        assert_eq!(grid.len(), 3);
        assert!(grid.iter().all(|row| row.len() == 5));
    }

    #[test]
    fn test_char_pool_membership() {
        let gen = Gen::<char>::ascii();
        for seed in 0..200 {
            let ch = sample_fresh(&gen, seed, 10);
            assert!(CHAR_POOL.contains(ch), "unexpected char {ch:?}");
        }
    }

    #[test]
    fn test_samples_stream() {
        let gen = Gen::<i64>::int_range(0, 10);
        let values: Vec<i64> = gen.samples(Seed::from_u64(3), Size::new(10)).take(50).collect();
        assert_eq!(values.len(), 50);
        assert!(values.iter().all(|v| (0..10).contains(v)));

        // The stream fuses once the generator fails.
        let never = Gen::<i64>::int_range(0, 10).filter(|_| false);
        let drained: Vec<i64> = never.samples(Seed::from_u64(3), Size::new(10)).collect();
        assert!(drained.is_empty());
    }

    #[test]
    fn test_gen_monad_laws() {
        let k = |x: i64| Gen::constant(x + 1);
        let h = |x: i64| Gen::constant(x * 2);
        let m = Gen::<i64>::int_range(0, 100);

        for seed in 0..20 {
            // Left identity: constant(x).bind(k) == k(x)
            let left = sample_fresh(&Gen::constant(5).bind(k), seed, 10);
            let right = sample_fresh(&k(5), seed, 10);
            assert_eq!(left, right);

            // Right identity: m.bind(constant) == m
            let left = sample_fresh(&m.clone().bind(Gen::constant), seed, 10);
            let right = sample_fresh(&m, seed, 10);
            assert_eq!(left, right);

            // Associativity.
            let left = sample_fresh(&m.clone().bind(k).bind(h), seed, 10);
            let right = sample_fresh(&m.clone().bind(move |x| k(x).bind(h)), seed, 10);
            assert_eq!(left, right);
        }
    }
}
