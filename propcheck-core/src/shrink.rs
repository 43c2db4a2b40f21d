//! Shrinkers: finite, simpler-first candidate sequences for failing values.

use std::rc::Rc;

/// Is `candidate` strictly simpler than `than`?
///
/// Lowercase beats non-lowercase, uppercase beats non-uppercase, digit
/// beats non-digit, space beats non-space, whitespace beats
/// non-whitespace; otherwise the lower code point wins.
fn simpler_char(candidate: char, than: char) -> bool {
    (candidate.is_ascii_lowercase() && !than.is_ascii_lowercase())
        || (candidate.is_ascii_uppercase() && !than.is_ascii_uppercase())
        || (candidate.is_ascii_digit() && !than.is_ascii_digit())
        || (candidate == ' ' && than != ' ')
        || (candidate.is_whitespace() && !than.is_whitespace())
        || (candidate as u32) < (than as u32)
}

/// A shrinker for values of type `T`.
///
/// Given a value, a shrinker produces a finite sequence of candidates
/// ordered from simplest to closest-to-original. The sequence never
/// contains the value itself; the driver appends the original as the
/// final fallback when it collects sequences.
pub struct Shrinker<T> {
    run: Rc<dyn Fn(&T) -> Box<dyn Iterator<Item = T>>>,
}

impl<T> Clone for Shrinker<T> {
    fn clone(&self) -> Self {
        Shrinker {
            run: Rc::clone(&self.run),
        }
    }
}

impl<T> Shrinker<T>
where
    T: 'static,
{
    /// Create a shrinker from a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T) -> Box<dyn Iterator<Item = T>> + 'static,
    {
        Shrinker { run: Rc::new(f) }
    }

    /// Enumerate the shrink candidates for a value.
    pub fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        (self.run)(value)
    }

    /// A shrinker that never offers candidates.
    pub fn none() -> Self {
        Shrinker::new(|_value| Box::new(std::iter::empty()))
    }

    /// Adapt this shrinker to another type through a pair of conversions.
    ///
    /// `into` unpacks the outer value for shrinking and `from` repacks
    /// each candidate. This is how strings reuse the character-vector
    /// shrinker.
    pub fn convert<U, I, F>(self, into: I, from: F) -> Shrinker<U>
    where
        U: 'static,
        I: Fn(&U) -> T + 'static,
        F: Fn(T) -> U + 'static,
    {
        let from = Rc::new(from);
        Shrinker::new(move |value: &U| {
            let unpacked = into(value);
            let from = Rc::clone(&from);
            Box::new(self.shrink(&unpacked).map(move |candidate| from(candidate)))
        })
    }
}

impl Shrinker<bool> {
    /// `true` shrinks to `false`; `false` is already minimal.
    pub fn bool() -> Self {
        Shrinker::new(|&value: &bool| {
            if value {
                Box::new(std::iter::once(false))
            } else {
                Box::new(std::iter::empty())
            }
        })
    }
}

impl Shrinker<i64> {
    /// Shrink toward zero: `0`, the negation of a negative value, then
    /// halving steps `x - x/2, x - x/4, …` while they stay strictly
    /// closer to zero. Duplicates are filtered.
    pub fn int() -> Self {
        Shrinker::new(|&value: &i64| {
            if value == 0 {
                return Box::new(std::iter::empty());
            }
            let mut candidates: Vec<i64> = vec![0];
            if value < 0 {
                if let Some(negated) = value.checked_neg() {
                    candidates.push(negated);
                }
            }
            let mut delta = value / 2;
            while delta != 0 {
                let candidate = value - delta;
                if candidate.unsigned_abs() < value.unsigned_abs()
                    && !candidates.contains(&candidate)
                {
                    candidates.push(candidate);
                }
                delta /= 2;
            }
            Box::new(candidates.into_iter())
        })
    }
}

impl Shrinker<i32> {
    /// The integer shrinker, adapted to `i32`.
    pub fn int() -> Self {
        Shrinker::<i64>::int().convert(|&value: &i32| value as i64, |value| value as i32)
    }
}

impl Shrinker<f64> {
    /// Shrink a float: `0.0`, `floor(x)`, `ceil(x)`, and `-x` for
    /// negative values. Candidates equal to the value are filtered.
    pub fn float() -> Self {
        Shrinker::new(|&value: &f64| {
            if value == 0.0 {
                return Box::new(std::iter::empty());
            }
            if !value.is_finite() {
                return Box::new(std::iter::once(0.0));
            }
            let mut candidates: Vec<f64> = vec![0.0];
            for candidate in [value.floor(), value.ceil()] {
                if candidate != value && !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
            if value < 0.0 && !candidates.contains(&-value) {
                candidates.push(-value);
            }
            Box::new(candidates.into_iter())
        })
    }
}

impl Shrinker<char> {
    /// Shrink a character through a small candidate list, keeping only
    /// strictly simpler entries.
    pub fn char() -> Self {
        Shrinker::new(|&value: &char| {
            let pool = [
                'a',
                'b',
                'A',
                'B',
                '1',
                '2',
                value.to_ascii_lowercase(),
                ' ',
            ];
            let mut candidates: Vec<char> = Vec::new();
            for candidate in pool {
                if candidate != value
                    && simpler_char(candidate, value)
                    && !candidates.contains(&candidate)
                {
                    candidates.push(candidate);
                }
            }
            Box::new(candidates.into_iter())
        })
    }
}

impl Shrinker<String> {
    /// Shrink a string as a character vector, repacked per candidate.
    pub fn string() -> Self {
        Shrinker::<Vec<char>>::vec_of(Shrinker::char()).convert(
            |value: &String| value.chars().collect(),
            |chars| chars.into_iter().collect(),
        )
    }
}

impl<T> Shrinker<Vec<T>>
where
    T: Clone + 'static,
{
    /// Shrink a vector, preferring length reduction over element
    /// simplification.
    ///
    /// The sequence is: the empty vector; then for each window width `k`
    /// from `len - 1` down to `1`, the candidates with a contiguous
    /// window of `k` elements removed (windows at `0, k, 2k, …`, the
    /// last clipped at the end), followed by one-element-shrunk variants
    /// of each of those shorter candidates; finally one-element-shrunk
    /// variants at full length, positions left to right.
    pub fn vec_of(element: Shrinker<T>) -> Self {
        Shrinker::new(move |value: &Vec<T>| {
            if value.is_empty() {
                return Box::new(std::iter::empty());
            }
            let original = value.clone();
            let len = original.len();

            let by_removal = {
                let original = original.clone();
                let element = element.clone();
                (1..len).rev().flat_map(move |k| {
                    let shorter = remove_windows(&original, k);
                    let element = element.clone();
                    let shrunk_elements = shorter
                        .clone()
                        .into_iter()
                        .flat_map(move |candidate| shrink_one_element(candidate, element.clone()));
                    shorter.into_iter().chain(shrunk_elements)
                })
            };

            let full_length = shrink_one_element(original, element.clone());

            Box::new(
                std::iter::once(Vec::new())
                    .chain(by_removal)
                    .chain(full_length),
            )
        })
    }
}

/// Candidates with a contiguous window of `k` elements removed, windows
/// starting at `0, k, 2k, …`. A window clipped by the end of the slice
/// removes the remaining suffix.
fn remove_windows<T: Clone>(value: &[T], k: usize) -> Vec<Vec<T>> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < value.len() {
        let end = (start + k).min(value.len());
        let mut candidate = Vec::with_capacity(value.len() - (end - start));
        candidate.extend_from_slice(&value[..start]);
        candidate.extend_from_slice(&value[end..]);
        out.push(candidate);
        start += k;
    }
    out
}

/// Variants of `value` with exactly one element replaced by one of its
/// shrink candidates, positions in order.
fn shrink_one_element<T>(value: Vec<T>, element: Shrinker<T>) -> impl Iterator<Item = Vec<T>>
where
    T: Clone + 'static,
{
    let len = value.len();
    (0..len).flat_map(move |index| {
        let base = value.clone();
        element.shrink(&base[index]).map(move |candidate| {
            let mut variant = base.clone();
            variant[index] = candidate;
            variant
        })
    })
}

impl<A, B> Shrinker<(A, B)>
where
    A: Clone + 'static,
    B: Clone + 'static,
{
    /// Shrink one coordinate at a time, left to right.
    pub fn pair(first: Shrinker<A>, second: Shrinker<B>) -> Self {
        Shrinker::new(move |value: &(A, B)| {
            let (a, b) = value.clone();
            let firsts = {
                let b = b.clone();
                first.shrink(&a).map(move |a2| (a2, b.clone()))
            };
            let seconds = second.shrink(&b).map(move |b2| (a.clone(), b2));
            Box::new(firsts.chain(seconds))
        })
    }
}

impl<A, B, C> Shrinker<(A, B, C)>
where
    A: Clone + 'static,
    B: Clone + 'static,
    C: Clone + 'static,
{
    /// Shrink one coordinate at a time, left to right.
    pub fn triple(first: Shrinker<A>, second: Shrinker<B>, third: Shrinker<C>) -> Self {
        Shrinker::new(move |value: &(A, B, C)| {
            let (a, b, c) = value.clone();
            let firsts = {
                let (b, c) = (b.clone(), c.clone());
                first
                    .shrink(&a)
                    .map(move |a2| (a2, b.clone(), c.clone()))
            };
            let seconds = {
                let (a, c) = (a.clone(), c.clone());
                second
                    .shrink(&b)
                    .map(move |b2| (a.clone(), b2, c.clone()))
            };
            let thirds = third.shrink(&c).map(move |c2| (a.clone(), b.clone(), c2));
            Box::new(firsts.chain(seconds).chain(thirds))
        })
    }
}

impl<T> Shrinker<Option<T>>
where
    T: Clone + 'static,
{
    /// `Some` shrinks to `None` and then to `Some`-wrapped inner
    /// candidates; `None` is already minimal.
    pub fn option_of(inner: Shrinker<T>) -> Self {
        Shrinker::new(move |value: &Option<T>| match value {
            None => Box::new(std::iter::empty()),
            Some(v) => Box::new(std::iter::once(None).chain(inner.shrink(v).map(Some))),
        })
    }
}
