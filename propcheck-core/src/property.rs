//! Property definitions for property-based testing.
//!
//! A [`Prop`] is a computation over the mutable [`TestState`]: it draws
//! values in the Generate phase, replays them during shrinking, and
//! reports success or discard. Failure travels on the error channel so
//! it short-circuits composition.

use crate::arbitrary::{Arbitrary, DefaultArbitrary};
use crate::data::{Config, Prng, Size};
use crate::driver;
use crate::error::{PropcheckError, Result};
use crate::gen::Gen;
use crate::registry;
use crate::state::{Outcome, Phase, Recorded, Sample, TestState};
use std::fmt;
use std::rc::Rc;

/// A property over values of type `T`.
pub struct Prop<T> {
    run: Rc<dyn Fn(&mut TestState) -> Result<Sample<T>>>,
}

impl<T> Clone for Prop<T> {
    fn clone(&self) -> Self {
        Prop {
            run: Rc::clone(&self.run),
        }
    }
}

impl<T> Prop<T>
where
    T: Clone + fmt::Debug + 'static,
{
    /// Create a property from a function over test state.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut TestState) -> Result<Sample<T>> + 'static,
    {
        Prop { run: Rc::new(f) }
    }

    /// Evaluate the property against the given state.
    pub fn eval(&self, state: &mut TestState) -> Result<Sample<T>> {
        (self.run)(state)
    }

    /// A property that always succeeds with the given value.
    pub fn value(value: T) -> Self {
        Prop::new(move |_state| Ok(Sample::success(value.clone())))
    }

    /// A property that fails with the given value as the counterexample.
    pub fn failed(value: T) -> Self {
        Prop::new(move |state| {
            Err(PropcheckError::PropertyFailed {
                label: state.label.clone(),
                value: format!("{value:?}"),
            })
        })
    }

    /// A property that discards the iteration, keeping the value.
    pub fn discarded(value: T) -> Self {
        Prop::new(move |_state| Ok(Sample::discard(value.clone())))
    }

    /// Universal quantification over an arbitrary.
    ///
    /// In the Generate phase this draws a fresh value and records it. In
    /// StartShrink it replays the recorded value and appends its shrink
    /// sequence, with the original value chained last as the fallback.
    /// In Shrink it replays whatever the driver put at the cursor.
    pub fn for_all(arbitrary: Arbitrary<T>) -> Self {
        Prop::new(move |state| match state.phase {
            Phase::Generate => {
                let size = state.size;
                let value = arbitrary.gen().sample(&mut state.prng, size)?;
                state.record(Recorded::new(value.clone()));
                Ok(Sample::success(value))
            }
            Phase::StartShrink => {
                let value: T = state.replay()?;
                let original = Recorded::new(value.clone());
                let sequence = arbitrary
                    .shrinker()
                    .shrink(&value)
                    .map(Recorded::new)
                    .chain(std::iter::once(original));
                state.push_shrink_sequence(Box::new(sequence));
                Ok(Sample::success(value))
            }
            Phase::Shrink => Ok(Sample::success(state.replay()?)),
        })
    }

    /// Universal quantification using the registry's arbitrary for `T`.
    pub fn for_all_default() -> Self
    where
        T: DefaultArbitrary,
    {
        Prop::for_all(registry::resolve::<T>())
    }

    /// Dependent sampling from a generator.
    ///
    /// The generator runs against a PRNG freshly seeded from the run's
    /// seed, so the draw is identical in every phase. The value is not
    /// recorded and never shrunk; use it to pick something relative to
    /// previously drawn values, like an index into a collection.
    pub fn any(gen: Gen<T>) -> Self {
        Prop::new(move |state| {
            let mut prng = Prng::from_seed(state.seed);
            let size = state.size;
            Ok(Sample::success(gen.sample(&mut prng, size)?))
        })
    }

    /// Monadic sequencing. A discarded first property short-circuits
    /// with a default value of the output type.
    pub fn bind<U, K>(self, k: K) -> Prop<U>
    where
        U: Clone + fmt::Debug + Default + 'static,
        K: Fn(T) -> Prop<U> + 'static,
    {
        Prop::new(move |state| {
            let sample = self.eval(state)?;
            match sample.outcome {
                Outcome::Success => k(sample.value).eval(state),
                Outcome::Discard => Ok(Sample::discard(U::default())),
            }
        })
    }

    /// Map a function over the property's value, keeping the outcome.
    pub fn map<U, F>(self, f: F) -> Prop<U>
    where
        U: Clone + fmt::Debug + 'static,
        F: Fn(T) -> U + 'static,
    {
        Prop::new(move |state| {
            let sample = self.eval(state)?;
            Ok(Sample {
                outcome: sample.outcome,
                value: f(sample.value),
            })
        })
    }

    /// Combine two properties into one through `f`.
    pub fn zip<U, V, F>(self, other: Prop<U>, f: F) -> Prop<V>
    where
        U: Clone + fmt::Debug + 'static,
        V: Clone + fmt::Debug + Default + 'static,
        F: Fn(T, U) -> V + 'static,
    {
        Prop::new(move |state| {
            let first = self.eval(state)?;
            if first.outcome == Outcome::Discard {
                return Ok(Sample::discard(V::default()));
            }
            let second = other.eval(state)?;
            if second.outcome == Outcome::Discard {
                return Ok(Sample::discard(V::default()));
            }
            Ok(Sample::success(f(first.value, second.value)))
        })
    }

    /// Discard iterations whose value fails the precondition.
    pub fn where_<P>(self, predicate: P) -> Self
    where
        T: Default,
        P: Fn(&T) -> bool + 'static,
    {
        self.bind(move |value| {
            if predicate(&value) {
                Prop::value(value)
            } else {
                Prop::discarded(value)
            }
        })
    }

    /// Fail iterations whose value does not satisfy the condition. This
    /// is the predicate hook `check` drives.
    pub fn ensure<P>(self, predicate: P) -> Self
    where
        T: Default,
        P: Fn(&T) -> bool + 'static,
    {
        self.bind(move |value| {
            if predicate(&value) {
                Prop::value(value)
            } else {
                Prop::failed(value)
            }
        })
    }

    /// Evaluate the property under a fixed size, restoring the previous
    /// size on success, discard, and failure alike.
    pub fn restrict(self, size: Size) -> Self {
        Prop::new(move |state| {
            let saved = state.size;
            state.size = size;
            let result = self.eval(state);
            state.size = saved;
            result
        })
    }

    /// Tally the value's classification bucket. Outcome and value pass
    /// through untouched.
    pub fn classify_by<K, F>(self, classify: F) -> Self
    where
        K: fmt::Display,
        F: Fn(&T) -> K + 'static,
    {
        Prop::new(move |state| {
            let sample = self.eval(state)?;
            let bucket = classify(&sample.value).to_string();
            *state.classes.entry(bucket).or_insert(0) += 1;
            Ok(sample)
        })
    }

    /// Check a condition over this property with the default config.
    ///
    /// Drives the full generate/shrink state machine; a failure
    /// escalates carrying the minimized input. Returns the property
    /// unchanged so checks can chain.
    pub fn check<P>(self, label: &str, condition: P) -> Result<Self>
    where
        T: Default,
        P: Fn(&T) -> bool + 'static,
    {
        self.check_with(&Config::default(), label, condition)
    }

    /// Check a condition over this property with an explicit config.
    pub fn check_with<P>(self, config: &Config, label: &str, condition: P) -> Result<Self>
    where
        T: Default,
        P: Fn(&T) -> bool + 'static,
    {
        driver::run_check(&self, config, label, condition)?;
        Ok(self)
    }
}

/// Universal quantification over an arbitrary.
pub fn for_all<T>(arbitrary: Arbitrary<T>) -> Prop<T>
where
    T: Clone + fmt::Debug + 'static,
{
    Prop::for_all(arbitrary)
}

/// Universal quantification using the registry's arbitrary for `T`.
pub fn for_all_default<T>() -> Prop<T>
where
    T: DefaultArbitrary,
{
    Prop::for_all_default()
}

/// Dependent sampling from a generator.
pub fn any<T>(gen: Gen<T>) -> Prop<T>
where
    T: Clone + fmt::Debug + 'static,
{
    Prop::any(gen)
}

/// Check a condition over a property with the default config.
pub fn check<T, P>(prop: Prop<T>, label: &str, condition: P) -> Result<Prop<T>>
where
    T: Clone + fmt::Debug + Default + 'static,
    P: Fn(&T) -> bool + 'static,
{
    prop.check(label, condition)
}
