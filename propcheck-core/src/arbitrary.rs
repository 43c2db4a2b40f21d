//! Bundled generator/shrinker pairs and type-directed defaults.

use crate::gen::Gen;
use crate::registry;
use crate::shrink::Shrinker;
use std::fmt;

/// A bundled generator and shrinker for a type.
pub struct Arbitrary<T> {
    gen: Gen<T>,
    shrinker: Shrinker<T>,
}

impl<T> Clone for Arbitrary<T> {
    fn clone(&self) -> Self {
        Arbitrary {
            gen: self.gen.clone(),
            shrinker: self.shrinker.clone(),
        }
    }
}

impl<T> Arbitrary<T>
where
    T: 'static,
{
    /// Bundle a generator with a shrinker.
    pub fn new(gen: Gen<T>, shrinker: Shrinker<T>) -> Self {
        Arbitrary { gen, shrinker }
    }

    /// Bundle a generator with no shrinking.
    pub fn from_gen(gen: Gen<T>) -> Self {
        Arbitrary {
            gen,
            shrinker: Shrinker::none(),
        }
    }

    /// The generator half.
    pub fn gen(&self) -> &Gen<T> {
        &self.gen
    }

    /// The shrinker half.
    pub fn shrinker(&self) -> &Shrinker<T> {
        &self.shrinker
    }
}

/// Types with a default arbitrary.
///
/// Container impls are the factories of the system: `Vec<T>`,
/// `Option<T>`, and tuples build their arbitraries out of the element
/// types' registered arbitraries, resolved recursively through the
/// registry so user overrides propagate into containers.
pub trait DefaultArbitrary: Sized + Clone + fmt::Debug + 'static {
    /// Construct the default arbitrary for this type.
    fn default_arbitrary() -> Arbitrary<Self>;
}

impl DefaultArbitrary for bool {
    fn default_arbitrary() -> Arbitrary<bool> {
        Arbitrary::new(Gen::bool(), Shrinker::bool())
    }
}

impl DefaultArbitrary for char {
    fn default_arbitrary() -> Arbitrary<char> {
        Arbitrary::new(Gen::<char>::ascii(), Shrinker::char())
    }
}

impl DefaultArbitrary for i32 {
    fn default_arbitrary() -> Arbitrary<i32> {
        Arbitrary::new(Gen::<i32>::int(), Shrinker::<i32>::int())
    }
}

impl DefaultArbitrary for i64 {
    fn default_arbitrary() -> Arbitrary<i64> {
        Arbitrary::new(Gen::<i64>::int(), Shrinker::<i64>::int())
    }
}

impl DefaultArbitrary for f64 {
    fn default_arbitrary() -> Arbitrary<f64> {
        Arbitrary::new(Gen::<f64>::float(), Shrinker::float())
    }
}

impl DefaultArbitrary for String {
    fn default_arbitrary() -> Arbitrary<String> {
        Arbitrary::new(Gen::<String>::ascii(), Shrinker::string())
    }
}

impl<T> DefaultArbitrary for Vec<T>
where
    T: DefaultArbitrary,
{
    fn default_arbitrary() -> Arbitrary<Vec<T>> {
        let element = registry::resolve::<T>();
        Arbitrary::new(
            Gen::vec_of(element.gen().clone()),
            Shrinker::vec_of(element.shrinker().clone()),
        )
    }
}

impl<T> DefaultArbitrary for Option<T>
where
    T: DefaultArbitrary,
{
    fn default_arbitrary() -> Arbitrary<Option<T>> {
        let inner = registry::resolve::<T>();
        Arbitrary::new(
            Gen::option_of(inner.gen().clone()),
            Shrinker::option_of(inner.shrinker().clone()),
        )
    }
}

impl<A, B> DefaultArbitrary for (A, B)
where
    A: DefaultArbitrary,
    B: DefaultArbitrary,
{
    fn default_arbitrary() -> Arbitrary<(A, B)> {
        let first = registry::resolve::<A>();
        let second = registry::resolve::<B>();
        Arbitrary::new(
            Gen::pair(first.gen().clone(), second.gen().clone()),
            Shrinker::pair(first.shrinker().clone(), second.shrinker().clone()),
        )
    }
}

impl<A, B, C> DefaultArbitrary for (A, B, C)
where
    A: DefaultArbitrary,
    B: DefaultArbitrary,
    C: DefaultArbitrary,
{
    fn default_arbitrary() -> Arbitrary<(A, B, C)> {
        let first = registry::resolve::<A>();
        let second = registry::resolve::<B>();
        let third = registry::resolve::<C>();
        Arbitrary::new(
            Gen::triple(
                first.gen().clone(),
                second.gen().clone(),
                third.gen().clone(),
            ),
            Shrinker::triple(
                first.shrinker().clone(),
                second.shrinker().clone(),
                third.shrinker().clone(),
            ),
        )
    }
}
