//! Process-wide lookup of arbitraries by type.
//!
//! The registry is the one piece of global state in the engine. It is
//! initialized at first use with the built-in primitive arbitraries and
//! is meant to be populated before properties run; lookups during a run
//! are reads. Container types are instantiated on demand through their
//! [`DefaultArbitrary`] impls and cached here.

use crate::arbitrary::{Arbitrary, DefaultArbitrary};
use crate::error::{PropcheckError, Result};
use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::with_builtins());
}

struct Registry {
    entries: HashMap<TypeId, Box<dyn Any>>,
}

impl Registry {
    fn with_builtins() -> Self {
        let mut registry = Registry {
            entries: HashMap::new(),
        };
        registry.install::<bool>();
        registry.install::<char>();
        registry.install::<i32>();
        registry.install::<i64>();
        registry.install::<f64>();
        registry.install::<String>();
        registry
    }

    fn install<T: DefaultArbitrary>(&mut self) {
        self.entries
            .insert(TypeId::of::<T>(), Box::new(T::default_arbitrary()));
    }
}

/// Register an arbitrary for `T`.
///
/// Fails with [`PropcheckError::AlreadyRegistered`] when `T` already has
/// an entry, including the built-ins installed at initialization.
pub fn register<T: 'static>(arbitrary: Arbitrary<T>) -> Result<()> {
    REGISTRY.with(|cell| {
        let mut registry = cell.borrow_mut();
        match registry.entries.entry(TypeId::of::<T>()) {
            Entry::Occupied(_) => Err(PropcheckError::AlreadyRegistered {
                type_name: type_name::<T>(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(Box::new(arbitrary));
                Ok(())
            }
        }
    })
}

/// Look up the arbitrary registered or cached for `T`.
///
/// Fails with [`PropcheckError::NotRegistered`] when `T` has neither
/// been registered nor resolved before.
pub fn get<T: 'static>() -> Result<Arbitrary<T>> {
    REGISTRY.with(|cell| {
        cell.borrow()
            .entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Arbitrary<T>>())
            .cloned()
            .ok_or(PropcheckError::NotRegistered {
                type_name: type_name::<T>(),
            })
    })
}

/// Look up the arbitrary for `T`, instantiating and caching the default
/// when none is registered.
///
/// Instantiation happens outside the registry borrow because container
/// defaults recursively resolve their element types.
pub fn resolve<T: DefaultArbitrary>() -> Arbitrary<T> {
    if let Ok(existing) = get::<T>() {
        return existing;
    }
    let instantiated = T::default_arbitrary();
    let cached = instantiated.clone();
    REGISTRY.with(move |cell| {
        cell.borrow_mut()
            .entries
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(cached));
    });
    instantiated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Prng, Size};
    use crate::gen::Gen;
    use crate::shrink::Shrinker;

    #[derive(Debug, Clone, PartialEq)]
    struct Celsius(i64);

    #[test]
    fn test_builtins_present() {
        assert!(get::<i64>().is_ok());
        assert!(get::<bool>().is_ok());
        assert!(get::<String>().is_ok());
    }

    #[test]
    fn test_register_and_get() {
        let arbitrary = Arbitrary::new(
            Gen::<i64>::int_range(-40, 100).map(Celsius),
            Shrinker::<i64>::int().convert(|c: &Celsius| c.0, Celsius),
        );
        register(arbitrary).unwrap();

        let fetched = get::<Celsius>().unwrap();
        let mut prng = Prng::new(1);
        let value = fetched.gen().sample(&mut prng, Size::new(10)).unwrap();
        assert!((-40..100).contains(&value.0));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        register(Arbitrary::from_gen(Gen::constant(Celsius(0)))).unwrap();
        match register(Arbitrary::from_gen(Gen::constant(Celsius(1)))) {
            Err(PropcheckError::AlreadyRegistered { type_name }) => {
                assert!(type_name.contains("Celsius"));
            }
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn test_shadowing_builtin_fails() {
        match register(Arbitrary::from_gen(Gen::<i64>::int())) {
            Err(PropcheckError::AlreadyRegistered { .. }) => {}
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_not_registered() {
        match get::<Celsius>() {
            Err(PropcheckError::NotRegistered { type_name }) => {
                assert!(type_name.contains("Celsius"));
            }
            other => panic!("expected missing error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_resolve_instantiates_and_caches() {
        assert!(get::<Vec<i64>>().is_err(), "containers start uncached");
        let _ = resolve::<Vec<i64>>();
        assert!(get::<Vec<i64>>().is_ok(), "resolve caches the factory result");
    }
}
