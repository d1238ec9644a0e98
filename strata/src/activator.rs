//! Activator maps and the rollup merge.
//!
//! An *activator* computes the value of one property, given a [`Scope`] over
//! the fully-resolved container it belongs to. An [`Activators`] map collects
//! them by property name; [`rollup`] merges several maps into one, turning
//! same-key collisions into decoration chains.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::container::Scope;
use crate::error::ResolveError;

/// The function type behind every property: given a view of the resolved
/// container, produce the property's value or fail.
///
/// Activators are synchronous and run at most once per container (per chain
/// layer). They are stored behind `Rc` so maps clone cheaply and rollup can
/// share layers between maps.
pub type ActivatorFn<V> = dyn Fn(&Scope<'_, V>) -> Result<V, ResolveError>;

/// One property's decoration chain: the ordered activators registered for a
/// single key, base first, most-decorating last.
///
/// A map built directly always holds single-layer chains; longer chains only
/// arise through [`rollup`].
pub(crate) struct Chain<V: 'static> {
    pub(crate) layers: Vec<Rc<ActivatorFn<V>>>,
}

impl<V> Clone for Chain<V> {
    fn clone(&self) -> Self {
        Chain {
            layers: self.layers.clone(),
        }
    }
}

/// An insertion-ordered map from property name to activator chain.
///
/// This is the input to [`lazy`](crate::lazy): each key becomes one property
/// of the resulting container. Keys are unique within one map; registering a
/// key again replaces its chain. Decoration (several activators for one key,
/// later ones observing earlier ones) is expressed by merging maps with
/// [`rollup`], never within a single map.
pub struct Activators<V: 'static> {
    pub(crate) chains: IndexMap<String, Chain<V>>,
}

impl<V> Activators<V> {
    /// Create an empty activator map.
    pub fn new() -> Self {
        Activators {
            chains: IndexMap::new(),
        }
    }

    /// Register an activator for `key`, replacing any existing registration.
    pub fn insert<K, F>(&mut self, key: K, activator: F)
    where
        K: Into<String>,
        F: Fn(&Scope<'_, V>) -> Result<V, ResolveError> + 'static,
    {
        self.chains.insert(
            key.into(),
            Chain {
                layers: vec![Rc::new(activator)],
            },
        );
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn provide<K, F>(mut self, key: K, activator: F) -> Self
    where
        K: Into<String>,
        F: Fn(&Scope<'_, V>) -> Result<V, ResolveError> + 'static,
    {
        self.insert(key, activator);
        self
    }

    /// The property names this map defines, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }

    /// Number of properties defined.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether the map defines no properties.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Whether `key` is defined.
    pub fn contains(&self, key: &str) -> bool {
        self.chains.contains_key(key)
    }

    /// Length of `key`'s decoration chain, or 0 if `key` is not defined.
    ///
    /// Directly-built maps report 1 for every defined key; values above 1
    /// indicate a chain produced by [`rollup`].
    pub fn layer_count(&self, key: &str) -> usize {
        self.chains.get(key).map_or(0, |chain| chain.layers.len())
    }
}

impl<V> Clone for Activators<V> {
    fn clone(&self) -> Self {
        Activators {
            chains: self.chains.clone(),
        }
    }
}

impl<V> Default for Activators<V> {
    fn default() -> Self {
        Activators::new()
    }
}

impl<V> fmt::Debug for Activators<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, chain) in &self.chains {
            map.entry(&key, &format_args!("<{} layer(s)>", chain.layers.len()));
        }
        map.finish()
    }
}

/// Merge an ordered sequence of activator maps into one.
///
/// The result defines the union of all keys, ordered by first appearance.
/// Where several maps define the same key, their chains concatenate in input
/// order into a decoration chain: the latest layer produces the key's final
/// value, and its view of that key yields the layer before it (see
/// [`Scope::get`]). Every layer's view of every *other* key yields that key's
/// final, fully-decorated value.
///
/// Because chains concatenate, `rollup` is associative: `rollup([a, b, c])`,
/// `rollup([rollup([a, b]), c])` and `rollup([a, rollup([b, c])])` all
/// produce the same chains. Zero maps yield an empty map, and maps whose keys
/// never collide merge into a plain union.
///
/// ```
/// use strata::{Scope, activators, lazy, rollup};
///
/// let base = activators! {
///     "greeting" => |_: &Scope<String>| Ok("hello".to_owned()),
/// };
/// let decorator = activators! {
///     "greeting" => |scope: &Scope<String>| Ok(format!("{}, world", scope.get("greeting")?)),
/// };
///
/// let container = lazy(rollup([base, decorator]));
/// assert_eq!(container.get("greeting").unwrap().as_str(), "hello, world");
/// ```
pub fn rollup<V>(maps: impl IntoIterator<Item = Activators<V>>) -> Activators<V> {
    let mut merged = Activators::new();
    for map in maps {
        for (key, chain) in map.chains {
            match merged.chains.entry(key) {
                Entry::Occupied(mut occupied) => {
                    occupied.get_mut().layers.extend(chain.layers);
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(chain);
                }
            }
        }
    }
    merged
}
