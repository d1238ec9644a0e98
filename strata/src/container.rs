//! The lazy container: per-property cells, memoized evaluation, and the
//! resolved view handed to activators.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;

use crate::activator::{ActivatorFn, Activators};
use crate::error::ResolveError;

/// State of one chain layer's lazy cell.
///
/// Cells move `Unresolved` → `InFlight` → `Resolved` exactly once; a failed
/// activation drops the cell back to `Unresolved` so a later read retries.
/// Reading an `InFlight` cell is a genuine dependency cycle.
enum LayerCell<V> {
    Unresolved,
    InFlight,
    Resolved(Rc<V>),
}

/// One property of a container: its decoration chain plus a lazy cell per
/// layer. The last layer's cell holds the property's final value.
struct Slot<V: 'static> {
    chain: Vec<Rc<ActivatorFn<V>>>,
    cells: Vec<RefCell<LayerCell<V>>>,
}

impl<V> Slot<V> {
    fn new(chain: Vec<Rc<ActivatorFn<V>>>) -> Self {
        let cells = chain
            .iter()
            .map(|_| RefCell::new(LayerCell::Unresolved))
            .collect();
        Slot { chain, cells }
    }

    fn top_layer(&self) -> usize {
        // Chains are never empty: every registered key has at least one layer.
        self.chain.len() - 1
    }
}

/// A read-only, lazily-evaluated container over an activator map.
///
/// Each property is computed by its activator chain on first read and cached
/// for the container's lifetime; later reads return the identical cached
/// value without re-invoking anything. Construction itself invokes no
/// activator.
///
/// Containers are single-threaded by construction (the cells are
/// [`RefCell`]-backed, so the type is `!Sync`); there is no mutation path
/// besides first-time evaluation, and [`set`](Self::set) always fails.
pub struct LazyContainer<V: 'static> {
    slots: IndexMap<String, Slot<V>>,
}

impl<V> LazyContainer<V> {
    /// Wrap an activator map into a container. No activator runs here.
    pub fn new(activators: Activators<V>) -> Self {
        let slots = activators
            .chains
            .into_iter()
            .map(|(key, chain)| (key, Slot::new(chain.layers)))
            .collect();
        LazyContainer { slots }
    }

    /// Read property `key`, evaluating its activator chain on first access.
    ///
    /// Returns the cached value on every later read. Fails with
    /// [`ResolveError::UnknownProperty`] for keys outside the declared shape,
    /// or with whatever the activator chain raised; a failed activation
    /// leaves the cell unresolved, so the next read retries.
    pub fn get(&self, key: &str) -> Result<Rc<V>, ResolveError> {
        let slot = self.slot(key)?;
        self.resolve_layer(key, slot, slot.top_layer())
    }

    /// Reject an attempt to assign a property.
    ///
    /// Containers are read-only views; this always fails with
    /// [`ResolveError::ReadOnly`], for declared and undeclared keys alike,
    /// and leaves the container untouched. It exists so callers working with
    /// runtime-computed keys get the documented assignment failure instead of
    /// no API at all.
    pub fn set(&self, key: impl Into<String>, _value: V) -> Result<(), ResolveError> {
        Err(ResolveError::ReadOnly { key: key.into() })
    }

    /// The property names this container exposes, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Number of declared properties.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the container declares no properties.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether `key` is part of the declared shape.
    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    fn slot(&self, key: &str) -> Result<&Slot<V>, ResolveError> {
        self.slots.get(key).ok_or_else(|| ResolveError::UnknownProperty {
            key: key.to_owned(),
        })
    }

    /// Resolve one layer of `key`'s chain, memoized.
    ///
    /// The layer's activator runs with a [`Scope`] that redirects reads of
    /// `key` itself to the layer below, and reads of every other key to that
    /// key's final chain.
    fn resolve_layer(
        &self,
        key: &str,
        slot: &Slot<V>,
        layer: usize,
    ) -> Result<Rc<V>, ResolveError> {
        {
            let cell = slot.cells[layer].borrow();
            match &*cell {
                LayerCell::Resolved(value) => {
                    trace!(key, layer, "cell hit");
                    return Ok(Rc::clone(value));
                }
                LayerCell::InFlight => {
                    trace!(key, layer, "cell re-entered mid-evaluation");
                    return Err(ResolveError::CyclicDependency {
                        key: key.to_owned(),
                    });
                }
                LayerCell::Unresolved => {}
            }
        }

        trace!(key, layer, "evaluating cell");
        *slot.cells[layer].borrow_mut() = LayerCell::InFlight;

        let scope = Scope {
            container: self,
            frame: Frame { key, layer },
        };
        // The borrow is released around the call: the activator may read any
        // sibling cell, recursively landing back here.
        match (slot.chain[layer])(&scope) {
            Ok(value) => {
                let value = Rc::new(value);
                *slot.cells[layer].borrow_mut() = LayerCell::Resolved(Rc::clone(&value));
                Ok(value)
            }
            Err(err) => {
                trace!(key, layer, %err, "activator failed");
                *slot.cells[layer].borrow_mut() = LayerCell::Unresolved;
                Err(err.with_key(key))
            }
        }
    }
}

impl<V> fmt::Debug for LazyContainer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, slot) in &self.slots {
            let resolved = matches!(
                &*slot.cells[slot.top_layer()].borrow(),
                LayerCell::Resolved(_)
            );
            map.entry(&key, if resolved { &"<resolved>" } else { &"<lazy>" });
        }
        map.finish()
    }
}

/// The chain frame a [`Scope`] belongs to: the property and layer whose
/// activator is currently running.
struct Frame<'c> {
    key: &'c str,
    layer: usize,
}

/// The resolved view of a container, as seen by a running activator.
///
/// Reading any *other* property yields that property's final, fully-decorated
/// value, triggering its lazy evaluation if needed. Reading the activator's
/// *own* property yields the layer directly below it in the decoration chain;
/// the base layer has nothing below and fails with
/// [`ResolveError::NoEarlierLayer`].
pub struct Scope<'c, V: 'static> {
    container: &'c LazyContainer<V>,
    frame: Frame<'c>,
}

impl<'c, V> Scope<'c, V> {
    /// Read a property through this view.
    pub fn get(&self, key: &str) -> Result<Rc<V>, ResolveError> {
        if self.frame.key == key {
            if self.frame.layer == 0 {
                return Err(ResolveError::NoEarlierLayer {
                    key: key.to_owned(),
                });
            }
            let slot = self.container.slot(key)?;
            return self
                .container
                .resolve_layer(key, slot, self.frame.layer - 1);
        }
        self.container.get(key)
    }

    /// Whether `key` is part of the container's declared shape.
    pub fn contains(&self, key: &str) -> bool {
        self.container.contains(key)
    }
}

/// Wrap an activator map into a read-only, lazily-evaluated container.
///
/// This is the library's front door, typically fed the output of
/// [`rollup`](crate::rollup):
///
/// ```
/// use strata::{Scope, activators, lazy};
///
/// let container = lazy(activators! {
///     "a" => |_: &Scope<String>| Ok("value a".to_owned()),
///     "b" => |scope: &Scope<String>| Ok(format!("b saw: {}", scope.get("a")?)),
/// });
///
/// assert_eq!(container.get("b").unwrap().as_str(), "b saw: value a");
/// ```
pub fn lazy<V>(activators: Activators<V>) -> LazyContainer<V> {
    LazyContainer::new(activators)
}
