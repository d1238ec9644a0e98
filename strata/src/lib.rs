//! `strata` provides lazy, memoizing property containers with decoration
//! chains.
//!
//! A container is built from a map of *activators*: one function per property,
//! each computing its value from a view of the fully-resolved siblings.
//! Properties are computed on first read and cached for the container's
//! lifetime; construction runs nothing.
//!
//! [`rollup`] merges several activator maps into one. Where maps collide on a
//! key, the later activator *decorates* the earlier one: it produces the
//! key's final value, and reading its own key from inside it yields the
//! earlier layer's value. Every other activator in the container observes
//! only final, fully-decorated values.
//!
//! ```
//! use strata::{Scope, activators, lazy, rollup};
//!
//! let base = activators! {
//!     "a" => |_: &Scope<String>| Ok("original".to_owned()),
//!     "b" => |scope: &Scope<String>| Ok(format!("b saw {}", scope.get("a")?)),
//! };
//! let decorator = activators! {
//!     "a" => |scope: &Scope<String>| Ok(format!("decorated {}", scope.get("a")?)),
//! };
//!
//! let container = lazy(rollup([base, decorator]));
//! assert_eq!(container.get("a").unwrap().as_str(), "decorated original");
//! assert_eq!(container.get("b").unwrap().as_str(), "b saw decorated original");
//! ```
//!
//! # Evaluation model
//!
//! Single-threaded and synchronous: the only state is one lazy cell per chain
//! layer, written exactly once on successful evaluation. Containers are
//! `!Sync`, so cross-thread first-access races cannot be expressed. A genuine
//! dependency cycle between activators is detected and reported as
//! [`ResolveError::CyclicDependency`] rather than recursing without bound.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod activator;
pub use activator::{ActivatorFn, Activators, rollup};

mod container;
pub use container::{LazyContainer, Scope, lazy};

mod error;
pub use error::ResolveError;

mod macros;
