//! Error type for container resolution.

use core::fmt;

/// An error surfaced by a property read or write on a lazy container.
///
/// All failures propagate synchronously to the immediate caller; the
/// container never retries or suppresses anything on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A write was attempted on a constructed container.
    ///
    /// Containers are read-only views; no write ever succeeds, and the
    /// container state is left untouched.
    ReadOnly {
        /// The property the caller tried to assign.
        key: String,
    },
    /// A read named a property outside the container's declared shape.
    UnknownProperty {
        /// The property that was requested.
        key: String,
    },
    /// An activator reported that it could not produce a value.
    ///
    /// The triggering cell is left unresolved, so a later read of the same
    /// property retries evaluation from scratch.
    ActivationFailed {
        /// The property whose activator failed. `None` until the container
        /// frame that invoked the activator stamps it on.
        key: Option<String>,
        /// The activator's own description of the failure.
        message: String,
    },
    /// A property was read while it was already mid-evaluation.
    ///
    /// This is a genuine cycle between activators (`a` reads `b`, whose
    /// activator reads `a` again) and cannot resolve; it is reported instead
    /// of recursing without bound.
    CyclicDependency {
        /// The property whose in-flight cell was re-entered.
        key: String,
    },
    /// A base-layer activator read its own key.
    ///
    /// Only decorating layers have an earlier layer to observe; the first
    /// activator in a chain sees no prior value for its own key.
    NoEarlierLayer {
        /// The property whose base layer read itself.
        key: String,
    },
}

impl ResolveError {
    /// Build an activation failure for an activator to return.
    ///
    /// The container fills in the key of the property whose evaluation
    /// surfaced the failure.
    pub fn failure(message: impl Into<String>) -> Self {
        ResolveError::ActivationFailed {
            key: None,
            message: message.into(),
        }
    }

    /// Stamp the failing property's key onto an activation failure.
    /// The innermost frame wins; every other error kind passes through.
    pub(crate) fn with_key(self, key: &str) -> Self {
        match self {
            ResolveError::ActivationFailed { key: None, message } => {
                ResolveError::ActivationFailed {
                    key: Some(key.to_owned()),
                    message,
                }
            }
            other => other,
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::ReadOnly { key } => {
                write!(f, "cannot set property '{key}': container is read-only")
            }
            ResolveError::UnknownProperty { key } => {
                write!(f, "unknown property '{key}'")
            }
            ResolveError::ActivationFailed { key, message } => match key {
                Some(key) => write!(f, "activator for '{key}' failed: {message}"),
                None => write!(f, "activator failed: {message}"),
            },
            ResolveError::CyclicDependency { key } => {
                write!(f, "cyclic dependency while resolving '{key}'")
            }
            ResolveError::NoEarlierLayer { key } => {
                write!(
                    f,
                    "activator for '{key}' read its own key, but no earlier layer defines it"
                )
            }
        }
    }
}

impl std::error::Error for ResolveError {}
