//! The collaborator environment a construction session builds against.
//!
//! Bundles the external collaborators the builder leans on: the bootstrap
//! registry (overload families, builtin operator table) and the
//! type-defaulting policy for untyped constants. Built once, then shared
//! read-only by any number of sequential sessions.

use quill_core::{DefaultPolicy, StdDefaults, Type, UntypedKind};
use quill_registry::Registry;

/// One environment: registry plus defaulting policy.
pub struct Environment {
    pub registry: Registry,
    defaults: Box<dyn DefaultPolicy>,
}

impl Environment {
    /// An environment with the standard defaulting policy.
    pub fn new(registry: Registry) -> Self {
        Environment {
            registry,
            defaults: Box::new(StdDefaults),
        }
    }

    /// An environment with a custom defaulting policy (e.g. one mapping
    /// rational constants to library bignum types).
    pub fn with_defaults(registry: Registry, defaults: Box<dyn DefaultPolicy>) -> Self {
        Environment { registry, defaults }
    }

    /// The concrete default type for an untyped-constant kind, if the
    /// policy declares one.
    pub fn default_type(&self, kind: &UntypedKind) -> Option<Type> {
        self.defaults.default_type(kind)
    }
}
