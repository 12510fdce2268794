//! Synthesis errors.
//!
//! Every variant is fatal to the run: a synthesis either produces a complete
//! declaration graph or nothing.

use accountstack_core::AccountStackError;
use accountstack_policy::PolicyError;

use crate::model::ResourceId;

/// Error raised while synthesizing a declaration graph.
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    /// Configuration or registry problem.
    #[error(transparent)]
    Config(#[from] AccountStackError),

    /// Policy document problem.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// The dependency graph contains a cycle.
    #[error("cyclic dependency involving {0}")]
    CyclicDependency(String),

    /// A declaration depends on an id that nothing declares.
    #[error("{dependent} depends on undeclared resource {dependency}")]
    UnknownDependency {
        /// The declaring resource.
        dependent: ResourceId,
        /// The missing dependency.
        dependency: ResourceId,
    },

    /// Two declarations share an id.
    #[error("resource {0} is declared more than once")]
    DuplicateDeclaration(ResourceId),

    /// Two permission sets share a name within the SSO instance.
    #[error("permission set {name} is declared by both {first} and {second}")]
    DuplicatePermissionSet {
        /// The clashing permission set name.
        name: String,
        /// The declaration seen first.
        first: ResourceId,
        /// The later declaration with the same name.
        second: ResourceId,
    },

    /// A sequence places a resource before one of its dependencies.
    #[error("{dependent} is ordered before its dependency {dependency}")]
    OrderingViolation {
        /// The resource that comes too early.
        dependent: ResourceId,
        /// The dependency that comes after it.
        dependency: ResourceId,
    },
}

/// Convenience result type for synthesis.
pub type SynthResult<T> = Result<T, SynthError>;
