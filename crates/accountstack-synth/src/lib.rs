//! Declaration rules and dependency composition for AccountStack.
//!
//! Given an [`EnvironmentRegistry`](accountstack_core::EnvironmentRegistry),
//! a [`SynthConfig`](accountstack_core::SynthConfig) and a
//! [`PolicyLoader`](accountstack_policy::PolicyLoader), the [`Synthesizer`]
//! applies every declaration rule and composes the result into an ordered
//! [`DeclarationGraph`] for an external provisioning engine to realize.
//!
//! The rules are also usable one at a time:
//!
//! - [`rules::declare_for_environment`]: policies and permission set of one
//!   environment.
//! - [`grants::grants_for_shared_resources`]: child access to the root's key
//!   and secret.
//! - [`shared::declare_shared_resources`]: key, secret, grants, CI trust.
//! - [`networking::declare_networking`]: service subdomains.
//! - [`pipeline::declare_pipeline`]: the self-maintenance pipeline.
//! - [`compose::compose`]: edges, conditional inclusion, ordering.

mod builder;
pub mod catalog;
pub mod compose;
mod error;
pub mod grants;
pub mod model;
pub mod networking;
pub mod pipeline;
pub mod rules;
pub mod shared;

#[cfg(test)]
mod test_support;

pub use builder::Synthesizer;
pub use compose::{DeclarationGraph, StackManifest, UnresolvedReference, compose, verify_order};
pub use error::{SynthError, SynthResult};
pub use model::{
    CrossAccountGrant, DeclarationSet, Layer, ManagedPolicy, PermissionSet, PermissionSetTarget,
    Properties, ResourceDeclaration, ResourceId, ResourceKind, SharedResource, StackSpec,
};
