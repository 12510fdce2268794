//! Core types, configuration, and the environment registry for AccountStack.
//!
//! This crate provides the foundational building blocks shared by the policy
//! loader and the synthesizer: validated AWS identifiers, the operator
//! configuration read from the process environment, and the immutable
//! [`EnvironmentRegistry`] that every declaration rule iterates.

mod config;
mod error;
mod registry;
mod types;

pub use config::{OperatorRole, PipelineSourceKind, SynthConfig};
pub use error::{AccountStackError, AccountStackResult};
pub use registry::{AccessLevel, EnvironmentDescriptor, EnvironmentKind, EnvironmentRegistry};
pub use types::{AccountId, AwsRegion, EnvironmentName};
