//! Policy document loading for AccountStack.
//!
//! Policy documents are opaque, externally authored JSON files stored one per
//! policy in a directory. This crate resolves a name to a parsed
//! [`PolicyDocument`] and checks the size limits the identity service enforces
//! on managed policies and permission sets. It never interprets statements;
//! semantic validation is the provisioning engine's job.

mod document;
mod error;
pub mod limits;
mod loader;

pub use document::PolicyDocument;
pub use error::PolicyError;
pub use loader::{FsPolicyLoader, MemoryPolicyLoader, PolicyLoader};
