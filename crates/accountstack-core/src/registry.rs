//! The environment registry.
//!
//! Provides [`EnvironmentRegistry`], the fixed mapping of environment name to
//! account and region that every declaration rule iterates. Exactly one entry
//! is the administrative root; the rest are child environments. Whether an
//! entry is the root is decided once here, as an [`EnvironmentKind`], so no
//! caller ever has to compare names.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{AccountId, AccountStackError, AccountStackResult, AwsRegion, EnvironmentName};

/// Role of an environment within the organization unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentKind {
    /// The administrative account that owns shared resources and SSO.
    Root,
    /// A workload account.
    #[default]
    Child,
}

/// Breadth of the permission set generated for an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Full access to core services (development accounts).
    Full,
    /// Read-only plus the environment's custom policy.
    #[default]
    Restricted,
}

/// A single environment: name, target account, and region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentDescriptor {
    /// Environment name.
    pub name: EnvironmentName,
    /// Account receiving the environment's declarations.
    pub account: AccountId,
    /// Region receiving the environment's declarations.
    pub region: AwsRegion,
    /// Root or child.
    pub kind: EnvironmentKind,
    /// Permission-set archetype selector.
    pub access: AccessLevel,
}

impl EnvironmentDescriptor {
    /// Create a descriptor with [`AccessLevel::Restricted`].
    #[must_use]
    pub fn new(
        name: EnvironmentName,
        account: AccountId,
        region: AwsRegion,
        kind: EnvironmentKind,
    ) -> Self {
        Self {
            name,
            account,
            region,
            kind,
            access: AccessLevel::default(),
        }
    }

    /// Override the access level.
    #[must_use]
    pub fn with_access(mut self, access: AccessLevel) -> Self {
        self.access = access;
        self
    }

    /// Whether this is the administrative root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.kind == EnvironmentKind::Root
    }
}

/// On-disk registry shape.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    environments: Vec<RawEnvironment>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEnvironment {
    name: String,
    account: String,
    region: String,
    #[serde(default)]
    kind: EnvironmentKind,
    #[serde(default)]
    access: AccessLevel,
}

impl RawEnvironment {
    fn into_descriptor(self) -> AccountStackResult<EnvironmentDescriptor> {
        Ok(EnvironmentDescriptor::new(
            EnvironmentName::new(self.name)?,
            AccountId::new(self.account)?,
            AwsRegion::new(self.region),
            self.kind,
        )
        .with_access(self.access))
    }
}

/// Immutable, validated set of environments in declaration order.
///
/// # Examples
///
/// ```
/// use accountstack_core::EnvironmentRegistry;
///
/// let registry = EnvironmentRegistry::from_json(r#"{ "environments": [
///     { "name": "ROOT", "kind": "root", "account": "111111111111", "region": "us-east-2" },
///     { "name": "DEV", "account": "222222222222", "region": "us-east-2" }
/// ] }"#).unwrap();
/// assert_eq!(registry.root().name.as_str(), "ROOT");
/// assert_eq!(registry.children().count(), 1);
/// assert!(registry.lookup("PROD").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct EnvironmentRegistry {
    environments: Vec<EnvironmentDescriptor>,
    root: usize,
}

impl EnvironmentRegistry {
    /// Build a registry from descriptors.
    ///
    /// # Errors
    /// Returns [`AccountStackError::InvalidRegistry`] unless exactly one
    /// descriptor is the root and all names are unique.
    pub fn new(environments: Vec<EnvironmentDescriptor>) -> AccountStackResult<Self> {
        for (i, env) in environments.iter().enumerate() {
            if environments[..i].iter().any(|e| e.name == env.name) {
                return Err(AccountStackError::InvalidRegistry(format!(
                    "duplicate environment {}",
                    env.name
                )));
            }
        }

        let mut roots = environments
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_root())
            .map(|(i, _)| i);
        let root = match (roots.next(), roots.next()) {
            (Some(root), None) => root,
            (None, _) => {
                return Err(AccountStackError::InvalidRegistry(
                    "no environment is marked as root".to_owned(),
                ));
            }
            (Some(_), Some(_)) => {
                return Err(AccountStackError::InvalidRegistry(
                    "more than one environment is marked as root".to_owned(),
                ));
            }
        };

        Ok(Self { environments, root })
    }

    /// Parse a registry from its JSON representation.
    ///
    /// # Errors
    /// Returns [`AccountStackError::InvalidRegistry`] for malformed JSON, or
    /// the identifier validation error for a bad name or account.
    pub fn from_json(json: &str) -> AccountStackResult<Self> {
        let file: RegistryFile = serde_json::from_str(json)
            .map_err(|e| AccountStackError::InvalidRegistry(e.to_string()))?;
        let environments = file
            .environments
            .into_iter()
            .map(RawEnvironment::into_descriptor)
            .collect::<AccountStackResult<Vec<_>>>()?;
        Self::new(environments)
    }

    /// Load a registry file.
    ///
    /// # Errors
    /// Returns [`AccountStackError::MissingConfiguration`] if the file does not
    /// exist, [`AccountStackError::Io`] for other read failures, and the
    /// [`EnvironmentRegistry::from_json`] errors for bad content.
    pub fn from_file(path: &Path) -> AccountStackResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                AccountStackError::MissingConfiguration(format!(
                    "environment registry file {}",
                    path.display()
                ))
            } else {
                AccountStackError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let registry = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.display(),
            environments = registry.len(),
            root = %registry.root().name,
            "loaded environment registry"
        );
        Ok(registry)
    }

    /// Look up an environment by name.
    ///
    /// # Errors
    /// Returns [`AccountStackError::UnknownEnvironment`] if absent.
    pub fn lookup(&self, name: &str) -> AccountStackResult<&EnvironmentDescriptor> {
        self.environments
            .iter()
            .find(|e| e.name.as_str() == name)
            .ok_or_else(|| AccountStackError::UnknownEnvironment(name.to_owned()))
    }

    /// The administrative root environment.
    #[must_use]
    pub fn root(&self) -> &EnvironmentDescriptor {
        &self.environments[self.root]
    }

    /// Every environment except the root, in registry order.
    pub fn children(&self) -> impl Iterator<Item = &EnvironmentDescriptor> {
        self.environments.iter().filter(|e| !e.is_root())
    }

    /// Every environment, in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &EnvironmentDescriptor> {
        self.environments.iter()
    }

    /// Number of environments, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.environments.len()
    }

    /// Always false for a constructed registry; it holds at least the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }
}
