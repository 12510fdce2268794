//! Cross-account grant rules.
//!
//! The grantee list is recomputed from the registry on every run: adding an
//! environment to the registry extends every grant without touching any
//! other code.

use accountstack_core::{EnvironmentDescriptor, EnvironmentRegistry};

use crate::catalog;
use crate::model::{
    CrossAccountGrant, ResourceDeclaration, ResourceId, ResourceKind, SharedResource,
};

impl SharedResource {
    /// Logical name of the shared resource in the root environment.
    #[must_use]
    pub fn logical_name(self) -> &'static str {
        match self {
            Self::Key => catalog::SHARED_KEY,
            Self::Secret => catalog::SHARED_SECRET,
        }
    }

    /// Operations every child account receives.
    #[must_use]
    pub fn operations(self) -> &'static [&'static str] {
        match self {
            Self::Key => &catalog::KEY_GRANT_OPERATIONS,
            Self::Secret => &catalog::SECRET_READ_OPERATIONS,
        }
    }
}

/// One key grant and one secret grant per child environment: all key grants
/// first, then all secret grants, each in registry order.
#[must_use]
pub fn grants_for_shared_resources(registry: &EnvironmentRegistry) -> Vec<CrossAccountGrant> {
    let root = registry.root();
    [SharedResource::Key, SharedResource::Secret]
        .into_iter()
        .flat_map(|resource| {
            registry
                .children()
                .map(move |child| grant(root, resource, child))
        })
        .collect()
}

fn grant(
    root: &EnvironmentDescriptor,
    resource: SharedResource,
    child: &EnvironmentDescriptor,
) -> CrossAccountGrant {
    CrossAccountGrant {
        resource,
        resource_id: ResourceId::new(&root.name, resource.logical_name()),
        grantee: child.name.clone(),
        grantee_account: child.account.clone(),
        operations: resource
            .operations()
            .iter()
            .map(|op| (*op).to_owned())
            .collect(),
    }
}

/// The declaration realizing a grant: a resource-policy statement on the
/// shared resource, scoped to the root and ordered after that resource.
#[must_use]
pub fn grant_declaration(grant: &CrossAccountGrant) -> ResourceDeclaration {
    let logical_name = format!("{}Grant{}", grant.resource_id.logical_name, grant.grantee);
    ResourceDeclaration::new(
        ResourceId::new(&grant.resource_id.scope, logical_name),
        ResourceKind::Grant,
        catalog::RESOURCES_STACK,
        serde_json::json!({
            "resource": grant.resource_id.to_string(),
            "principal": { "account": grant.grantee_account.as_str() },
            "actions": grant.operations,
        }),
    )
    .with_dependency(&grant.resource_id)
}
