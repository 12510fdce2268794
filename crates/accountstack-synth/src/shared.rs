//! Shared root resources: the KMS key, the configuration secret, their
//! cross-account grants, the CI trust role, and the organization-wide DevOps
//! permission set.

use accountstack_core::{EnvironmentDescriptor, EnvironmentRegistry, SynthConfig};
use serde_json::json;
use tracing::{debug, warn};

use crate::catalog::{self, Archetype};
use crate::error::SynthResult;
use crate::grants::{grant_declaration, grants_for_shared_resources};
use crate::model::{
    reference, CrossAccountGrant, DeclarationSet, ResourceDeclaration, ResourceId, ResourceKind,
    StackSpec,
};
use crate::rules::{permission_set_declaration, permission_set_stack};

const GITHUB_OIDC_URL: &str = "https://token.actions.githubusercontent.com";
const GITHUB_OIDC_SUBJECT: &str = "token.actions.githubusercontent.com:sub";
const STS_AUDIENCE: &str = "sts.amazonaws.com";

/// Logical name of the CI OIDC provider.
pub const OIDC_PROVIDER: &str = "GitHubOIDCProvider";
/// Logical name of the CI role.
pub const CI_ROLE: &str = "GitHubActionsRole";

/// Bootstrap roles of the provisioning engine that CI may assume.
const BOOTSTRAP_ROLES: [&str; 5] = [
    "cfn-exec",
    "deploy",
    "file-publishing",
    "image-publishing",
    "lookup",
];

/// ARN of a bootstrap role in a given account and region. `account` may be a
/// `*` pattern.
#[must_use]
pub fn bootstrap_role_arn(role: &str, account: &str, region: &str) -> String {
    format!(
        "arn:aws:iam::{account}:role/cdk-{}-{role}-role-{account}-{region}",
        catalog::BOOTSTRAP_QUALIFIER
    )
}

/// Root-scoped resources plus the grants that share them with every child.
#[derive(Debug, Clone)]
pub struct SharedDeclarations {
    /// Declarations, including one `Grant` declaration per grant.
    pub set: DeclarationSet,
    /// The grants themselves.
    pub grants: Vec<CrossAccountGrant>,
}

/// Declare the shared root resources.
///
/// # Errors
/// Fails with `MissingConfiguration` if the SSO instance ARN is absent, since
/// the DevOps permission set cannot be declared without it.
pub fn declare_shared_resources(
    registry: &EnvironmentRegistry,
    config: &SynthConfig,
) -> SynthResult<SharedDeclarations> {
    let instance_arn = config.require_sso_instance_arn()?;
    let root = registry.root();

    let mut set = DeclarationSet::new();
    set.add_stack(StackSpec::new(
        catalog::RESOURCES_STACK,
        root,
        "This stack contains important resources for DevOps management in SE.",
    ));

    let key_id = ResourceId::new(&root.name, catalog::SHARED_KEY);
    set.push(ResourceDeclaration::new(
        key_id.clone(),
        ResourceKind::Key,
        catalog::RESOURCES_STACK,
        json!({
            "alias": catalog::SHARED_KEY_ALIAS,
            "description": "This KMS key is used to encrypt SE resources that need customer-managed keys.",
            "enableKeyRotation": true,
        }),
    ));

    set.push(
        ResourceDeclaration::new(
            ResourceId::new(&root.name, catalog::SHARED_SECRET),
            ResourceKind::Secret,
            catalog::RESOURCES_STACK,
            json!({
                "secretName": catalog::SHARED_SECRET_NAME,
                "description": "This secret stores general configurations for SE projects.",
                "encryptionKey": reference(&key_id, "arn"),
                "secretObjectValue": { "se-root-kms-key-arn": reference(&key_id, "arn") },
            }),
        )
        .with_dependency(&key_id),
    );

    let grants = grants_for_shared_resources(registry);
    for grant in &grants {
        set.push(grant_declaration(grant));
    }

    match config.github_org_name.as_deref() {
        Some(org) => declare_ci_trust(&mut set, root, org, &config.github_branch),
        None => warn!("GITHUB_ORG_NAME is not set, skipping the CI OIDC trust role"),
    }

    set.add_stack(permission_set_stack(registry, config));
    set.push(permission_set_declaration(
        Archetype::DevOps,
        root,
        registry,
        instance_arn,
    ));

    debug!(
        declarations = set.len(),
        grants = grants.len(),
        "declared shared root resources"
    );
    Ok(SharedDeclarations { set, grants })
}

fn declare_ci_trust(set: &mut DeclarationSet, root: &EnvironmentDescriptor, org: &str, branch: &str) {
    let provider_id = ResourceId::new(&root.name, OIDC_PROVIDER);
    set.push(ResourceDeclaration::new(
        provider_id.clone(),
        ResourceKind::OidcProvider,
        catalog::RESOURCES_STACK,
        json!({ "url": GITHUB_OIDC_URL, "clientIds": [STS_AUDIENCE] }),
    ));

    let account = root.account.as_str();
    let region = root.region.as_str();
    let assumable: Vec<String> = BOOTSTRAP_ROLES
        .iter()
        .map(|role| bootstrap_role_arn(role, account, region))
        .collect();

    set.push(
        ResourceDeclaration::new(
            ResourceId::new(&root.name, CI_ROLE),
            ResourceKind::Role,
            catalog::RESOURCES_STACK,
            json!({
                "roleName": "github-actions-role",
                "assumedBy": {
                    "webIdentity": reference(&provider_id, "arn"),
                    "conditions": {
                        "StringLike": {
                            GITHUB_OIDC_SUBJECT: format!("repo:{org}/*:ref:refs/heads/{branch}"),
                        },
                    },
                },
                "policyStatements": [{
                    "effect": "Allow",
                    "actions": ["sts:AssumeRole"],
                    "resources": assumable,
                }],
            }),
        )
        .with_dependency(&provider_id),
    );
}
