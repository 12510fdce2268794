//! Per-environment declaration rules.
//!
//! For a child environment: the four baseline policies, the environment's
//! custom policy, and the environment's permission set. For the root: only
//! its custom policy and the root read-only permission set. The root is never
//! the target of the full-access policies meant for child workloads.

use accountstack_core::{EnvironmentDescriptor, EnvironmentRegistry, SynthConfig};
use accountstack_policy::PolicyLoader;
use tracing::debug;

use crate::catalog::{self, Archetype};
use crate::error::SynthResult;
use crate::model::{
    DeclarationSet, ManagedPolicy, PermissionSet, ResourceDeclaration, ResourceId, StackSpec,
};

/// Declare the resources owned by one environment.
///
/// # Errors
/// Fails with `MissingConfiguration` before declaring anything if the SSO
/// instance ARN is absent, and with the loader's error if a policy document
/// cannot be loaded. No partial set is ever returned.
pub fn declare_for_environment<L: PolicyLoader + ?Sized>(
    env: &EnvironmentDescriptor,
    registry: &EnvironmentRegistry,
    config: &SynthConfig,
    loader: &L,
) -> SynthResult<DeclarationSet> {
    let instance_arn = config.require_sso_instance_arn()?;

    let mut set = DeclarationSet::new();
    let stack = catalog::iam_stack(&env.name);
    set.add_stack(StackSpec::new(
        &stack,
        env,
        format!(
            "This stack contains IAM policies for the SE {} account.",
            env.name.title_case()
        ),
    ));

    if !env.is_root() {
        for baseline in &catalog::BASELINE_POLICIES {
            let policy = ManagedPolicy {
                managed_policy_name: baseline.managed_policy_name.to_owned(),
                description: baseline.description.to_owned(),
                policy_document: loader.load(baseline.file_name)?,
            };
            set.push(ResourceDeclaration::managed_policy(
                ResourceId::new(&env.name, baseline.logical_name),
                &stack,
                policy,
            ));
        }
    }

    let custom = ManagedPolicy {
        managed_policy_name: catalog::custom_policy_name(&env.name),
        description: catalog::custom_policy_description(&env.name),
        policy_document: loader.load(&catalog::custom_policy_file_name(&env.name))?,
    };
    set.push(ResourceDeclaration::managed_policy(
        ResourceId::new(&env.name, catalog::custom_policy_logical_name(&env.name)),
        &stack,
        custom,
    ));

    let archetype = Archetype::for_environment(env);
    set.add_stack(permission_set_stack(registry, config));
    set.push(permission_set_declaration(
        archetype,
        env,
        registry,
        instance_arn,
    ));

    debug!(
        environment = %env.name,
        archetype = ?archetype,
        declarations = set.len(),
        "declared environment resources"
    );
    Ok(set)
}

/// The stack every permission set is deployed with: the root account, in the
/// SSO region when one is configured.
#[must_use]
pub fn permission_set_stack(registry: &EnvironmentRegistry, config: &SynthConfig) -> StackSpec {
    let root = registry.root();
    let stack = StackSpec::new(
        catalog::PERMISSION_SET_STACK,
        root,
        "This stack contains SSO Permission Sets for SE accounts.",
    );
    match &config.sso_region {
        Some(region) => stack.in_region(region.clone()),
        None => stack,
    }
}

/// Declare a permission set of the given archetype for `env`.
///
/// The declaration is scoped to the root environment, whose account hosts the
/// SSO instance, whatever environment it targets.
#[must_use]
pub fn permission_set_declaration(
    archetype: Archetype,
    env: &EnvironmentDescriptor,
    registry: &EnvironmentRegistry,
    instance_arn: &str,
) -> ResourceDeclaration {
    let set = PermissionSet {
        name: archetype.permission_set_name(&env.name),
        description: archetype.description(&env.name),
        instance_arn: instance_arn.to_owned(),
        target: archetype.target(&env.name),
        session_duration: catalog::SESSION_DURATION.to_owned(),
        customer_managed_policy_references: archetype.customer_managed_policies(&env.name),
        managed_policies: catalog::ALWAYS_ATTACHED_AWS_POLICIES
            .iter()
            .map(|arn| (*arn).to_owned())
            .collect(),
    };
    ResourceDeclaration::permission_set(
        ResourceId::new(&registry.root().name, archetype.logical_name(&env.name)),
        catalog::PERMISSION_SET_STACK,
        set,
    )
}
