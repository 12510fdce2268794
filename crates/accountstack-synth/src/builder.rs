//! One-shot synthesis over explicit inputs.

use std::collections::HashMap;
use std::fmt;

use accountstack_core::{EnvironmentRegistry, SynthConfig};
use accountstack_policy::{limits, PolicyLoader};
use tracing::{debug, info};

use crate::compose::{compose, DeclarationGraph};
use crate::error::{SynthError, SynthResult};
use crate::model::{DeclarationSet, ResourceId, ResourceKind};
use crate::networking::declare_networking;
use crate::pipeline::declare_pipeline;
use crate::rules::declare_for_environment;
use crate::shared::declare_shared_resources;

/// Runs every declaration rule over a registry and composes the result.
///
/// Nothing is global: the registry, configuration, and loader are passed in,
/// and the graph is returned by value.
///
/// # Examples
///
/// ```
/// use accountstack_core::{EnvironmentRegistry, SynthConfig};
/// use accountstack_policy::MemoryPolicyLoader;
/// use accountstack_synth::Synthesizer;
///
/// let registry = EnvironmentRegistry::from_json(
///     r#"{"environments":[{"name":"ROOT","kind":"root","account":"111111111111","region":"us-east-2"}]}"#,
/// )
/// .unwrap();
/// let config = SynthConfig::builder()
///     .sso_instance_arn(Some("arn:aws:sso:::instance/ssoins-1".into()))
///     .build();
/// let loader = MemoryPolicyLoader::new().with_document("SE_CUSTOM_ROOT.json", "{}");
///
/// let graph = Synthesizer::new(&registry, &config, &loader).synthesize().unwrap();
/// assert!(!graph.declarations.is_empty());
/// ```
pub struct Synthesizer<'a, L: ?Sized> {
    registry: &'a EnvironmentRegistry,
    config: &'a SynthConfig,
    loader: &'a L,
}

impl<L: ?Sized> fmt::Debug for Synthesizer<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synthesizer")
            .field("environments", &self.registry.len())
            .field("job_role", &self.config.job_role)
            .finish_non_exhaustive()
    }
}

impl<'a, L: PolicyLoader + ?Sized> Synthesizer<'a, L> {
    /// Bind the inputs of a run.
    #[must_use]
    pub fn new(registry: &'a EnvironmentRegistry, config: &'a SynthConfig, loader: &'a L) -> Self {
        Self {
            registry,
            config,
            loader,
        }
    }

    /// Produce the declaration graph, or the first error encountered.
    ///
    /// # Errors
    /// Any configuration, policy, limit, or composition error. No partial
    /// graph is ever returned.
    pub fn synthesize(&self) -> SynthResult<DeclarationGraph> {
        self.config.require_sso_instance_arn()?;
        info!(
            environments = self.registry.len(),
            job_role = ?self.config.job_role,
            "synthesizing declarations"
        );

        let shared = declare_shared_resources(self.registry, self.config)?;
        let mut set = shared.set;

        for env in self.registry.iter() {
            set.extend(declare_for_environment(
                env,
                self.registry,
                self.config,
                self.loader,
            )?);
        }

        set.extend(declare_networking(self.registry, self.config));

        let upstream: Vec<ResourceId> = set
            .declarations
            .iter()
            .filter(|d| matches!(d.kind, ResourceKind::ManagedPolicy | ResourceKind::PermissionSet))
            .map(|d| d.id.clone())
            .collect();
        set.extend(declare_pipeline(self.registry, self.config, &upstream)?);

        check_limits(&set)?;
        debug!(declarations = set.len(), "all rules applied");

        compose(set, shared.grants, self.config.job_role)
    }
}

fn check_limits(set: &DeclarationSet) -> SynthResult<()> {
    // Permission set names are unique per SSO instance.
    let mut names: HashMap<&str, &ResourceId> = HashMap::new();
    for decl in &set.declarations {
        if let Some(policy) = decl.as_managed_policy() {
            limits::check_policy_size(&policy.managed_policy_name, &policy.policy_document)?;
        }
        if let Some(ps) = decl.as_permission_set() {
            if let Some(first) = names.insert(ps.name.as_str(), &decl.id) {
                return Err(SynthError::DuplicatePermissionSet {
                    name: ps.name.clone(),
                    first: first.clone(),
                    second: decl.id.clone(),
                });
            }
            limits::check_permission_set_references(
                &ps.name,
                ps.customer_managed_policy_references.len(),
                ps.managed_policies.len(),
            )?;
        }
    }
    Ok(())
}
