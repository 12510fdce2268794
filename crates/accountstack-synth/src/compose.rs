//! Dependency composition.
//!
//! Turns the rules' output into a [`DeclarationGraph`]: infers the edges
//! between managed policies and the permission sets that reference them,
//! drops the layers the operator may not realize, and orders everything so
//! each declaration comes after its dependencies.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use accountstack_core::{EnvironmentName, OperatorRole};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{Dfs, Walker};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{SynthError, SynthResult};
use crate::model::{
    CrossAccountGrant, DeclarationSet, Layer, PermissionSetTarget, ResourceDeclaration, ResourceId,
    StackSpec,
};

/// A stack together with the stacks it must be deployed after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackManifest {
    /// Stack metadata.
    #[serde(flatten)]
    pub spec: StackSpec,
    /// Names of stacks holding a dependency of this stack's resources.
    pub depends_on: BTreeSet<String>,
}

/// A customer-managed policy a permission set references but no declaration
/// of the run provides. It must already exist in the target account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedReference {
    /// The referencing permission set.
    pub permission_set: ResourceId,
    /// The managed policy name.
    pub policy_name: String,
}

/// The synthesis output handed to the provisioning engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationGraph {
    /// Included declarations, dependencies first.
    pub declarations: Vec<ResourceDeclaration>,
    /// Cross-account grants.
    pub grants: Vec<CrossAccountGrant>,
    /// Stacks holding at least one included declaration, dependencies first.
    pub stacks: Vec<StackManifest>,
    /// Declarations dropped by conditional inclusion.
    pub excluded: Vec<ResourceId>,
    /// Policy references left for the target accounts to satisfy.
    pub unresolved_references: Vec<UnresolvedReference>,
}

impl DeclarationGraph {
    /// Look up an included declaration.
    #[must_use]
    pub fn get(&self, id: &ResourceId) -> Option<&ResourceDeclaration> {
        self.declarations.iter().find(|d| &d.id == id)
    }

    /// Position of a declaration in the realization order.
    #[must_use]
    pub fn position(&self, id: &ResourceId) -> Option<usize> {
        self.declarations.iter().position(|d| &d.id == id)
    }

    /// Render the manifest as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns the serializer's error, which only happens on a broken
    /// `Serialize` implementation.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Compose declarations and grants into an ordered graph.
///
/// Unless `role` is [`OperatorRole::DevOps`], every declaration outside
/// [`Layer::Baseline`] is excluded, along with everything that depends on an
/// excluded declaration.
///
/// # Errors
/// - [`SynthError::DuplicateDeclaration`] if two declarations share an id.
/// - [`SynthError::UnknownDependency`] if a dependency is never declared.
/// - [`SynthError::CyclicDependency`] if the dependencies form a cycle.
pub fn compose(
    set: DeclarationSet,
    grants: Vec<CrossAccountGrant>,
    role: OperatorRole,
) -> SynthResult<DeclarationGraph> {
    let DeclarationSet {
        stacks,
        mut declarations,
    } = set;

    let mut index: HashMap<ResourceId, usize> = HashMap::with_capacity(declarations.len());
    for (i, decl) in declarations.iter().enumerate() {
        if index.insert(decl.id.clone(), i).is_some() {
            return Err(SynthError::DuplicateDeclaration(decl.id.clone()));
        }
    }

    let unresolved_references = link_policy_references(&mut declarations);

    let mut graph: DiGraphMap<usize, ()> = DiGraphMap::with_capacity(declarations.len(), 0);
    for i in 0..declarations.len() {
        graph.add_node(i);
    }
    for (i, decl) in declarations.iter().enumerate() {
        for dep in &decl.depends_on {
            let Some(&j) = index.get(dep) else {
                return Err(SynthError::UnknownDependency {
                    dependent: decl.id.clone(),
                    dependency: dep.clone(),
                });
            };
            graph.add_edge(j, i, ());
        }
    }

    let order = toposort(&graph, None)
        .map_err(|cycle| SynthError::CyclicDependency(declarations[cycle.node_id()].id.to_string()))?;

    let excluded_idx = if role.is_devops() {
        BTreeSet::new()
    } else {
        excluded_layers(&graph, &declarations)
    };

    let mut slots: Vec<Option<ResourceDeclaration>> = declarations.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(slots.len() - excluded_idx.len());
    let mut excluded = Vec::with_capacity(excluded_idx.len());
    for i in order {
        let Some(decl) = slots[i].take() else { continue };
        if excluded_idx.contains(&i) {
            excluded.push(decl.id);
        } else {
            ordered.push(decl);
        }
    }
    excluded.sort();

    let stacks = stack_manifests(&stacks, &ordered)?;

    info!(
        declarations = ordered.len(),
        excluded = excluded.len(),
        stacks = stacks.len(),
        grants = grants.len(),
        unresolved = unresolved_references.len(),
        "composed declaration graph"
    );

    Ok(DeclarationGraph {
        declarations: ordered,
        grants,
        stacks,
        excluded,
        unresolved_references,
    })
}

/// Check that every declaration in `sequence` comes after all of its
/// dependencies.
///
/// # Errors
/// - [`SynthError::OrderingViolation`] if a dependency comes at or after its
///   dependent.
/// - [`SynthError::UnknownDependency`] if a dependency is not in the
///   sequence at all.
pub fn verify_order(sequence: &[ResourceDeclaration]) -> SynthResult<()> {
    let positions: HashMap<&ResourceId, usize> = sequence
        .iter()
        .enumerate()
        .map(|(i, d)| (&d.id, i))
        .collect();
    for (i, decl) in sequence.iter().enumerate() {
        for dep in &decl.depends_on {
            match positions.get(dep) {
                Some(&j) if j < i => {}
                Some(_) => {
                    return Err(SynthError::OrderingViolation {
                        dependent: decl.id.clone(),
                        dependency: dep.clone(),
                    });
                }
                None => {
                    return Err(SynthError::UnknownDependency {
                        dependent: decl.id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Add an edge from each managed policy to every permission set that
/// references it by name in an environment the set targets. Returns the
/// references nothing in the run satisfies.
fn link_policy_references(declarations: &mut [ResourceDeclaration]) -> Vec<UnresolvedReference> {
    let mut by_name: BTreeMap<(&EnvironmentName, &str), ResourceId> = BTreeMap::new();
    for decl in declarations.iter() {
        if let Some(policy) = decl.as_managed_policy() {
            by_name.insert(
                (&decl.id.scope, policy.managed_policy_name.as_str()),
                decl.id.clone(),
            );
        }
    }

    let mut links: Vec<(usize, ResourceId)> = Vec::new();
    let mut unresolved = Vec::new();
    for (i, decl) in declarations.iter().enumerate() {
        let Some(set) = decl.as_permission_set() else {
            continue;
        };
        for name in &set.customer_managed_policy_references {
            let matches: Vec<&ResourceId> = match &set.target {
                PermissionSetTarget::Environment(env) => {
                    by_name.get(&(env, name.as_str())).into_iter().collect()
                }
                PermissionSetTarget::Organization => by_name
                    .iter()
                    .filter(|((_, policy), _)| *policy == name.as_str())
                    .map(|(_, id)| id)
                    .collect(),
            };
            if matches.is_empty() {
                warn!(
                    permission_set = %decl.id,
                    policy = %name,
                    "permission set references a policy not declared in this run"
                );
                unresolved.push(UnresolvedReference {
                    permission_set: decl.id.clone(),
                    policy_name: name.clone(),
                });
            }
            links.extend(matches.into_iter().map(|id| (i, id.clone())));
        }
    }

    for (i, id) in links {
        declarations[i].depends_on.insert(id);
    }
    unresolved.sort();
    unresolved
}

/// Declarations outside the baseline layer plus everything reachable from
/// them along dependency edges.
fn excluded_layers(
    graph: &DiGraphMap<usize, ()>,
    declarations: &[ResourceDeclaration],
) -> BTreeSet<usize> {
    let mut excluded = BTreeSet::new();
    for (i, decl) in declarations.iter().enumerate() {
        if decl.layer != Layer::Baseline && !excluded.contains(&i) {
            excluded.extend(Dfs::new(graph, i).iter(graph));
        }
    }
    excluded
}

fn stack_manifests(
    stacks: &[StackSpec],
    ordered: &[ResourceDeclaration],
) -> SynthResult<Vec<StackManifest>> {
    let stack_of: HashMap<&ResourceId, &str> = ordered
        .iter()
        .map(|d| (&d.id, d.stack.as_str()))
        .collect();

    let mut depends_on: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
    for decl in ordered {
        let entry = depends_on.entry(decl.stack.as_str()).or_default();
        for dep in &decl.depends_on {
            if let Some(&dep_stack) = stack_of.get(dep) {
                if dep_stack != decl.stack {
                    entry.insert(dep_stack.to_owned());
                }
            }
        }
    }

    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for stack in stacks {
        if depends_on.contains_key(stack.name.as_str()) {
            graph.add_node(stack.name.as_str());
        }
    }
    for (stack, deps) in &depends_on {
        for dep in deps {
            graph.add_edge(dep.as_str(), *stack, ());
        }
    }
    let order = toposort(&graph, None)
        .map_err(|cycle| SynthError::CyclicDependency(cycle.node_id().to_owned()))?;
    let rank: HashMap<&str, usize> = order.into_iter().enumerate().map(|(i, s)| (s, i)).collect();

    let mut manifests: Vec<StackManifest> = stacks
        .iter()
        .filter_map(|spec| {
            let deps = depends_on.get(spec.name.as_str())?;
            Some(StackManifest {
                spec: spec.clone(),
                depends_on: deps.clone(),
            })
        })
        .collect();
    manifests.sort_by_key(|m| rank.get(m.spec.name.as_str()).copied().unwrap_or(usize::MAX));
    Ok(manifests)
}
