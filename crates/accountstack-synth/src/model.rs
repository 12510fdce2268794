//! Declaration model: resources, grants, and stacks.

use std::collections::BTreeSet;
use std::fmt;

use accountstack_core::{AccountId, AwsRegion, EnvironmentDescriptor, EnvironmentName};
use accountstack_policy::PolicyDocument;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// What a declaration asks the provisioning engine to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    /// IAM customer-managed policy.
    ManagedPolicy,
    /// SSO permission set.
    PermissionSet,
    /// IAM role.
    Role,
    /// Secrets Manager secret.
    Secret,
    /// KMS key.
    Key,
    /// Cross-account grant on a shared key or secret.
    Grant,
    /// IAM OIDC identity provider.
    OidcProvider,
    /// Route53 hosted zone.
    DnsZone,
    /// Route53 record.
    DnsRecord,
    /// ACM certificate.
    Certificate,
    /// API Gateway REST API.
    RestApi,
    /// API Gateway custom domain.
    ApiDomain,
    /// SES identity.
    EmailIdentity,
    /// SNS topic.
    NotificationTopic,
    /// CodeBuild project.
    BuildProject,
    /// CodePipeline pipeline.
    Pipeline,
}

/// Inclusion layer. Everything outside [`Layer::Baseline`] is only realized
/// for DevOps operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Layer {
    /// Always realized.
    #[default]
    Baseline,
    /// SSO permission sets; need a manual console step.
    PermissionSets,
    /// The self-maintenance pipeline.
    Pipeline,
}

/// Identity of a declaration: the environment it is realized in plus a
/// logical name unique within that environment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId {
    /// Environment whose account receives the resource.
    pub scope: EnvironmentName,
    /// Logical name, unique within `scope`.
    pub logical_name: String,
}

impl ResourceId {
    /// Create an id.
    #[must_use]
    pub fn new(scope: &EnvironmentName, logical_name: impl Into<String>) -> Self {
        Self {
            scope: scope.clone(),
            logical_name: logical_name.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.logical_name)
    }
}

impl Serialize for ResourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A customer-managed IAM policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedPolicy {
    /// Name in the account (e.g. `SE_DevOpsFullAccess`).
    pub managed_policy_name: String,
    /// Description.
    pub description: String,
    /// Opaque policy body.
    pub policy_document: PolicyDocument,
}

/// Which accounts a permission set is meant for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionSetTarget {
    /// A single environment.
    Environment(EnvironmentName),
    /// Every environment of the organization unit.
    Organization,
}

/// An SSO permission set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    /// Permission set name (e.g. `SE_DEV`).
    pub name: String,
    /// Description.
    pub description: String,
    /// SSO instance the set belongs to.
    pub instance_arn: String,
    /// Intended accounts.
    pub target: PermissionSetTarget,
    /// ISO-8601 session duration.
    pub session_duration: String,
    /// Customer-managed policies referenced by name.
    pub customer_managed_policy_references: Vec<String>,
    /// AWS-managed policies referenced by ARN.
    pub managed_policies: Vec<String>,
}

/// Engine-facing properties of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Properties {
    /// Managed policy properties.
    ManagedPolicy(ManagedPolicy),
    /// Permission set properties.
    PermissionSet(PermissionSet),
    /// Untyped properties for every other kind.
    Json(Map<String, Value>),
}

/// A single resource the provisioning engine should realize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDeclaration {
    /// Identity.
    pub id: ResourceId,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Stack the resource is deployed with.
    pub stack: String,
    /// Inclusion layer.
    pub layer: Layer,
    /// Resources that must be realized first.
    pub depends_on: BTreeSet<ResourceId>,
    /// Engine-facing properties.
    pub properties: Properties,
}

impl ResourceDeclaration {
    /// Declare a resource with untyped properties.
    ///
    /// `properties` should be a JSON object; any other value is wrapped as
    /// `{"value": ...}`.
    #[must_use]
    pub fn new(id: ResourceId, kind: ResourceKind, stack: impl Into<String>, properties: Value) -> Self {
        let properties = match properties {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_owned(), other);
                map
            }
        };
        Self {
            id,
            kind,
            stack: stack.into(),
            layer: Layer::Baseline,
            depends_on: BTreeSet::new(),
            properties: Properties::Json(properties),
        }
    }

    /// Declare a managed policy.
    #[must_use]
    pub fn managed_policy(id: ResourceId, stack: impl Into<String>, policy: ManagedPolicy) -> Self {
        Self {
            id,
            kind: ResourceKind::ManagedPolicy,
            stack: stack.into(),
            layer: Layer::Baseline,
            depends_on: BTreeSet::new(),
            properties: Properties::ManagedPolicy(policy),
        }
    }

    /// Declare a permission set. Permission sets always live in
    /// [`Layer::PermissionSets`].
    #[must_use]
    pub fn permission_set(id: ResourceId, stack: impl Into<String>, set: PermissionSet) -> Self {
        Self {
            id,
            kind: ResourceKind::PermissionSet,
            stack: stack.into(),
            layer: Layer::PermissionSets,
            depends_on: BTreeSet::new(),
            properties: Properties::PermissionSet(set),
        }
    }

    /// Move the declaration into another layer.
    #[must_use]
    pub fn in_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    /// Add a dependency.
    #[must_use]
    pub fn with_dependency(mut self, id: &ResourceId) -> Self {
        self.depends_on.insert(id.clone());
        self
    }

    /// The managed policy, if this declares one.
    #[must_use]
    pub fn as_managed_policy(&self) -> Option<&ManagedPolicy> {
        match &self.properties {
            Properties::ManagedPolicy(policy) => Some(policy),
            _ => None,
        }
    }

    /// The permission set, if this declares one.
    #[must_use]
    pub fn as_permission_set(&self) -> Option<&PermissionSet> {
        match &self.properties {
            Properties::PermissionSet(set) => Some(set),
            _ => None,
        }
    }
}

/// Shared root resources that child accounts are granted access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SharedResource {
    /// The root's symmetric KMS key.
    Key,
    /// The root's configuration secret.
    Secret,
}

/// Explicit authorization for a child account on a shared root resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossAccountGrant {
    /// Resource being shared.
    pub resource: SharedResource,
    /// Resource id of the shared resource.
    pub resource_id: ResourceId,
    /// Child environment receiving access.
    pub grantee: EnvironmentName,
    /// Account of the child environment.
    pub grantee_account: AccountId,
    /// Allowed actions. Never a bare wildcard.
    pub operations: Vec<String>,
}

/// Deployment unit metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackSpec {
    /// Stack name.
    pub name: String,
    /// Environment the stack is deployed into.
    pub environment: EnvironmentName,
    /// Target account.
    pub account: AccountId,
    /// Target region.
    pub region: AwsRegion,
    /// Description.
    pub description: String,
    /// Whether the engine must refuse to delete the stack.
    pub termination_protection: bool,
}

impl StackSpec {
    /// A termination-protected stack in `env`'s account and region.
    #[must_use]
    pub fn new(name: impl Into<String>, env: &EnvironmentDescriptor, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            environment: env.name.clone(),
            account: env.account.clone(),
            region: env.region.clone(),
            description: description.into(),
            termination_protection: true,
        }
    }

    /// Override the region.
    #[must_use]
    pub fn in_region(mut self, region: AwsRegion) -> Self {
        self.region = region;
        self
    }
}

/// Uncomposed output of the declaration rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationSet {
    /// Stacks referenced by the declarations.
    pub stacks: Vec<StackSpec>,
    /// Declarations in rule order.
    pub declarations: Vec<ResourceDeclaration>,
}

impl DeclarationSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stack. A stack already registered under the same name is
    /// kept as is.
    pub fn add_stack(&mut self, stack: StackSpec) {
        if !self.stacks.iter().any(|s| s.name == stack.name) {
            self.stacks.push(stack);
        }
    }

    /// Append a declaration.
    pub fn push(&mut self, declaration: ResourceDeclaration) {
        self.declarations.push(declaration);
    }

    /// Merge another set into this one.
    pub fn extend(&mut self, other: Self) {
        for stack in other.stacks {
            self.add_stack(stack);
        }
        self.declarations.extend(other.declarations);
    }

    /// Declarations of the given kind.
    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &ResourceDeclaration> {
        self.declarations.iter().filter(move |d| d.kind == kind)
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether no declarations were made.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// A JSON reference to another declaration's attribute, resolved by the
/// engine at apply time.
#[must_use]
pub fn reference(id: &ResourceId, attribute: &str) -> Value {
    serde_json::json!({ "ref": id.to_string(), "attribute": attribute })
}
