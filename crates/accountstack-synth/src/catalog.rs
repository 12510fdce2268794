//! Fixed names and constants of the organization unit.
//!
//! Everything here is static: policy file names, managed policy names, stack
//! names, and the permission-set archetypes. Anything that varies per
//! environment is derived from the environment name.

use accountstack_core::{
    AccessLevel, EnvironmentDescriptor, EnvironmentKind, EnvironmentName,
};

use crate::model::PermissionSetTarget;

/// A managed policy declared in every child environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselinePolicy {
    /// Logical name within the environment.
    pub logical_name: &'static str,
    /// Policy document file name.
    pub file_name: &'static str,
    /// Name of the policy in the account.
    pub managed_policy_name: &'static str,
    /// Description.
    pub description: &'static str,
}

/// Full access to DevOps services.
pub const DEVOPS_FULL_ACCESS: &str = "SE_DevOpsFullAccess";
/// Full access to database and storage services.
pub const DB_FULL_ACCESS: &str = "SE_DBFullAccess";
/// Full access to development services.
pub const DEV_FULL_ACCESS: &str = "SE_DevFullAccess";
/// Denies risky IAM actions.
pub const DENY_IAM_RISKY_ACTIONS: &str = "SE_DenyIAMRiskyActions";

/// The four baseline policies, in declaration order.
pub const BASELINE_POLICIES: [BaselinePolicy; 4] = [
    BaselinePolicy {
        logical_name: "DevOpsFullAccess",
        file_name: "SE_DevOps.json",
        managed_policy_name: DEVOPS_FULL_ACCESS,
        description: "This IAM policy provides full access to various AWS services considered \
                      DevOps services, allowing all actions on these services across all resources.",
    },
    BaselinePolicy {
        logical_name: "DBFullAccess",
        file_name: "SE_DBFullAccess.json",
        managed_policy_name: DB_FULL_ACCESS,
        description: "This IAM policy grants full access to a range of AWS database and storage \
                      services, including RDS, DynamoDB, Redshift, S3, and various backup services. \
                      It allows all actions on these services across all resources.",
    },
    BaselinePolicy {
        logical_name: "DevFullAccess",
        file_name: "SE_DevFullAccess.json",
        managed_policy_name: DEV_FULL_ACCESS,
        description: "This IAM policy grants full access to a range of AWS services",
    },
    BaselinePolicy {
        logical_name: "IAMRiskyActions",
        file_name: "SE_DenyIAMRiskyActions.json",
        managed_policy_name: DENY_IAM_RISKY_ACTIONS,
        description: "This IAM policy denies a range of potentially risky IAM actions, such as \
                      creating users, changing passwords, and updating account details, across all \
                      resources. Additionally, it specifically prevents editing of policies \
                      starting with 'SE_' by the policy holder.",
    },
];

/// Logical name of an environment's custom policy (`CUSTOM_DEV`).
#[must_use]
pub fn custom_policy_logical_name(env: &EnvironmentName) -> String {
    format!("CUSTOM_{env}")
}

/// File name of an environment's custom policy (`SE_CUSTOM_DEV.json`).
#[must_use]
pub fn custom_policy_file_name(env: &EnvironmentName) -> String {
    format!("SE_CUSTOM_{env}.json")
}

/// Managed name of an environment's custom policy (`SE_CUSTOM_DEV`).
#[must_use]
pub fn custom_policy_name(env: &EnvironmentName) -> String {
    format!("SE_CUSTOM_{env}")
}

/// Description of an environment's custom policy.
#[must_use]
pub fn custom_policy_description(env: &EnvironmentName) -> String {
    format!("Special and carefully designed policies for the SE {env} Organization Unit")
}

/// Account-wide read-only access.
pub const READ_ONLY_ACCESS_ARN: &str = "arn:aws:iam::aws:policy/ReadOnlyAccess";
/// Billing read-only access.
pub const BILLING_READ_ONLY_ACCESS_ARN: &str = "arn:aws:iam::aws:policy/AWSBillingReadOnlyAccess";
/// AWS-managed policies attached to every permission set.
pub const ALWAYS_ATTACHED_AWS_POLICIES: [&str; 2] =
    [READ_ONLY_ACCESS_ARN, BILLING_READ_ONLY_ACCESS_ARN];
/// Session duration of every permission set.
pub const SESSION_DURATION: &str = "PT8H";

/// Actions child accounts may perform with the shared key.
pub const KEY_GRANT_OPERATIONS: [&str; 6] = [
    "kms:CreateGrant",
    "kms:Decrypt",
    "kms:DescribeKey",
    "kms:Encrypt",
    "kms:GenerateDataKey*",
    "kms:ReEncrypt*",
];

/// Actions child accounts may perform on the shared secret.
pub const SECRET_READ_OPERATIONS: [&str; 2] = [
    "secretsmanager:DescribeSecret",
    "secretsmanager:GetSecretValue",
];

/// Stack holding the shared key, secret, grants, and CI trust.
pub const RESOURCES_STACK: &str = "SEDevOpsResourcesStack";
/// Stack holding every permission set.
pub const PERMISSION_SET_STACK: &str = "SEPermissionSetStack";
/// Stack holding the self-maintenance pipeline.
pub const PIPELINE_STACK: &str = "SEIamPipelineStack";
/// Stack holding the root's DNS delegation role.
pub const ROOT_NETWORKING_STACK: &str = "SERootNetworkingStack";

/// Policy stack of an environment (`SEIamDevStack`).
#[must_use]
pub fn iam_stack(env: &EnvironmentName) -> String {
    format!("SEIam{}Stack", env.title_case())
}

/// Networking stack of a child environment (`SEDevNetworkingStack`).
#[must_use]
pub fn networking_stack(env: &EnvironmentName) -> String {
    format!("SE{}NetworkingStack", env.title_case())
}

/// Logical name of the shared KMS key.
pub const SHARED_KEY: &str = "SERootKMSKey";
/// Alias of the shared KMS key.
pub const SHARED_KEY_ALIAS: &str = "SE_Root_KMS_Key";
/// Logical name of the shared secret.
pub const SHARED_SECRET: &str = "SEConfigs";
/// Name of the shared secret.
pub const SHARED_SECRET_NAME: &str = "SE_Configuration";
/// Name of the root's DNS delegation role.
pub const DELEGATION_ROLE: &str = "ServicesDelegationRole";
/// Bootstrap qualifier of the provisioning engine's deployment roles.
pub const BOOTSTRAP_QUALIFIER: &str = "hnb659fds";

/// A permission-set shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Archetype {
    /// Full access for development environments.
    Developer,
    /// Read-only plus the custom policy.
    Restricted,
    /// Read-only access to the administrative root.
    RootReadOnly,
    /// Organization-wide CI/CD access.
    DevOps,
}

impl Archetype {
    /// The archetype an environment's own permission set follows.
    #[must_use]
    pub fn for_environment(env: &EnvironmentDescriptor) -> Self {
        match (env.kind, env.access) {
            (EnvironmentKind::Root, _) => Self::RootReadOnly,
            (EnvironmentKind::Child, AccessLevel::Full) => Self::Developer,
            (EnvironmentKind::Child, AccessLevel::Restricted) => Self::Restricted,
        }
    }

    /// Permission set name (`SE_DEV`, `SE_DEVOPS`).
    #[must_use]
    pub fn permission_set_name(self, env: &EnvironmentName) -> String {
        match self {
            Self::DevOps => "SE_DEVOPS".to_owned(),
            _ => format!("SE_{env}"),
        }
    }

    /// Logical name of the permission set declaration.
    #[must_use]
    pub fn logical_name(self, env: &EnvironmentName) -> String {
        match self {
            Self::DevOps => "SE_DEVOPS_PERMISSION_SET".to_owned(),
            _ => format!("{env}_PERMISSION_SET"),
        }
    }

    /// Description of the permission set.
    #[must_use]
    pub fn description(self, env: &EnvironmentName) -> String {
        match self {
            Self::Developer => format!(
                "Grants full-access to core AWS services. Intended for SE {env} OU ONLY."
            ),
            Self::Restricted => format!(
                "Allows read-only and basic/limited access to the SE {} OU.",
                organization_unit_label(env)
            ),
            Self::RootReadOnly => {
                format!("Allows read-only and basic/limited access to the {env} OU.")
            }
            Self::DevOps => {
                "Grants full-access to core CI/CD services. Intended for a DevOps person.".to_owned()
            }
        }
    }

    /// Accounts the permission set is meant for.
    #[must_use]
    pub fn target(self, env: &EnvironmentName) -> PermissionSetTarget {
        match self {
            Self::DevOps => PermissionSetTarget::Organization,
            _ => PermissionSetTarget::Environment(env.clone()),
        }
    }

    /// Customer-managed policies referenced, by managed name.
    #[must_use]
    pub fn customer_managed_policies(self, env: &EnvironmentName) -> Vec<String> {
        match self {
            Self::Developer => vec![
                DEVOPS_FULL_ACCESS.to_owned(),
                DB_FULL_ACCESS.to_owned(),
                DEV_FULL_ACCESS.to_owned(),
                DENY_IAM_RISKY_ACTIONS.to_owned(),
                custom_policy_name(env),
            ],
            Self::Restricted | Self::RootReadOnly => {
                vec![DENY_IAM_RISKY_ACTIONS.to_owned(), custom_policy_name(env)]
            }
            Self::DevOps => vec![DEVOPS_FULL_ACCESS.to_owned()],
        }
    }
}

/// Organization unit label used in descriptions; `PROD` is spelled out.
fn organization_unit_label(env: &EnvironmentName) -> &str {
    match env.as_str() {
        "PROD" => "PRODUCTION",
        other => other,
    }
}
