//! Operator configuration for a synthesis run.
//!
//! Provides [`SynthConfig`], loaded from environment variables by
//! [`SynthConfig::from_env`]. The configuration is read once at startup and
//! passed explicitly to every rule; nothing downstream reads the process
//! environment on its own.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::{AccountStackError, AwsRegion};

/// The capacity the invoking operator is acting in.
///
/// Only [`OperatorRole::DevOps`] runs may touch the permission-set and
/// pipeline layers; those require a manual confirmation step in the SSO
/// console that other operators cannot perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperatorRole {
    /// Organization administrator (DevOps/IT).
    DevOps,
    /// Any other operator, including an unset role.
    #[default]
    Standard,
}

impl OperatorRole {
    /// Interpret a `JOB_ROLE` value. Only the exact string `DevOps` grants the
    /// DevOps role.
    #[must_use]
    pub fn from_job_role(value: Option<&str>) -> Self {
        match value {
            Some("DevOps") => Self::DevOps,
            _ => Self::Standard,
        }
    }

    /// Whether this role may realize permission sets and the pipeline.
    #[must_use]
    pub fn is_devops(self) -> bool {
        self == Self::DevOps
    }
}

/// Where the self-maintenance pipeline pulls its source from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PipelineSourceKind {
    /// A CodeCommit repository in the root account.
    #[default]
    CodeCommit,
    /// A GitHub repository reached through a CodeStar connection.
    GitHub,
}

impl PipelineSourceKind {
    /// Parse a `PIPELINE_SOURCE` value (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("codecommit") {
            Some(Self::CodeCommit)
        } else if value.eq_ignore_ascii_case("github") {
            Some(Self::GitHub)
        } else {
            None
        }
    }
}

/// Synthesis configuration.
///
/// # Examples
///
/// ```
/// use accountstack_core::{OperatorRole, SynthConfig};
///
/// let config = SynthConfig::builder()
///     .sso_instance_arn(Some("arn:aws:sso:::instance/ssoins-1".into()))
///     .job_role(OperatorRole::DevOps)
///     .build();
/// assert!(config.job_role.is_devops());
/// assert_eq!(config.github_branch, "main");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct SynthConfig {
    /// IAM Identity Center instance ARN that owns the permission sets.
    #[builder(default)]
    pub sso_instance_arn: Option<String>,

    /// Region of the permission-set stack. Defaults to the root region.
    #[builder(default)]
    pub sso_region: Option<AwsRegion>,

    /// Capacity the operator is acting in.
    #[builder(default)]
    pub job_role: OperatorRole,

    /// Parent domain for per-environment service subdomains. Networking is
    /// only declared when this is set.
    #[builder(default)]
    pub services_domain: Option<String>,

    /// Declare a shared API Gateway per child environment.
    #[builder(default = false)]
    pub create_api_gateway: bool,

    /// Declare an SES identity per child environment.
    #[builder(default = false)]
    pub create_email_service: bool,

    /// GitHub organization allowed to assume the CI role through OIDC.
    #[builder(default)]
    pub github_org_name: Option<String>,

    /// Branch that CI runs must originate from.
    #[builder(default = String::from("main"))]
    pub github_branch: String,

    /// Pipeline source provider.
    #[builder(default)]
    pub pipeline_source: PipelineSourceKind,

    /// Pipeline source repository (`owner/repo` for GitHub).
    #[builder(default = String::from("se-iam-permissions"))]
    pub pipeline_repository: String,

    /// Pipeline source branch.
    #[builder(default = String::from("release"))]
    pub pipeline_branch: String,

    /// CodeStar connection ARN, required for GitHub sources.
    #[builder(default)]
    pub pipeline_connection_arn: Option<String>,

    /// Directory holding the policy documents.
    #[builder(default = PathBuf::from("policy-definitions"))]
    pub policy_dir: PathBuf,

    /// Path of the environment registry file.
    #[builder(default = PathBuf::from("environments.json"))]
    pub environments_file: PathBuf,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SynthConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `SSO_INSTANCE_ARN` | *(unset)* |
    /// | `SSO_REGION` | *(root region)* |
    /// | `JOB_ROLE` | *(unset)* |
    /// | `SE_SERVICES_DOMAIN` | *(unset)* |
    /// | `CREATE_API_GATEWAY` | `false` |
    /// | `CREATE_EMAIL_SERVICE` | `false` |
    /// | `GITHUB_ORG_NAME` | *(unset)* |
    /// | `GITHUB_BRANCH` | `main` |
    /// | `PIPELINE_SOURCE` | `codecommit` |
    /// | `PIPELINE_REPOSITORY` | `se-iam-permissions` |
    /// | `PIPELINE_BRANCH` | `release` |
    /// | `PIPELINE_CONNECTION_ARN` | *(unset)* |
    /// | `POLICY_DIR` | `policy-definitions` |
    /// | `ENVIRONMENTS_FILE` | `environments.json` |
    /// | `LOG_LEVEL` | `info` |
    ///
    /// Empty values are treated as unset.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.sso_instance_arn = env_non_empty("SSO_INSTANCE_ARN");
        config.sso_region = env_non_empty("SSO_REGION").map(AwsRegion::new);
        config.job_role = OperatorRole::from_job_role(env_non_empty("JOB_ROLE").as_deref());
        config.services_domain = env_non_empty("SE_SERVICES_DOMAIN");
        config.github_org_name = env_non_empty("GITHUB_ORG_NAME");
        config.pipeline_connection_arn = env_non_empty("PIPELINE_CONNECTION_ARN");

        if let Some(v) = env_non_empty("CREATE_API_GATEWAY") {
            config.create_api_gateway = parse_bool(&v);
        }
        if let Some(v) = env_non_empty("CREATE_EMAIL_SERVICE") {
            config.create_email_service = parse_bool(&v);
        }
        if let Some(v) = env_non_empty("GITHUB_BRANCH") {
            config.github_branch = v;
        }
        if let Some(v) = env_non_empty("PIPELINE_SOURCE") {
            match PipelineSourceKind::parse(&v) {
                Some(kind) => config.pipeline_source = kind,
                None => tracing::warn!(value = %v, "ignoring unknown PIPELINE_SOURCE"),
            }
        }
        if let Some(v) = env_non_empty("PIPELINE_REPOSITORY") {
            config.pipeline_repository = v;
        }
        if let Some(v) = env_non_empty("PIPELINE_BRANCH") {
            config.pipeline_branch = v;
        }
        if let Some(v) = env_non_empty("POLICY_DIR") {
            config.policy_dir = PathBuf::from(v);
        }
        if let Some(v) = env_non_empty("ENVIRONMENTS_FILE") {
            config.environments_file = PathBuf::from(v);
        }
        if let Some(v) = env_non_empty("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// The SSO instance ARN, which every permission set needs.
    ///
    /// # Errors
    /// Returns [`AccountStackError::MissingConfiguration`] when unset.
    pub fn require_sso_instance_arn(&self) -> Result<&str, AccountStackError> {
        self.sso_instance_arn
            .as_deref()
            .ok_or_else(|| AccountStackError::MissingConfiguration("SSO_INSTANCE_ARN".to_owned()))
    }

    /// The CodeStar connection ARN, required when the pipeline pulls from
    /// GitHub.
    ///
    /// # Errors
    /// Returns [`AccountStackError::MissingConfiguration`] when unset.
    pub fn require_pipeline_connection_arn(&self) -> Result<&str, AccountStackError> {
        self.pipeline_connection_arn.as_deref().ok_or_else(|| {
            AccountStackError::MissingConfiguration("PIPELINE_CONNECTION_ARN".to_owned())
        })
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
