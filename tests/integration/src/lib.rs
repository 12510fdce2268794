//! End-to-end synthesis tests for AccountStack.
//!
//! Every test writes a registry file and a policy directory into a temporary
//! directory and runs the full synthesizer against them through the
//! filesystem loader. Nothing talks to AWS.
//!
//! ```text
//! cargo test -p accountstack-integration
//! ```

use std::fs;
use std::path::Path;
use std::sync::Once;

use accountstack_core::{EnvironmentRegistry, OperatorRole, SynthConfig};
use accountstack_policy::FsPolicyLoader;
use accountstack_synth::{DeclarationGraph, SynthResult, Synthesizer};
use tempfile::TempDir;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// SSO instance used by every fixture.
pub const SSO_INSTANCE_ARN: &str = "arn:aws:sso:::instance/ssoins-7223a1b2c3d4e5f6";

/// The registry most tests run against.
pub const STANDARD_REGISTRY: &str = r#"{
  "environments": [
    { "name": "ROOT", "kind": "root", "account": "111111111111", "region": "us-east-2" },
    { "name": "DEV", "account": "222222222222", "region": "us-east-2", "access": "full" },
    { "name": "TESTING", "account": "333333333333", "region": "us-east-2" },
    { "name": "PROD", "account": "444444444444", "region": "us-east-2" }
  ]
}"#;

const BASELINE_FILES: [&str; 4] = [
    "SE_DevOps.json",
    "SE_DBFullAccess.json",
    "SE_DevFullAccess.json",
    "SE_DenyIAMRiskyActions.json",
];

/// A registry file plus a policy directory on disk.
#[derive(Debug)]
pub struct Fixture {
    dir: TempDir,
    /// Configuration pointing at the fixture's files.
    pub config: SynthConfig,
}

impl Fixture {
    /// Write `registry_json` and one policy document for every file the
    /// registry's environments need.
    #[must_use]
    pub fn new(registry_json: &str) -> Self {
        init_tracing();

        let dir = tempfile::tempdir().expect("create temp dir");
        let environments = dir.path().join("environments.json");
        fs::write(&environments, registry_json).expect("write registry");

        let policies = dir.path().join("policy-definitions");
        fs::create_dir(&policies).expect("create policy dir");
        for file in BASELINE_FILES {
            write_policy(&policies, file, "s3:*");
        }
        let registry = EnvironmentRegistry::from_json(registry_json).expect("valid registry");
        for env in registry.iter() {
            write_policy(&policies, &format!("SE_CUSTOM_{}.json", env.name), "ssm:GetParameter");
        }

        let config = SynthConfig::builder()
            .sso_instance_arn(Some(SSO_INSTANCE_ARN.to_owned()))
            .environments_file(environments)
            .policy_dir(policies)
            .build();
        Self { dir, config }
    }

    /// The standard four-environment fixture.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(STANDARD_REGISTRY)
    }

    /// Run as a DevOps operator.
    #[must_use]
    pub fn as_devops(mut self) -> Self {
        self.config.job_role = OperatorRole::DevOps;
        self
    }

    /// The policy directory.
    #[must_use]
    pub fn policy_dir(&self) -> &Path {
        &self.config.policy_dir
    }

    /// Root of the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Load the registry and run the synthesizer.
    pub fn synthesize(&self) -> SynthResult<DeclarationGraph> {
        let registry = EnvironmentRegistry::from_file(&self.config.environments_file)?;
        let loader = FsPolicyLoader::new(self.config.policy_dir.clone());
        Synthesizer::new(&registry, &self.config, &loader).synthesize()
    }
}

/// Write a one-statement policy document.
pub fn write_policy(dir: &Path, file: &str, action: &str) {
    let body = serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [{ "Effect": "Allow", "Action": action, "Resource": "*" }]
    });
    fs::write(dir.join(file), body.to_string()).expect("write policy");
}

mod test_gating;
mod test_grants;
mod test_limits;
mod test_networking;
mod test_ordering;
mod test_synthesis;
