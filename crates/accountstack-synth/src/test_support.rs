//! Fixtures shared by the unit tests of this crate.

use accountstack_core::{
    AccessLevel, AccountId, AwsRegion, EnvironmentDescriptor, EnvironmentKind, EnvironmentName,
    EnvironmentRegistry, SynthConfig,
};
use accountstack_policy::MemoryPolicyLoader;

use crate::catalog;

pub const SSO_INSTANCE_ARN: &str = "arn:aws:sso:::instance/ssoins-1234567890abcdef";

pub fn descriptor(name: &str, account: &str, kind: EnvironmentKind) -> EnvironmentDescriptor {
    EnvironmentDescriptor::new(
        EnvironmentName::new(name).unwrap(),
        AccountId::new(account).unwrap(),
        AwsRegion::new("us-east-2"),
        kind,
    )
}

/// ROOT, DEV (full access), TESTING and PROD, all in us-east-2.
pub fn registry() -> EnvironmentRegistry {
    EnvironmentRegistry::new(vec![
        descriptor("ROOT", "111111111111", EnvironmentKind::Root),
        descriptor("DEV", "222222222222", EnvironmentKind::Child).with_access(AccessLevel::Full),
        descriptor("TESTING", "333333333333", EnvironmentKind::Child),
        descriptor("PROD", "444444444444", EnvironmentKind::Child),
    ])
    .unwrap()
}

/// Minimal configuration: only the SSO instance is set.
pub fn config() -> SynthConfig {
    SynthConfig::builder()
        .sso_instance_arn(Some(SSO_INSTANCE_ARN.to_owned()))
        .build()
}

/// A loader holding every document the registry's environments need.
pub fn full_loader(registry: &EnvironmentRegistry) -> MemoryPolicyLoader {
    let mut loader = MemoryPolicyLoader::new();
    for baseline in &catalog::BASELINE_POLICIES {
        loader.insert(baseline.file_name, statement(baseline.managed_policy_name));
    }
    for env in registry.iter() {
        loader.insert(
            catalog::custom_policy_file_name(&env.name),
            statement(&catalog::custom_policy_name(&env.name)),
        );
    }
    loader
}

fn statement(sid: &str) -> String {
    let sid: String = sid.chars().filter(char::is_ascii_alphanumeric).collect();
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [{ "Sid": sid, "Effect": "Allow", "Action": "s3:GetObject", "Resource": "*" }]
    })
    .to_string()
}
