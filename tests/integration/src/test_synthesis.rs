//! Whole-run synthesis tests.

#[cfg(test)]
mod tests {
    use accountstack_core::{AccountStackError, EnvironmentName};
    use accountstack_policy::{FsPolicyLoader, PolicyError, PolicyLoader};
    use accountstack_synth::{ResourceId, ResourceKind, SynthError};

    use crate::Fixture;

    fn id(scope: &str, name: &str) -> ResourceId {
        ResourceId::new(&EnvironmentName::new(scope).unwrap(), name)
    }

    #[test]
    fn test_should_produce_identical_manifests_across_runs() {
        let fixture = Fixture::standard().as_devops();
        let first = fixture.synthesize().unwrap();
        let second = fixture.synthesize().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn test_should_declare_baseline_policies_in_every_child() {
        let graph = Fixture::standard().synthesize().unwrap();
        for env in ["DEV", "TESTING", "PROD"] {
            let policies: Vec<_> = graph
                .declarations
                .iter()
                .filter(|d| d.kind == ResourceKind::ManagedPolicy && d.id.scope.as_str() == env)
                .collect();
            assert_eq!(policies.len(), 5, "{env}");
        }
        let root_policies: Vec<_> = graph
            .declarations
            .iter()
            .filter(|d| d.kind == ResourceKind::ManagedPolicy && d.id.scope.as_str() == "ROOT")
            .collect();
        assert_eq!(root_policies.len(), 1);
        assert_eq!(root_policies[0].id, id("ROOT", "CUSTOM_ROOT"));
    }

    #[test]
    fn test_should_carry_policy_documents_verbatim() {
        let fixture = Fixture::standard();
        let graph = fixture.synthesize().unwrap();
        let expected = FsPolicyLoader::new(fixture.policy_dir())
            .load("SE_DevFullAccess.json")
            .unwrap();
        let decl = graph.get(&id("TESTING", "DevFullAccess")).unwrap();
        assert_eq!(decl.as_managed_policy().unwrap().policy_document, expected);
    }

    #[test]
    fn test_should_serialize_manifest_sections() {
        let graph = Fixture::standard().as_devops().synthesize().unwrap();
        let value: serde_json::Value = serde_json::from_str(&graph.to_json().unwrap()).unwrap();
        for key in ["declarations", "grants", "stacks", "excluded", "unresolvedReferences"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["stacks"][0]["terminationProtection"], true);
    }

    #[test]
    fn test_should_fail_without_sso_instance_arn() {
        let mut fixture = Fixture::standard();
        fixture.config.sso_instance_arn = None;
        let err = fixture.synthesize().unwrap_err();
        assert!(matches!(
            err,
            SynthError::Config(AccountStackError::MissingConfiguration(ref v)) if v == "SSO_INSTANCE_ARN"
        ));
        assert!(err.to_string().contains("SSO_INSTANCE_ARN"));
    }

    #[test]
    fn test_should_name_missing_policy_document() {
        let fixture = Fixture::standard();
        std::fs::remove_file(fixture.policy_dir().join("SE_CUSTOM_TESTING.json")).unwrap();
        let err = fixture.synthesize().unwrap_err();
        assert!(matches!(
            err,
            SynthError::Policy(PolicyError::PolicyNotFound { ref name, .. }) if name == "SE_CUSTOM_TESTING.json"
        ));
    }

    #[test]
    fn test_should_reject_invalid_policy_document() {
        let fixture = Fixture::standard();
        std::fs::write(fixture.policy_dir().join("SE_DBFullAccess.json"), "[1, 2]").unwrap();
        let err = fixture.synthesize().unwrap_err();
        assert!(matches!(
            err,
            SynthError::Policy(PolicyError::PolicyDocumentInvalid { ref name, .. }) if name == "SE_DBFullAccess.json"
        ));
    }

    #[test]
    fn test_should_reject_registry_with_two_roots() {
        let fixture = Fixture::standard();
        std::fs::write(
            &fixture.config.environments_file,
            r#"{"environments":[
                {"name":"ROOT","kind":"root","account":"111111111111","region":"us-east-2"},
                {"name":"OTHER","kind":"root","account":"222222222222","region":"us-east-2"}
            ]}"#,
        )
        .unwrap();
        let err = fixture.synthesize().unwrap_err();
        assert!(matches!(err, SynthError::Config(AccountStackError::InvalidRegistry(_))));
    }
}
