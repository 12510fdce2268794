//! Operator-role gating tests.

#[cfg(test)]
mod tests {
    use accountstack_core::EnvironmentName;
    use accountstack_synth::{Layer, ResourceId, ResourceKind};

    use crate::Fixture;

    #[test]
    fn test_should_exclude_permission_sets_and_pipeline_without_devops_role() {
        let graph = Fixture::standard().synthesize().unwrap();

        assert!(graph.declarations.iter().all(|d| d.layer == Layer::Baseline));
        assert!(!graph
            .declarations
            .iter()
            .any(|d| matches!(d.kind, ResourceKind::PermissionSet | ResourceKind::Pipeline)));
        let root = EnvironmentName::new("ROOT").unwrap();
        assert!(graph.excluded.contains(&ResourceId::new(&root, "SEIamPipeline")));
        assert!(graph.excluded.contains(&ResourceId::new(&root, "SE_DEVOPS_PERMISSION_SET")));
        assert!(graph
            .stacks
            .iter()
            .all(|s| s.spec.name != "SEIamPipelineStack" && s.spec.name != "SEPermissionSetStack"));
    }

    #[test]
    fn test_should_treat_other_job_roles_as_standard() {
        let mut fixture = Fixture::standard();
        fixture.config.job_role = accountstack_core::OperatorRole::from_job_role(Some("devops"));
        let graph = fixture.synthesize().unwrap();
        assert!(graph.declarations.iter().all(|d| d.layer == Layer::Baseline));
    }

    #[test]
    fn test_should_include_every_layer_for_devops() {
        let graph = Fixture::standard().as_devops().synthesize().unwrap();
        assert!(graph.excluded.is_empty());

        let sets: Vec<_> = graph
            .declarations
            .iter()
            .filter_map(|d| d.as_permission_set())
            .map(|ps| ps.name.as_str())
            .collect();
        assert_eq!(sets.len(), 5);
        for name in ["SE_DEVOPS", "SE_ROOT", "SE_DEV", "SE_TESTING", "SE_PROD"] {
            assert!(sets.contains(&name), "{name}");
        }
        assert!(graph.declarations.iter().any(|d| d.kind == ResourceKind::Pipeline));
    }

    #[test]
    fn test_should_place_permission_set_stack_after_policy_stacks_for_devops() {
        let graph = Fixture::standard().as_devops().synthesize().unwrap();
        let rank = |name: &str| graph.stacks.iter().position(|s| s.spec.name == name).unwrap();
        let sets = rank("SEPermissionSetStack");
        let pipeline = rank("SEIamPipelineStack");
        for policy_stack in ["SEIamDevStack", "SEIamTestingStack", "SEIamProdStack"] {
            assert!(rank(policy_stack) < sets);
            assert!(rank(policy_stack) < pipeline);
        }
        assert!(sets < pipeline);
    }
}
