//! Dependency ordering tests.

#[cfg(test)]
mod tests {
    use accountstack_core::{EnvironmentName, OperatorRole};
    use accountstack_synth::{
        DeclarationSet, ResourceDeclaration, ResourceId, ResourceKind, SynthError, compose,
        verify_order,
    };

    use crate::Fixture;

    fn id(scope: &str, name: &str) -> ResourceId {
        ResourceId::new(&EnvironmentName::new(scope).unwrap(), name)
    }

    #[test]
    fn test_should_order_every_dependency_first() {
        let graph = Fixture::standard().as_devops().synthesize().unwrap();
        verify_order(&graph.declarations).unwrap();
    }

    #[test]
    fn test_should_order_policies_before_permission_sets() {
        let graph = Fixture::standard().as_devops().synthesize().unwrap();
        let dev_set = graph.position(&id("ROOT", "DEV_PERMISSION_SET")).unwrap();
        for policy in [
            "DevOpsFullAccess",
            "DBFullAccess",
            "DevFullAccess",
            "IAMRiskyActions",
            "CUSTOM_DEV",
        ] {
            let at = graph.position(&id("DEV", policy)).unwrap();
            assert!(at < dev_set, "{policy}");
        }
    }

    #[test]
    fn test_should_report_root_reference_to_undeclared_policy() {
        let graph = Fixture::standard().as_devops().synthesize().unwrap();
        assert_eq!(graph.unresolved_references.len(), 1);
        assert_eq!(graph.unresolved_references[0].policy_name, "SE_DenyIAMRiskyActions");
        assert_eq!(
            graph.unresolved_references[0].permission_set,
            id("ROOT", "ROOT_PERMISSION_SET")
        );
    }

    #[test]
    fn test_should_reject_reversed_sequence() {
        let graph = Fixture::standard().as_devops().synthesize().unwrap();
        let mut reversed = graph.declarations.clone();
        reversed.reverse();
        let err = verify_order(&reversed).unwrap_err();
        assert!(matches!(err, SynthError::OrderingViolation { .. }));
    }

    #[test]
    fn test_should_reject_cycle() {
        let a = id("ROOT", "A");
        let b = id("ROOT", "B");
        let mut set = DeclarationSet::new();
        set.push(
            ResourceDeclaration::new(a.clone(), ResourceKind::Role, "S", serde_json::json!({}))
                .with_dependency(&b),
        );
        set.push(
            ResourceDeclaration::new(b, ResourceKind::Role, "S", serde_json::json!({}))
                .with_dependency(&a),
        );
        let err = compose(set, Vec::new(), OperatorRole::DevOps).unwrap_err();
        assert!(matches!(err, SynthError::CyclicDependency(_)));
    }
}
