//! Cross-account grant tests.

#[cfg(test)]
mod tests {
    use accountstack_synth::{ResourceKind, SharedResource};

    use crate::Fixture;

    const GROWN_REGISTRY: &str = r#"{
      "environments": [
        { "name": "ROOT", "kind": "root", "account": "111111111111", "region": "us-east-2" },
        { "name": "DEV", "account": "222222222222", "region": "us-east-2", "access": "full" },
        { "name": "TESTING", "account": "333333333333", "region": "us-east-2" },
        { "name": "PROD", "account": "444444444444", "region": "us-east-2" },
        { "name": "SANDBOX", "account": "555555555555", "region": "eu-west-1", "access": "full" }
      ]
    }"#;

    #[test]
    fn test_should_grant_every_child_key_and_secret_access() {
        let graph = Fixture::standard().synthesize().unwrap();
        assert_eq!(graph.grants.len(), 6);
        for account in ["222222222222", "333333333333", "444444444444"] {
            let mine: Vec<_> = graph
                .grants
                .iter()
                .filter(|g| g.grantee_account.as_str() == account)
                .collect();
            assert_eq!(mine.len(), 2, "{account}");
            assert!(mine.iter().any(|g| g.resource == SharedResource::Key));
            assert!(mine.iter().any(|g| g.resource == SharedResource::Secret));
        }
        assert!(graph.grants.iter().all(|g| g.grantee_account.as_str() != "111111111111"));
    }

    #[test]
    fn test_should_extend_grants_when_environment_is_added() {
        let before = Fixture::standard().synthesize().unwrap();
        let after = Fixture::new(GROWN_REGISTRY).synthesize().unwrap();

        assert_eq!(after.grants.len(), before.grants.len() + 2);
        let sandbox: Vec<_> = after
            .grants
            .iter()
            .filter(|g| g.grantee.as_str() == "SANDBOX")
            .collect();
        assert_eq!(sandbox.len(), 2);
        assert!(sandbox.iter().all(|g| g.grantee_account.as_str() == "555555555555"));

        let grant_decls = after
            .declarations
            .iter()
            .filter(|d| d.kind == ResourceKind::Grant)
            .count();
        assert_eq!(grant_decls, after.grants.len());
    }

    #[test]
    fn test_should_declare_new_environment_stack_in_its_region() {
        let graph = Fixture::new(GROWN_REGISTRY).synthesize().unwrap();
        let stack = graph
            .stacks
            .iter()
            .find(|s| s.spec.name == "SEIamSandboxStack")
            .unwrap();
        assert_eq!(stack.spec.region.as_str(), "eu-west-1");
        assert_eq!(stack.spec.account.as_str(), "555555555555");
    }

    #[test]
    fn test_should_order_grants_after_shared_resources() {
        let graph = Fixture::standard().synthesize().unwrap();
        for grant in &graph.grants {
            let resource = graph.position(&grant.resource_id).unwrap();
            let grant_decls = graph
                .declarations
                .iter()
                .enumerate()
                .filter(|(_, d)| d.kind == ResourceKind::Grant && d.depends_on.contains(&grant.resource_id));
            for (i, _) in grant_decls {
                assert!(resource < i);
            }
        }
    }
}
