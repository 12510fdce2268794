//! Service subdomain tests.

#[cfg(test)]
mod tests {
    use accountstack_synth::{Properties, ResourceKind};

    use crate::Fixture;

    fn with_domain() -> Fixture {
        let mut fixture = Fixture::standard();
        fixture.config.services_domain = Some("services.example.com".to_owned());
        fixture
    }

    #[test]
    fn test_should_skip_networking_without_domain() {
        let graph = Fixture::standard().synthesize().unwrap();
        assert!(!graph
            .declarations
            .iter()
            .any(|d| matches!(d.kind, ResourceKind::DnsZone | ResourceKind::Certificate)));
    }

    #[test]
    fn test_should_trust_child_accounts_from_registry() {
        let graph = with_domain().synthesize().unwrap();
        let role = graph
            .declarations
            .iter()
            .find(|d| d.id.to_string() == "ROOT/ServicesDelegationRole")
            .unwrap();
        let Properties::Json(props) = &role.properties else {
            panic!("delegation role should carry untyped properties");
        };
        assert_eq!(
            props["assumedBy"]["accounts"],
            serde_json::json!(["222222222222", "333333333333", "444444444444"])
        );
    }

    #[test]
    fn test_should_order_child_networking_after_root_networking() {
        let graph = with_domain().synthesize().unwrap();
        let rank = |name: &str| graph.stacks.iter().position(|s| s.spec.name == name).unwrap();
        let root = rank("SERootNetworkingStack");
        for child in ["SEDevNetworkingStack", "SETestingNetworkingStack", "SEProdNetworkingStack"] {
            assert!(root < rank(child), "{child}");
        }
        let dev = graph
            .stacks
            .iter()
            .find(|s| s.spec.name == "SEDevNetworkingStack")
            .unwrap();
        assert!(dev.depends_on.contains("SERootNetworkingStack"));
        assert_eq!(dev.spec.account.as_str(), "222222222222");
    }

    #[test]
    fn test_should_add_api_gateway_and_email_when_enabled() {
        let mut fixture = with_domain();
        fixture.config.create_api_gateway = true;
        fixture.config.create_email_service = true;
        let graph = fixture.synthesize().unwrap();
        let count = |kind| graph.declarations.iter().filter(|d| d.kind == kind).count();
        assert_eq!(count(ResourceKind::RestApi), 3);
        assert_eq!(count(ResourceKind::ApiDomain), 3);
        assert_eq!(count(ResourceKind::EmailIdentity), 3);
        accountstack_synth::verify_order(&graph.declarations).unwrap();
    }
}
