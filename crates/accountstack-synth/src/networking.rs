//! Per-environment service subdomains.
//!
//! The root account owns the parent hosted zone and a delegation role that
//! every child account may assume to publish its NS records there. Each child
//! gets `<env>.<domain>`, a DNS-validated certificate, and optionally a
//! regional API Gateway domain and an SES identity.

use accountstack_core::{EnvironmentDescriptor, EnvironmentRegistry, SynthConfig};
use serde_json::json;
use tracing::debug;

use crate::catalog;
use crate::model::{reference, DeclarationSet, ResourceDeclaration, ResourceId, ResourceKind, StackSpec};

/// Logical name of the imported parent zone in the root.
pub const PARENT_ZONE: &str = "ServicesHostedZoneRoot";

/// NS delegation record TTL, in seconds.
pub const DELEGATION_TTL_SECONDS: u64 = 300;

const BINARY_MEDIA_TYPES: [&str; 2] = ["application/vnd.ms-excel", "text/csv"];

/// Declare networking for the whole registry. Returns an empty set when no
/// services domain is configured.
#[must_use]
pub fn declare_networking(registry: &EnvironmentRegistry, config: &SynthConfig) -> DeclarationSet {
    let mut set = DeclarationSet::new();
    let Some(domain) = config.services_domain.as_deref() else {
        debug!("SE_SERVICES_DOMAIN is not set, skipping networking");
        return set;
    };

    declare_root(&mut set, registry, domain);
    for child in registry.children() {
        declare_child(&mut set, registry.root(), child, domain, config);
    }
    set
}

fn declare_root(set: &mut DeclarationSet, registry: &EnvironmentRegistry, domain: &str) {
    let root = registry.root();
    set.add_stack(StackSpec::new(
        catalog::ROOT_NETWORKING_STACK,
        root,
        "This stack contains the root hosted zone delegation for SE services.",
    ));

    let zone_id = ResourceId::new(&root.name, PARENT_ZONE);
    set.push(ResourceDeclaration::new(
        zone_id.clone(),
        ResourceKind::DnsZone,
        catalog::ROOT_NETWORKING_STACK,
        json!({ "lookup": true, "domainName": domain }),
    ));

    let principals: Vec<&str> = registry.children().map(|c| c.account.as_str()).collect();
    set.push(
        ResourceDeclaration::new(
            ResourceId::new(&root.name, catalog::DELEGATION_ROLE),
            ResourceKind::Role,
            catalog::ROOT_NETWORKING_STACK,
            json!({
                "roleName": catalog::DELEGATION_ROLE,
                "assumedBy": { "accounts": principals },
                "grantDelegation": reference(&zone_id, "hostedZoneId"),
            }),
        )
        .with_dependency(&zone_id),
    );
}

fn declare_child(
    set: &mut DeclarationSet,
    root: &EnvironmentDescriptor,
    env: &EnvironmentDescriptor,
    domain: &str,
    config: &SynthConfig,
) {
    let stack = catalog::networking_stack(&env.name);
    let title = env.name.title_case();
    let zone_name = format!("{}.{domain}", env.name.lower_case());
    set.add_stack(StackSpec::new(
        &stack,
        env,
        format!("This stack contains networking resources for the SE {title} account."),
    ));

    let zone_id = ResourceId::new(&env.name, format!("ServicesHostedZone{title}"));
    set.push(ResourceDeclaration::new(
        zone_id.clone(),
        ResourceKind::DnsZone,
        &stack,
        json!({ "zoneName": zone_name }),
    ));

    let delegation_role = ResourceId::new(&root.name, catalog::DELEGATION_ROLE);
    set.push(
        ResourceDeclaration::new(
            ResourceId::new(&env.name, "ServicesZoneDelegationRecord"),
            ResourceKind::DnsRecord,
            &stack,
            json!({
                "recordType": "NS",
                "delegatedZone": reference(&zone_id, "hostedZoneId"),
                "parentHostedZoneName": domain,
                "delegationRoleArn": format!(
                    "arn:aws:iam::{}:role/{}",
                    root.account,
                    catalog::DELEGATION_ROLE
                ),
                "ttl": DELEGATION_TTL_SECONDS,
            }),
        )
        .with_dependency(&zone_id)
        .with_dependency(&delegation_role),
    );

    let certificate_id = ResourceId::new(&env.name, "ServicesCertificate");
    set.push(
        ResourceDeclaration::new(
            certificate_id.clone(),
            ResourceKind::Certificate,
            &stack,
            json!({
                "domainName": zone_name,
                "validation": { "method": "DNS", "hostedZone": reference(&zone_id, "hostedZoneId") },
            }),
        )
        .with_dependency(&zone_id),
    );

    if config.create_api_gateway {
        let api_id = ResourceId::new(&env.name, format!("ServicesAPI{title}"));
        set.push(ResourceDeclaration::new(
            api_id.clone(),
            ResourceKind::RestApi,
            &stack,
            json!({
                "restApiName": "ServicesAPI",
                "description": format!(
                    "This is an API endpoint to support SE services in the {title} environment."
                ),
                "endpointTypes": ["REGIONAL"],
                "disableExecuteApiEndpoint": true,
                "binaryMediaTypes": BINARY_MEDIA_TYPES,
            }),
        ));

        let domain_id = ResourceId::new(&env.name, "ServicesAPICustomDomain");
        set.push(
            ResourceDeclaration::new(
                domain_id.clone(),
                ResourceKind::ApiDomain,
                &stack,
                json!({
                    "domainName": zone_name,
                    "certificate": reference(&certificate_id, "arn"),
                    "endpointType": "REGIONAL",
                    "basePathMapping": reference(&api_id, "restApiId"),
                }),
            )
            .with_dependency(&certificate_id)
            .with_dependency(&api_id),
        );

        set.push(
            ResourceDeclaration::new(
                ResourceId::new(&env.name, format!("{title}AliasRecord")),
                ResourceKind::DnsRecord,
                &stack,
                json!({
                    "recordType": "A",
                    "zone": reference(&zone_id, "hostedZoneId"),
                    "recordName": zone_name,
                    "aliasTarget": reference(&domain_id, "regionalDomainName"),
                }),
            )
            .with_dependency(&zone_id)
            .with_dependency(&domain_id),
        );
    }

    if config.create_email_service {
        set.push(
            ResourceDeclaration::new(
                ResourceId::new(&env.name, "ServicesIdentity"),
                ResourceKind::EmailIdentity,
                &stack,
                json!({ "identity": { "publicHostedZone": reference(&zone_id, "hostedZoneId") } }),
            )
            .with_dependency(&zone_id),
        );
    }
}
