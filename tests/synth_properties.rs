//! Property-based tests using proptest
//!
//! These tests synthesize the topology against randomized primary VPC
//! layouts and check the invariants every emitted template must hold.

use fsx_ontap_topology::cloud::{NetworkDescription, SubnetDescription, SubnetKind};
use fsx_ontap_topology::topology::MIN_ISOLATED_SUBNETS;
use fsx_ontap_topology::{synthesize, SynthError, SynthOptions, TopologyInputs};
use proptest::prelude::*;
use serde_json::{json, Value};

const PRIMARY_CIDR: &str = "172.31.0.0/16";

fn inputs() -> TopologyInputs {
    TopologyInputs {
        vpc_id: "vpc-0primary".to_string(),
        dns_ips: vec!["172.31.10.10".to_string(), "172.31.20.10".to_string()],
        service_account_secret_name: "fsx-ad-service-account".to_string(),
    }
}

/// Generate one subnet of the primary VPC
fn arb_subnet(index: usize) -> impl Strategy<Value = SubnetDescription> {
    (
        prop_oneof![
            Just(SubnetKind::Public),
            Just(SubnetKind::Private),
            Just(SubnetKind::Isolated)
        ],
        prop_oneof!["a", "b", "c", "d"],
        0usize..3, // shared route table slot
    )
        .prop_map(move |(kind, zone, table)| SubnetDescription {
            subnet_id: format!("subnet-{index:04}"),
            availability_zone: format!("us-east-1{zone}"),
            cidr: format!("172.31.{index}.0/24"),
            route_table_id: format!("rtb-{:?}-{table}", kind).to_lowercase(),
            kind,
        })
}

/// Generate a primary VPC with 0 to 7 subnets
fn arb_network() -> impl Strategy<Value = NetworkDescription> {
    (0usize..8)
        .prop_flat_map(|count| (0..count).map(arb_subnet).collect::<Vec<_>>())
        .prop_map(|subnets| NetworkDescription {
            vpc_id: "vpc-0primary".to_string(),
            vpc_cidr_block: PRIMARY_CIDR.to_string(),
            subnets,
        })
}

fn isolated_count(network: &NetworkDescription) -> usize {
    network.subnets_of(SubnetKind::Isolated).count()
}

/// Every `Ref` and `Fn::GetAtt` target in `value`
fn referenced_ids(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(id)) = map.get("Ref") {
                out.push(id.clone());
            }
            if let Some(Value::String(id)) = map
                .get("Fn::GetAtt")
                .and_then(|args| args.as_array())
                .and_then(|args| args.first())
            {
                out.push(id.clone());
            }
            map.values().for_each(|v| referenced_ids(v, out));
        }
        Value::Array(items) => items.iter().for_each(|v| referenced_ids(v, out)),
        _ => {}
    }
}

proptest! {
    /// Too few isolated subnets means nothing is declared
    #[test]
    fn test_sparse_vpc_gives_empty_template(network in arb_network()) {
        prop_assume!(isolated_count(&network) < MIN_ISOLATED_SUBNETS);

        let template = synthesize(&inputs(), &network, &SynthOptions::default()).unwrap();
        prop_assert!(template.resources.is_empty());
        prop_assert!(template.parameters.is_empty());
    }

    /// Strict mode reports the shortfall instead
    #[test]
    fn test_sparse_vpc_fails_in_strict_mode(network in arb_network()) {
        let found = isolated_count(&network);
        prop_assume!(found < MIN_ISOLATED_SUBNETS);

        let options = SynthOptions { strict: true, ..SynthOptions::default() };
        let err = synthesize(&inputs(), &network, &options).unwrap_err();
        let reported =
            matches!(err, SynthError::InsufficientIsolatedSubnets { found: f, .. } if f == found);
        prop_assert!(reported, "unexpected error {:?}", err);
    }

    /// One peering route per isolated subnet plus one per consumer subnet
    #[test]
    fn test_peering_route_count(network in arb_network()) {
        let isolated = isolated_count(&network);
        prop_assume!(isolated >= MIN_ISOLATED_SUBNETS);

        let template = synthesize(&inputs(), &network, &SynthOptions::default()).unwrap();
        let peering_routes: Vec<&Value> = template
            .resources_of_type("AWS::EC2::Route")
            .map(|(_, r)| &r.properties)
            .filter(|p| p.get("VpcPeeringConnectionId").is_some())
            .collect();
        prop_assert_eq!(peering_routes.len(), isolated + 2);

        let (consumer_vpc, _) = template.resources_of_type("AWS::EC2::VPC").next().unwrap();
        let towards_consumer = json!({"Fn::GetAtt": [consumer_vpc, "CidrBlock"]});
        let towards_primary = json!(PRIMARY_CIDR);
        let (to_consumer, to_primary): (Vec<&Value>, Vec<&Value>) = peering_routes
            .iter()
            .copied()
            .partition(|p| p["DestinationCidrBlock"] == towards_consumer);
        prop_assert_eq!(to_consumer.len(), isolated);
        prop_assert!(to_primary.iter().all(|p| p["DestinationCidrBlock"] == towards_primary));

        let isolated_tables: Vec<Value> = network
            .subnets_of(SubnetKind::Isolated)
            .map(|s| json!(s.route_table_id))
            .collect();
        let routed_tables: Vec<Value> =
            to_consumer.iter().map(|p| p["RouteTableId"].clone()).collect();
        prop_assert_eq!(routed_tables, isolated_tables);
    }

    /// Every reference names a declared resource, parameter or pseudo parameter
    #[test]
    fn test_all_references_resolve(network in arb_network()) {
        prop_assume!(isolated_count(&network) >= MIN_ISOLATED_SUBNETS);

        let template = synthesize(&inputs(), &network, &SynthOptions::default()).unwrap();
        for (id, resource) in &template.resources {
            let mut targets = Vec::new();
            referenced_ids(&resource.properties, &mut targets);
            targets.extend(resource.depends_on.iter().cloned());
            for target in targets {
                prop_assert!(
                    target.starts_with("AWS::")
                        || template.resources.contains_key(&target)
                        || template.parameters.contains_key(&target),
                    "{} references undeclared {}",
                    id,
                    target
                );
            }
        }
    }

    /// The file system spans every isolated subnet and prefers the first
    #[test]
    fn test_file_system_placement(network in arb_network()) {
        prop_assume!(isolated_count(&network) >= MIN_ISOLATED_SUBNETS);

        let template = synthesize(&inputs(), &network, &SynthOptions::default()).unwrap();
        let (_, file_system) = template.resources_of_type("AWS::FSx::FileSystem").next().unwrap();
        let isolated = network.isolated_subnet_ids();

        prop_assert_eq!(&file_system.properties["SubnetIds"], &json!(isolated));
        prop_assert_eq!(
            &file_system.properties["OntapConfiguration"]["PreferredSubnetId"],
            &json!(isolated[0])
        );
        prop_assert_eq!(
            &file_system.properties["OntapConfiguration"]["RouteTableIds"],
            &json!(network.route_table_ids())
        );
    }

    /// Synthesis is a pure function of its inputs
    #[test]
    fn test_synthesis_is_deterministic(network in arb_network()) {
        let first = synthesize(&inputs(), &network, &SynthOptions::default()).unwrap();
        let second = synthesize(&inputs(), &network, &SynthOptions::default()).unwrap();
        prop_assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
        prop_assert_eq!(first, second);
    }

    /// Logical ids stay alphanumeric whatever the stack is called
    #[test]
    fn test_logical_ids_alphanumeric(stack_name in "[A-Za-z][A-Za-z0-9-]{0,20}") {
        let network = NetworkDescription {
            vpc_id: "vpc-0primary".to_string(),
            vpc_cidr_block: PRIMARY_CIDR.to_string(),
            subnets: (0..2)
                .map(|i| SubnetDescription {
                    subnet_id: format!("subnet-{i}"),
                    availability_zone: format!("us-east-1{}", ['a', 'b'][i]),
                    cidr: format!("172.31.{i}.0/24"),
                    route_table_id: format!("rtb-{i}"),
                    kind: SubnetKind::Isolated,
                })
                .collect(),
        };
        let options = SynthOptions { stack_name, strict: true };
        let template = synthesize(&inputs(), &network, &options).unwrap();
        for id in template.resources.keys().chain(template.parameters.keys()) {
            prop_assert!(id.chars().all(|c| c.is_ascii_alphanumeric()), "bad id {}", id);
        }
    }
}
