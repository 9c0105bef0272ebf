//! Consumer VPC, peering and route wiring

use crate::cloud::network::SUBNET_TYPE_TAG;
use crate::cloud::{Ipv4Cidr, NetworkDescription, SubnetKind};
use crate::error::SynthError;
use crate::resource::ec2::{
    InternetGateway, Route, RouteTable, Subnet, SubnetRouteTableAssociation, Vpc,
    VpcGatewayAttachment, VpcPeeringConnection,
};
use crate::template::{ConstructPath, Expr, ResourceRef, Stack, Tag};

pub const CONSUMER_VPC_ID: &str = "Consumer VPC";
pub const CONSUMER_VPC_CIDR: &str = "10.10.0.0/24";
pub const MAX_AZS: usize = 2;
pub const PUBLIC_SUBNET_MASK: u8 = 28;
pub const PEERING_ID: &str = "VPC Peering connection";

const PUBLIC_SUBNET_GROUP: &str = "Public";
const ANYWHERE: &str = "0.0.0.0/0";

/// One public subnet of the consumer VPC
#[derive(Debug, Clone)]
pub struct PublicSubnet {
    pub subnet: ResourceRef,
    pub route_table: ResourceRef,
    pub availability_zone: Expr,
    pub cidr: Ipv4Cidr,
}

/// Handles on the declared consumer VPC
#[derive(Debug, Clone)]
pub struct ConsumerNetwork {
    pub vpc: ResourceRef,
    pub cidr: Ipv4Cidr,
    pub public_subnets: Vec<PublicSubnet>,
}

/// VPC with one public /28 per availability zone, an internet gateway and
/// no NAT gateways
pub fn declare_consumer_network(stack: &mut Stack) -> Result<ConsumerNetwork, SynthError> {
    let root = ConstructPath::new(CONSUMER_VPC_ID);
    let name = format!("{}/{}", stack.name(), root);
    let cidr: Ipv4Cidr = CONSUMER_VPC_CIDR.parse()?;

    let vpc = stack.add(
        &root.child("Resource"),
        &Vpc {
            cidr_block: cidr.to_string(),
            enable_dns_hostnames: true,
            enable_dns_support: true,
            instance_tenancy: "default".to_string(),
            tags: vec![Tag::name(&name)],
        },
    )?;

    let gateway = stack.add(
        &root.child("IGW"),
        &InternetGateway {
            tags: vec![Tag::name(&name)],
        },
    )?;
    let attachment = stack.add(
        &root.child("VPCGW"),
        &VpcGatewayAttachment {
            internet_gateway_id: gateway.reference(),
            vpc_id: vpc.reference(),
        },
    )?;

    let mut public_subnets = Vec::with_capacity(MAX_AZS);
    for (index, subnet_cidr) in cidr
        .subdivide(PUBLIC_SUBNET_MASK, MAX_AZS)?
        .into_iter()
        .enumerate()
    {
        let scope = root.child(format!("{PUBLIC_SUBNET_GROUP}Subnet{}", index + 1));
        let scope_name = format!("{}/{}", stack.name(), scope);
        let availability_zone = Expr::availability_zone(index);

        let subnet = stack.add(
            &scope.child("Subnet"),
            &Subnet {
                availability_zone: availability_zone.clone(),
                cidr_block: subnet_cidr.to_string(),
                map_public_ip_on_launch: true,
                tags: vec![
                    Tag {
                        key: "aws-cdk:subnet-name".to_string(),
                        value: PUBLIC_SUBNET_GROUP.to_string(),
                    },
                    Tag {
                        key: SUBNET_TYPE_TAG.to_string(),
                        value: format!("{:?}", SubnetKind::Public),
                    },
                    Tag::name(&scope_name),
                ],
                vpc_id: vpc.reference(),
            },
        )?;
        let route_table = stack.add(
            &scope.child("RouteTable"),
            &RouteTable {
                tags: vec![Tag::name(&scope_name)],
                vpc_id: vpc.reference(),
            },
        )?;
        stack.add(
            &scope.child("RouteTableAssociation"),
            &SubnetRouteTableAssociation {
                route_table_id: route_table.reference(),
                subnet_id: subnet.reference(),
            },
        )?;
        let default_route = stack.add(
            &scope.child("DefaultRoute"),
            &Route {
                destination_cidr_block: Expr::from(ANYWHERE),
                gateway_id: Some(gateway.reference()),
                route_table_id: route_table.reference(),
                vpc_peering_connection_id: None,
            },
        )?;
        stack.add_dependency(&default_route, &attachment);

        public_subnets.push(PublicSubnet {
            subnet,
            route_table,
            availability_zone,
            cidr: subnet_cidr,
        });
    }

    tracing::debug!(
        "consumer VPC {} with {} public subnet(s)",
        cidr,
        public_subnets.len()
    );

    Ok(ConsumerNetwork {
        vpc,
        cidr,
        public_subnets,
    })
}

/// Peering connection between the consumer VPC and the primary VPC
pub fn declare_peering(
    stack: &mut Stack,
    primary: &NetworkDescription,
    consumer: &ConsumerNetwork,
) -> Result<ResourceRef, SynthError> {
    stack.add(
        &ConstructPath::new(PEERING_ID),
        &VpcPeeringConnection {
            peer_vpc_id: Expr::from(primary.vpc_id.as_str()),
            vpc_id: consumer.vpc.reference(),
        },
    )
}

/// One route per isolated subnet of the primary VPC towards the consumer
/// VPC, and one per consumer public subnet towards the primary VPC, all
/// through `peering`
pub fn declare_peering_routes(
    stack: &mut Stack,
    primary: &NetworkDescription,
    consumer: &ConsumerNetwork,
    peering: &ResourceRef,
) -> Result<Vec<ResourceRef>, SynthError> {
    let mut routes = Vec::new();

    for (index, subnet) in primary.subnets_of(SubnetKind::Isolated).enumerate() {
        routes.push(stack.add(
            &ConstructPath::new(format!("VPC Route to {PEERING_ID}{index}")),
            &Route {
                destination_cidr_block: consumer.vpc.get_att("CidrBlock"),
                gateway_id: None,
                route_table_id: Expr::from(subnet.route_table_id.as_str()),
                vpc_peering_connection_id: Some(peering.reference()),
            },
        )?);
    }

    for (index, subnet) in consumer.public_subnets.iter().enumerate() {
        routes.push(stack.add(
            &ConstructPath::new(format!("Consumer VPC Route to {PEERING_ID}{index}")),
            &Route {
                destination_cidr_block: Expr::from(primary.vpc_cidr_block.as_str()),
                gateway_id: None,
                route_table_id: subnet.route_table.reference(),
                vpc_peering_connection_id: Some(peering.reference()),
            },
        )?);
    }

    tracing::info!("declared {} peering route(s)", routes.len());
    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumer_network_carves_two_public_subnets() {
        let mut stack = Stack::new("Test");
        let consumer = declare_consumer_network(&mut stack).unwrap();
        let cidrs: Vec<String> = consumer
            .public_subnets
            .iter()
            .map(|s| s.cidr.to_string())
            .collect();
        assert_eq!(cidrs, vec!["10.10.0.0/28", "10.10.0.16/28"]);

        let template = stack.synth().unwrap();
        assert_eq!(template.resources_of_type("AWS::EC2::Subnet").count(), 2);
        assert_eq!(template.resources_of_type("AWS::EC2::NatGateway").count(), 0);
        assert_eq!(template.resources_of_type("AWS::EC2::InternetGateway").count(), 1);
    }

    #[test]
    fn test_default_routes_wait_for_gateway_attachment() {
        let mut stack = Stack::new("Test");
        declare_consumer_network(&mut stack).unwrap();
        let template = stack.synth().unwrap();

        let (attachment_id, _) = template
            .resources_of_type("AWS::EC2::VPCGatewayAttachment")
            .next()
            .unwrap();
        let default_routes: Vec<_> = template
            .resources_of_type("AWS::EC2::Route")
            .filter(|(_, r)| r.properties["DestinationCidrBlock"] == ANYWHERE)
            .collect();
        assert_eq!(default_routes.len(), 2);
        for (_, route) in default_routes {
            assert_eq!(route.depends_on, vec![attachment_id.clone()]);
        }
    }

    #[test]
    fn test_public_subnets_are_tagged_public() {
        let mut stack = Stack::new("Test");
        declare_consumer_network(&mut stack).unwrap();
        let template = stack.synth().unwrap();
        for (_, subnet) in template.resources_of_type("AWS::EC2::Subnet") {
            let tags = subnet.properties["Tags"].as_array().unwrap();
            assert!(tags
                .iter()
                .any(|t| t["Key"] == SUBNET_TYPE_TAG && t["Value"] == "Public"));
            assert_eq!(subnet.properties["MapPublicIpOnLaunch"], true);
        }
    }
}
