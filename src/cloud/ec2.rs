//! EC2-backed network lookup
//!
//! Credentials and region come from the standard AWS chain (environment,
//! `~/.aws/config`, instance profile) unless a region is given explicitly.

use super::network::{
    classify_subnet, NetworkDescription, NetworkLookup, RouteSummary, SubnetDescription,
    SUBNET_TYPE_TAG,
};
use crate::error::LookupError;
use aws_config::BehaviorVersion;
use aws_sdk_ec2::types::{Filter, RouteTable};
use aws_sdk_ec2::Client;

/// Resolves a VPC through DescribeVpcs, DescribeSubnets and DescribeRouteTables
#[derive(Debug, Clone, Default)]
pub struct Ec2Lookup {
    region: Option<String>,
}

impl Ec2Lookup {
    pub fn new(region: Option<String>) -> Self {
        Self { region }
    }

    async fn create_client(&self) -> Client {
        let config = if let Some(region_str) = &self.region {
            aws_config::defaults(BehaviorVersion::latest())
                .region(aws_sdk_ec2::config::Region::new(region_str.clone()))
                .load()
                .await
        } else {
            aws_config::defaults(BehaviorVersion::latest())
                .load()
                .await
        };

        Client::new(&config)
    }

    async fn describe(&self, vpc_id: &str) -> Result<NetworkDescription, LookupError> {
        let client = self.create_client().await;
        let vpc_filter = || Filter::builder().name("vpc-id").values(vpc_id).build();

        let vpcs = client
            .describe_vpcs()
            .vpc_ids(vpc_id)
            .send()
            .await
            .map_err(|e| LookupError::Api(format!("Failed to describe VPCs: {}", e)))?;
        let vpc = vpcs
            .vpcs()
            .first()
            .ok_or_else(|| LookupError::VpcNotFound(vpc_id.to_string()))?;

        let subnets = client
            .describe_subnets()
            .filters(vpc_filter())
            .send()
            .await
            .map_err(|e| LookupError::Api(format!("Failed to describe subnets: {}", e)))?;

        let tables = client
            .describe_route_tables()
            .filters(vpc_filter())
            .send()
            .await
            .map_err(|e| LookupError::Api(format!("Failed to describe route tables: {}", e)))?;

        let main_table = tables
            .route_tables()
            .iter()
            .find(|t| t.associations().iter().any(|a| a.main().unwrap_or(false)));

        let mut described = Vec::new();
        for subnet in subnets.subnets() {
            let subnet_id = subnet.subnet_id().unwrap_or_default();
            let table = tables
                .route_tables()
                .iter()
                .find(|t| {
                    t.associations()
                        .iter()
                        .any(|a| a.subnet_id() == Some(subnet_id))
                })
                .or(main_table);

            let type_tag = subnet
                .tags()
                .iter()
                .find(|t| t.key() == Some(SUBNET_TYPE_TAG))
                .and_then(|t| t.value());

            described.push(SubnetDescription {
                subnet_id: subnet_id.to_string(),
                availability_zone: subnet.availability_zone().unwrap_or_default().to_string(),
                cidr: subnet.cidr_block().unwrap_or_default().to_string(),
                route_table_id: table
                    .and_then(|t| t.route_table_id())
                    .unwrap_or_default()
                    .to_string(),
                kind: classify_subnet(type_tag, &table.map(route_summaries).unwrap_or_default()),
            });
        }

        // API order is unspecified
        described.sort_by(|a, b| {
            (&a.availability_zone, &a.subnet_id).cmp(&(&b.availability_zone, &b.subnet_id))
        });

        tracing::info!(
            "resolved VPC {} with {} subnet(s)",
            vpc_id,
            described.len()
        );

        Ok(NetworkDescription {
            vpc_id: vpc_id.to_string(),
            vpc_cidr_block: vpc.cidr_block().unwrap_or_default().to_string(),
            subnets: described,
        })
    }
}

fn route_summaries(table: &RouteTable) -> Vec<RouteSummary> {
    table
        .routes()
        .iter()
        .map(|r| RouteSummary {
            destination: r.destination_cidr_block().map(str::to_string),
            gateway_id: r.gateway_id().map(str::to_string),
        })
        .collect()
}

impl NetworkLookup for Ec2Lookup {
    fn lookup(&self, vpc_id: &str) -> Result<NetworkDescription, LookupError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LookupError::Api(format!("Failed to start runtime: {}", e)))?;
        runtime.block_on(self.describe(vpc_id))
    }
}
