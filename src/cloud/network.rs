//! Primary network lookup
//!
//! The existing VPC is described by a [`NetworkDescription`], read from a
//! context cache file so that synthesis is reproducible offline. With the
//! `aws` feature the cache entry can be refreshed from the EC2 API.

use crate::error::LookupError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default context cache file, relative to the working directory
pub const DEFAULT_CONTEXT_FILE: &str = "topology.context.json";

/// Tag that pins a subnet's kind regardless of its routes
pub const SUBNET_TYPE_TAG: &str = "aws-cdk:subnet-type";

/// Routing class of a subnet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubnetKind {
    /// Default route to an internet gateway
    Public,
    /// Default route through NAT
    Private,
    /// No route to the internet
    Isolated,
}

impl SubnetKind {
    /// Parse the value of the subnet-type tag
    pub fn from_tag(value: &str) -> Option<Self> {
        match value {
            "Public" => Some(Self::Public),
            "Private" => Some(Self::Private),
            "Isolated" => Some(Self::Isolated),
            _ => None,
        }
    }
}

/// One subnet of the primary VPC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetDescription {
    pub subnet_id: String,
    pub availability_zone: String,
    pub cidr: String,
    pub route_table_id: String,
    #[serde(rename = "type")]
    pub kind: SubnetKind,
}

/// The primary VPC as seen at synthesis time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescription {
    pub vpc_id: String,
    pub vpc_cidr_block: String,
    #[serde(default)]
    pub subnets: Vec<SubnetDescription>,
}

impl NetworkDescription {
    pub fn subnets_of(&self, kind: SubnetKind) -> impl Iterator<Item = &SubnetDescription> {
        self.subnets.iter().filter(move |s| s.kind == kind)
    }

    pub fn isolated_subnet_ids(&self) -> Vec<String> {
        self.subnets_of(SubnetKind::Isolated)
            .map(|s| s.subnet_id.clone())
            .collect()
    }

    /// Route tables of public, private and isolated subnets, first seen first
    pub fn route_table_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        [SubnetKind::Public, SubnetKind::Private, SubnetKind::Isolated]
            .into_iter()
            .flat_map(|kind| self.subnets_of(kind))
            .filter(|s| seen.insert(s.route_table_id.clone()))
            .map(|s| s.route_table_id.clone())
            .collect()
    }
}

/// Resolves a VPC id into its description
pub trait NetworkLookup {
    fn lookup(&self, vpc_id: &str) -> Result<NetworkDescription, LookupError>;
}

/// On-disk context cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextCache {
    #[serde(default)]
    pub vpcs: IndexMap<String, NetworkDescription>,
}

/// Lookup backed by the context cache file
#[derive(Debug, Clone)]
pub struct ContextFileLookup {
    path: PathBuf,
}

impl ContextFileLookup {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cache; a missing file is an empty cache
    pub fn load(&self) -> Result<ContextCache, LookupError> {
        if !self.path.exists() {
            tracing::debug!("context file {:?} does not exist", self.path);
            return Ok(ContextCache::default());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| LookupError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| LookupError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Insert or replace one VPC and write the cache back
    pub fn store(&self, network: &NetworkDescription) -> Result<(), LookupError> {
        let mut cache = self.load()?;
        cache.vpcs.insert(network.vpc_id.clone(), network.clone());

        let io_err = |source: std::io::Error| LookupError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(&cache).map_err(|source| LookupError::Parse {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, content).map_err(io_err)?;

        tracing::info!("cached VPC {} in {:?}", network.vpc_id, self.path);
        Ok(())
    }
}

impl NetworkLookup for ContextFileLookup {
    fn lookup(&self, vpc_id: &str) -> Result<NetworkDescription, LookupError> {
        let mut cache = self.load()?;
        cache
            .vpcs
            .shift_remove(vpc_id)
            .ok_or_else(|| LookupError::NotInContext(vpc_id.to_string()))
    }
}

/// Route of a route table, as far as classification cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSummary {
    pub destination: Option<String>,
    pub gateway_id: Option<String>,
}

/// Classify a subnet from its tag, or else from its route table.
///
/// A default route to an internet gateway makes it public, any other
/// default route (NAT gateway or instance) private, no default route isolated.
pub fn classify_subnet(type_tag: Option<&str>, routes: &[RouteSummary]) -> SubnetKind {
    if let Some(kind) = type_tag.and_then(SubnetKind::from_tag) {
        return kind;
    }

    let default_route = routes
        .iter()
        .find(|r| r.destination.as_deref() == Some("0.0.0.0/0"));

    match default_route {
        Some(r) if r.gateway_id.as_deref().is_some_and(|g| g.starts_with("igw-")) => {
            SubnetKind::Public
        }
        Some(_) => SubnetKind::Private,
        None => SubnetKind::Isolated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subnet(id: &str, rtb: &str, kind: SubnetKind) -> SubnetDescription {
        SubnetDescription {
            subnet_id: id.to_string(),
            availability_zone: "us-east-1a".to_string(),
            cidr: "172.31.0.0/20".to_string(),
            route_table_id: rtb.to_string(),
            kind,
        }
    }

    fn network() -> NetworkDescription {
        NetworkDescription {
            vpc_id: "vpc-1".to_string(),
            vpc_cidr_block: "172.31.0.0/16".to_string(),
            subnets: vec![
                subnet("subnet-i1", "rtb-i", SubnetKind::Isolated),
                subnet("subnet-p1", "rtb-p", SubnetKind::Public),
                subnet("subnet-i2", "rtb-i", SubnetKind::Isolated),
                subnet("subnet-n1", "rtb-n", SubnetKind::Private),
            ],
        }
    }

    #[test]
    fn test_isolated_subnet_ids_keep_order() {
        assert_eq!(network().isolated_subnet_ids(), vec!["subnet-i1", "subnet-i2"]);
    }

    #[test]
    fn test_route_table_ids_are_unique_public_first() {
        assert_eq!(network().route_table_ids(), vec!["rtb-p", "rtb-n", "rtb-i"]);
    }

    #[test]
    fn test_context_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = ContextFileLookup::new(dir.path().join("ctx").join("topology.context.json"));

        assert!(matches!(
            lookup.lookup("vpc-1"),
            Err(LookupError::NotInContext(_))
        ));

        lookup.store(&network()).unwrap();
        assert_eq!(lookup.lookup("vpc-1").unwrap(), network());
    }

    #[test]
    fn test_context_file_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topology.context.json");
        std::fs::write(&path, "{ not json").unwrap();
        let lookup = ContextFileLookup::new(&path);
        assert!(matches!(lookup.lookup("vpc-1"), Err(LookupError::Parse { .. })));
    }

    #[test]
    fn test_context_file_uses_camel_case_keys() {
        let json = r#"{"vpcs": {"vpc-9": {
            "vpcId": "vpc-9",
            "vpcCidrBlock": "172.31.0.0/16",
            "subnets": [{"subnetId": "subnet-a", "availabilityZone": "ap-northeast-1a",
                         "cidr": "172.31.0.0/20", "routeTableId": "rtb-a", "type": "Isolated"}]
        }}}"#;
        let cache: ContextCache = serde_json::from_str(json).unwrap();
        assert_eq!(cache.vpcs["vpc-9"].subnets[0].kind, SubnetKind::Isolated);
    }

    #[test]
    fn test_classify_subnet() {
        let igw = RouteSummary {
            destination: Some("0.0.0.0/0".to_string()),
            gateway_id: Some("igw-1".to_string()),
        };
        let nat = RouteSummary {
            destination: Some("0.0.0.0/0".to_string()),
            gateway_id: None,
        };
        let local = RouteSummary {
            destination: Some("172.31.0.0/16".to_string()),
            gateway_id: Some("local".to_string()),
        };

        assert_eq!(classify_subnet(None, &[local.clone(), igw]), SubnetKind::Public);
        assert_eq!(classify_subnet(None, &[local.clone(), nat]), SubnetKind::Private);
        assert_eq!(classify_subnet(None, &[local.clone()]), SubnetKind::Isolated);
        assert_eq!(
            classify_subnet(Some("Isolated"), &[]),
            SubnetKind::Isolated
        );
        assert_eq!(classify_subnet(Some("bogus"), &[local]), SubnetKind::Isolated);
    }
}
