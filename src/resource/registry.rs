//! Ingress Rule Registry - Load the file system's ingress table from JSON
//!
//! The ports FSx for ONTAP needs open are published by AWS as a fixed list.
//! The list is kept as data in `src/resources/ingress_rules.json` and embedded
//! in the binary.

use crate::resource::ec2::SecurityGroupRule;
use serde::Deserialize;
use std::fmt;
use std::sync::OnceLock;

/// Embedded rule table (compiled into the binary)
const RULE_TABLE: &str = include_str!("../resources/ingress_rules.json");

/// ICMP message type of an echo request
const ICMP_ECHO_REQUEST: i32 = 8;

/// IP protocol of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Icmp => "icmp",
        }
    }
}

/// Port, port range, or for ICMP the (type, code) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRange {
    pub from: i32,
    pub to: i32,
}

/// Rule entry as stored in JSON
#[derive(Debug, Clone, Deserialize)]
struct RuleDef {
    protocol: Protocol,
    from_port: i32,
    to_port: i32,
    description: String,
}

/// Root structure of ingress_rules.json
#[derive(Debug, Clone, Deserialize)]
struct RuleTable {
    source_cidr: String,
    rules: Vec<RuleDef>,
}

/// One ingress rule of the file system security group
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IngressRule {
    pub protocol: Protocol,
    pub ports: PortRange,
    pub source_cidr: String,
    pub description: String,
}

impl IngressRule {
    pub fn is_icmp_ping(&self) -> bool {
        self.protocol == Protocol::Icmp && self.ports.from == ICMP_ECHO_REQUEST
    }

    /// Security group entry for the template
    pub fn to_property(&self) -> SecurityGroupRule {
        SecurityGroupRule {
            cidr_ip: self.source_cidr.clone(),
            description: Some(self.description.clone()),
            from_port: Some(self.ports.from),
            ip_protocol: self.protocol.as_str().to_string(),
            to_port: Some(self.ports.to),
        }
    }
}

impl fmt::Display for IngressRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ports = match (self.protocol, self.ports) {
            (Protocol::Icmp, _) if self.is_icmp_ping() => "ping".to_string(),
            (Protocol::Icmp, p) => format!("type {} code {}", p.from, p.to),
            (_, p) if p.from == p.to => p.from.to_string(),
            (_, p) => format!("{}-{}", p.from, p.to),
        };
        write!(
            f,
            "{} {} from {}",
            self.protocol.as_str().to_uppercase(),
            ports,
            self.source_cidr
        )
    }
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<Vec<IngressRule>> = OnceLock::new();

/// Get the ingress rules (loads from embedded JSON on first access)
pub fn ingress_rules() -> &'static [IngressRule] {
    REGISTRY.get_or_init(|| {
        let table: RuleTable = serde_json::from_str(RULE_TABLE)
            .unwrap_or_else(|e| panic!("Failed to parse embedded ingress rule JSON: {}", e));

        table
            .rules
            .into_iter()
            .map(|def| IngressRule {
                protocol: def.protocol,
                ports: PortRange {
                    from: def.from_port,
                    to: def.to_port,
                },
                source_cidr: table.source_cidr.clone(),
                description: def.description,
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_loads_successfully() {
        assert_eq!(ingress_rules().len(), 27);
    }

    #[test]
    fn test_first_rule_is_ping() {
        let ping = &ingress_rules()[0];
        assert!(ping.is_icmp_ping());
        assert_eq!(ping.ports, PortRange { from: 8, to: -1 });
        assert_eq!(ping.to_string(), "ICMP ping from 10.0.0.0/8");
    }

    #[test]
    fn test_range_display() {
        let snmp = ingress_rules()
            .iter()
            .find(|r| r.protocol == Protocol::Udp && r.ports.from == 161)
            .unwrap();
        assert_eq!(snmp.to_string(), "UDP 161-162 from 10.0.0.0/8");
    }

    #[test]
    fn test_to_property_uses_cloudformation_names() {
        let value = serde_json::to_value(ingress_rules()[1].to_property()).unwrap();
        assert_eq!(value["IpProtocol"], "tcp");
        assert_eq!(value["FromPort"], 22);
        assert_eq!(value["ToPort"], 22);
        assert_eq!(value["CidrIp"], "10.0.0.0/8");
    }
}
