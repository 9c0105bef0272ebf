//! File system security group

use crate::error::SynthError;
use crate::resource::ec2::{SecurityGroup, SecurityGroupRule};
use crate::resource::{ingress_rules, IngressRule};
use crate::template::{ConstructPath, Expr, ResourceRef, Stack};

pub const SECURITY_GROUP_ID: &str = "Security Group of FSx for ONTAP file system";

/// Security group admitting the published FSx for ONTAP ports from the
/// private address space. Egress is left at the allow-all default.
pub fn declare_file_system_security_group(
    stack: &mut Stack,
    vpc_id: &str,
) -> Result<ResourceRef, SynthError> {
    let rules = ingress_rules();
    tracing::debug!("{} ingress rule(s) for {}", rules.len(), SECURITY_GROUP_ID);

    let properties = SecurityGroup {
        group_description: format!("{}/{}", stack.name(), SECURITY_GROUP_ID),
        security_group_egress: vec![SecurityGroupRule::allow_all_outbound()],
        security_group_ingress: rules.iter().map(IngressRule::to_property).collect(),
        tags: Vec::new(),
        vpc_id: Expr::from(vpc_id),
    };

    stack.add(
        &ConstructPath::new(SECURITY_GROUP_ID).child("Resource"),
        &properties,
    )
}
