//! SSM role and consumer instances

use super::consumer::ConsumerNetwork;
use crate::error::SynthError;
use crate::resource::ec2::{BlockDeviceMapping, Ebs, Instance, SecurityGroup, SecurityGroupRule};
use crate::resource::iam::{aws_managed_policy, InstanceProfile, PolicyDocument, Role};
use crate::template::{ConstructPath, Parameter, ResourceRef, Stack, Tag};

pub const SSM_ROLE_ID: &str = "SSM IAM Role";
pub const SSM_MANAGED_POLICY: &str = "AmazonSSMManagedInstanceCore";

const INSTANCE_TYPE: &str = "t3.micro";
const ROOT_DEVICE_NAME: &str = "/dev/xvda";
/// GiB
const ROOT_VOLUME_SIZE: u32 = 8;
const ROOT_VOLUME_TYPE: &str = "gp3";

/// Image family resolved through a public SSM parameter at deploy time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineImage {
    AmazonLinux2,
    WindowsServer2022JapaneseFullBase,
}

impl MachineImage {
    pub fn ssm_parameter(&self) -> &'static str {
        match self {
            Self::AmazonLinux2 => "/aws/service/ami-amazon-linux-latest/amzn2-ami-hvm-x86_64-gp2",
            Self::WindowsServer2022JapaneseFullBase => {
                "/aws/service/ami-windows-latest/Windows_Server-2022-Japanese-Full-Base"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceSpec {
    pub construct_id: &'static str,
    pub image: MachineImage,
}

pub const INSTANCES: [InstanceSpec; 2] = [
    InstanceSpec {
        construct_id: "Consumer EC2 Instance Amazon Linux 2",
        image: MachineImage::AmazonLinux2,
    },
    InstanceSpec {
        construct_id: "Consumer EC2 Instance Windows Server 2022",
        image: MachineImage::WindowsServer2022JapaneseFullBase,
    },
];

/// Role EC2 instances assume to be managed through Systems Manager
pub fn declare_ssm_role(stack: &mut Stack) -> Result<ResourceRef, SynthError> {
    stack.add(
        &ConstructPath::new(SSM_ROLE_ID).child("Resource"),
        &Role {
            assume_role_policy_document: PolicyDocument::assumed_by("ec2.amazonaws.com"),
            managed_policy_arns: vec![aws_managed_policy(SSM_MANAGED_POLICY)],
        },
    )
}

/// Instance in the first public subnet of the consumer VPC, with its own
/// security group and instance profile
pub fn declare_instance(
    stack: &mut Stack,
    spec: &InstanceSpec,
    consumer: &ConsumerNetwork,
    role: &ResourceRef,
) -> Result<ResourceRef, SynthError> {
    let root = ConstructPath::new(spec.construct_id);
    let name = format!("{}/{}", stack.name(), root);
    let placement = consumer
        .public_subnets
        .first()
        .ok_or(SynthError::MissingInput("consumer public subnet"))?;

    let security_group = stack.add(
        &root.child("InstanceSecurityGroup").child("Resource"),
        &SecurityGroup {
            group_description: format!("{name}/InstanceSecurityGroup"),
            security_group_egress: vec![SecurityGroupRule::allow_all_outbound()],
            security_group_ingress: Vec::new(),
            tags: vec![Tag::name(&name)],
            vpc_id: consumer.vpc.reference(),
        },
    )?;

    let profile = stack.add(
        &root.child("InstanceProfile"),
        &InstanceProfile {
            roles: vec![role.reference()],
        },
    )?;

    let image = stack.add_parameter(
        &ConstructPath::new("SsmParameterValue").child(spec.image.ssm_parameter()),
        Parameter::ssm_image_id(spec.image.ssm_parameter()),
    )?;

    let instance = stack.add(
        &root.child("Resource"),
        &Instance {
            availability_zone: placement.availability_zone.clone(),
            block_device_mappings: vec![BlockDeviceMapping {
                device_name: ROOT_DEVICE_NAME.to_string(),
                ebs: Ebs {
                    volume_size: ROOT_VOLUME_SIZE,
                    volume_type: ROOT_VOLUME_TYPE.to_string(),
                },
            }],
            iam_instance_profile: profile.reference(),
            image_id: image.reference(),
            instance_type: INSTANCE_TYPE.to_string(),
            propagate_tags_to_volume_on_creation: true,
            security_group_ids: vec![security_group.get_att("GroupId")],
            subnet_id: placement.subnet.reference(),
            tags: vec![Tag::name(&name)],
        },
    )?;
    stack.add_dependency(&instance, role);

    tracing::debug!("declared instance {} from {:?}", spec.construct_id, spec.image);
    Ok(instance)
}
