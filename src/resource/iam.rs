//! IAM resource properties

use crate::template::intrinsic::AWS_PARTITION;
use crate::template::{Expr, ResourceProperties};
use serde::Serialize;

const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, Serialize)]
pub struct ServicePrincipal {
    #[serde(rename = "Service")]
    pub service: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub action: String,
    pub effect: String,
    pub principal: ServicePrincipal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub statement: Vec<PolicyStatement>,
    pub version: String,
}

impl PolicyDocument {
    /// Trust policy letting `service` assume the role
    pub fn assumed_by(service: &str) -> Self {
        Self {
            statement: vec![PolicyStatement {
                action: "sts:AssumeRole".to_string(),
                effect: "Allow".to_string(),
                principal: ServicePrincipal {
                    service: service.to_string(),
                },
            }],
            version: POLICY_VERSION.to_string(),
        }
    }
}

/// ARN of an AWS managed policy in the deployment partition
pub fn aws_managed_policy(name: &str) -> Expr {
    Expr::concat(vec![
        Expr::from("arn:"),
        Expr::reference(AWS_PARTITION),
        Expr::Str(format!(":iam::aws:policy/{name}")),
    ])
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Role {
    pub assume_role_policy_document: PolicyDocument,
    pub managed_policy_arns: Vec<Expr>,
}

impl ResourceProperties for Role {
    const TYPE: &'static str = "AWS::IAM::Role";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceProfile {
    pub roles: Vec<Expr>,
}

impl ResourceProperties for InstanceProfile {
    const TYPE: &'static str = "AWS::IAM::InstanceProfile";
}
