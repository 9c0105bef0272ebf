//! Deployment template model
//!
//! A [`Stack`] collects resource declarations under construct paths and
//! synthesizes them into a CloudFormation [`Template`].
//!
//! # Architecture
//!
//! - [`intrinsic`] - Literal and intrinsic-function property values
//! - [`stack`] - Construct paths, logical ids, reference validation
//!
//! # Example
//!
//! ```ignore
//! use crate::template::{ConstructPath, Stack};
//!
//! let mut stack = Stack::new("Demo");
//! let role = stack.add(&ConstructPath::new("Role"), role_properties)?;
//! let template = stack.synth()?;
//! ```

pub mod intrinsic;
mod stack;

pub use intrinsic::{secret_field, Expr};
pub use stack::{logical_id, ConstructPath, ResourceRef, Stack};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Properties of one resource type
pub trait ResourceProperties: Serialize {
    /// CloudFormation resource type, e.g. `AWS::EC2::VPC`
    const TYPE: &'static str;
}

/// What the provisioning engine does with a resource removed from the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalPolicy {
    Delete,
}

/// `{Key, Value}` resource tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn name(value: impl Into<String>) -> Self {
        Self {
            key: "Name".to_string(),
            value: value.into(),
        }
    }
}

/// Template input parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub parameter_type: String,
    pub default: String,
}

impl Parameter {
    /// Public SSM parameter holding an AMI id, resolved at deploy time
    pub fn ssm_image_id(path: &str) -> Self {
        Self {
            parameter_type: "AWS::SSM::Parameter::Value<AWS::EC2::Image::Id>".to_string(),
            default: path.to_string(),
        }
    }
}

/// One declared resource
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    pub properties: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<RemovalPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<RemovalPolicy>,
    pub metadata: Value,
}

/// Synthesized template
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Parameter>,
    pub resources: IndexMap<String, Resource>,
}

impl Template {
    /// Resources of one type, in declaration order
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Resource)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, r)| r.resource_type == resource_type)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
