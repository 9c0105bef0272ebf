//! Resource property types
//!
//! Typed properties for every CloudFormation resource the topology declares,
//! plus the data-driven ingress rule table.
//!
//! # Architecture
//!
//! - [`registry`] - Loads the ingress rule table from embedded JSON
//! - [`ec2`] - VPC, subnet, routing, security group and instance properties
//! - [`fsx`] - ONTAP file system, storage virtual machine and volume properties
//! - [`iam`] - Roles, instance profiles and trust policies
//! - [`secretsmanager`] - Generated secrets
//!
//! # Rule Table
//!
//! The FSx for ONTAP ingress rules are defined in `src/resources/ingress_rules.json`,
//! so that the published port list can be updated without code changes.

pub mod ec2;
pub mod fsx;
pub mod iam;
mod registry;
pub mod secretsmanager;

pub use registry::*;
