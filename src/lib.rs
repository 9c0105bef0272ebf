//! Synthesize the deployment template of a Multi-AZ FSx for NetApp ONTAP file
//! system, its AD-joined storage virtual machine and volumes, and a peered
//! consumer VPC with two client instances.
//!
//! - [`topology`] - The declarations themselves
//! - [`template`] - Stack, logical ids and template serialization
//! - [`resource`] - Typed resource properties and the ingress rule table
//! - [`cloud`] - Primary VPC lookup and CIDR arithmetic
//! - [`config`] - Persistent configuration

pub mod cloud;
pub mod config;
pub mod error;
pub mod resource;
pub mod template;
pub mod topology;

pub use error::{LookupError, SynthError};
pub use topology::{synthesize, SynthOptions, TopologyInputs};
