//! Topology definition
//!
//! Declares the whole FSx for ONTAP deployment into a [`Stack`]:
//!
//! - [`security`] - Security group with the published ingress table
//! - [`secrets`] - Generated `fsxadmin` and `vsadmin` credentials
//! - [`filesystem`] - Multi-AZ file system and the AD-joined SVM
//! - [`volumes`] - NFS and SMB volumes
//! - [`consumer`] - Consumer VPC, peering connection and routes
//! - [`compute`] - SSM role and the two consumer instances
//!
//! # Example
//!
//! ```ignore
//! use crate::topology::{synthesize, SynthOptions, TopologyInputs};
//!
//! let template = synthesize(&inputs, &network, &SynthOptions::default())?;
//! println!("{}", template.to_json()?);
//! ```

pub mod compute;
pub mod consumer;
pub mod filesystem;
pub mod secrets;
pub mod security;
pub mod volumes;

use crate::cloud::NetworkDescription;
use crate::error::SynthError;
use crate::template::{Stack, Template};

pub const DEFAULT_STACK_NAME: &str = "FsxForOntapStack";

const DESCRIPTION: &str =
    "Multi-AZ FSx for NetApp ONTAP file system with an AD-joined SVM and a peered consumer VPC";

/// A Multi-AZ file system spans two subnets
pub const MIN_ISOLATED_SUBNETS: usize = 2;

/// External parameters of the topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyInputs {
    /// Existing VPC hosting the file system
    pub vpc_id: String,
    /// DNS servers of the self-managed Active Directory
    pub dns_ips: Vec<String>,
    /// Secrets Manager secret holding the AD service account bundle
    pub service_account_secret_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthOptions {
    pub stack_name: String,
    /// Report too few isolated subnets as an error instead of emitting an
    /// empty template
    pub strict: bool,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            stack_name: DEFAULT_STACK_NAME.to_string(),
            strict: false,
        }
    }
}

/// Build the declaration graph for `network` and synthesize it.
///
/// The isolated subnet count is the only input checked here. With fewer than
/// [`MIN_ISOLATED_SUBNETS`] nothing is declared: the template is empty, or in
/// strict mode an error is returned. Bad DNS addresses or secret names only
/// fail at deploy time.
pub fn synthesize(
    inputs: &TopologyInputs,
    network: &NetworkDescription,
    options: &SynthOptions,
) -> Result<Template, SynthError> {
    let isolated = network.isolated_subnet_ids().len();
    if isolated < MIN_ISOLATED_SUBNETS {
        if options.strict {
            return Err(SynthError::InsufficientIsolatedSubnets {
                vpc_id: network.vpc_id.clone(),
                found: isolated,
            });
        }
        tracing::warn!(
            "VPC {} has {} isolated subnet(s), need {}; nothing declared",
            network.vpc_id,
            isolated,
            MIN_ISOLATED_SUBNETS
        );
        return Stack::new(&options.stack_name).synth();
    }

    let mut stack = Stack::new(&options.stack_name).with_description(DESCRIPTION);

    let security_group = security::declare_file_system_security_group(&mut stack, &network.vpc_id)?;

    let file_system_secret =
        secrets::declare_generated_secret(&mut stack, &secrets::FILE_SYSTEM_CREDENTIAL)?;
    let svm_secret = secrets::declare_generated_secret(&mut stack, &secrets::SVM_CREDENTIAL)?;

    let file_system =
        filesystem::declare_file_system(&mut stack, network, &security_group, &file_system_secret)?;
    let svm = filesystem::declare_storage_virtual_machine(
        &mut stack,
        &file_system,
        &inputs.dns_ips,
        &inputs.service_account_secret_name,
        &svm_secret,
    )?;

    for spec in &volumes::VOLUMES {
        volumes::declare_volume(&mut stack, &svm, spec)?;
    }

    let role = compute::declare_ssm_role(&mut stack)?;

    let consumer_network = consumer::declare_consumer_network(&mut stack)?;
    let peering = consumer::declare_peering(&mut stack, network, &consumer_network)?;
    consumer::declare_peering_routes(&mut stack, network, &consumer_network, &peering)?;

    for spec in &compute::INSTANCES {
        compute::declare_instance(&mut stack, spec, &consumer_network, &role)?;
    }

    stack.synth()
}
