//! Network collaborators
//!
//! - [`network`] - Description of the primary VPC and its context cache
//! - [`cidr`] - IPv4 CIDR parsing and carving
//! - `ec2` - Live lookup through the EC2 API (feature `aws`)

pub mod cidr;
#[cfg(feature = "aws")]
pub mod ec2;
pub mod network;

pub use cidr::Ipv4Cidr;
#[cfg(feature = "aws")]
pub use ec2::Ec2Lookup;
pub use network::{
    ContextFileLookup, NetworkDescription, NetworkLookup, SubnetDescription, SubnetKind,
    DEFAULT_CONTEXT_FILE,
};
