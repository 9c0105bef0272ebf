//! Error types
//!
//! Synthesis and lookup failures. Everything else (missing credential bundle
//! fields, quotas, bad references inside the bundle) only surfaces when the
//! template is deployed.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or validating the declaration graph
#[derive(Debug, Error)]
pub enum SynthError {
    #[error("construct id '{id}' is already used under '{scope}'")]
    DuplicateId { scope: String, id: String },

    #[error("'{source_id}' references '{target}', which is not declared in the template")]
    DanglingReference { source_id: String, target: String },

    #[error(
        "VPC {vpc_id} has {found} isolated subnet(s); a Multi-AZ file system needs at least 2"
    )]
    InsufficientIsolatedSubnets { vpc_id: String, found: usize },

    #[error("failed to serialize properties of '{path}'")]
    Properties {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid CIDR block '{0}'")]
    InvalidCidr(String),

    #[error("cannot carve {count} /{prefix} subnet(s) out of {cidr}")]
    CidrExhausted { cidr: String, prefix: u8, count: usize },

    #[error("missing required input: {0}")]
    MissingInput(&'static str),
}

/// Errors raised while resolving the primary network
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("failed to read context file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse context file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("VPC {0} is not in the context cache; run with --lookup to resolve it")]
    NotInContext(String),

    #[error("VPC {0} was not found")]
    VpcNotFound(String),

    #[error("EC2 API call failed: {0}")]
    Api(String),
}
