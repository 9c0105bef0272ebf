//! Generated credentials
//!
//! Secrets Manager generates and stores the passwords. The template only ever
//! holds dynamic references to them, and nothing here reads or logs a value.

use crate::error::SynthError;
use crate::resource::secretsmanager::{GenerateSecretString, Secret};
use crate::template::{secret_field, ConstructPath, Expr, RemovalPolicy, ResourceRef, Stack};

/// Length of every generated password
pub const PASSWORD_LENGTH: u32 = 32;

/// JSON key the generated password is stored under
pub const PASSWORD_KEY: &str = "password";

/// A credential the stack generates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential {
    pub construct_id: &'static str,
    pub secret_name: &'static str,
    pub user_name: &'static str,
}

/// `fsxadmin` of the file system
pub const FILE_SYSTEM_CREDENTIAL: Credential = Credential {
    construct_id: "Secret of FSx for ONTAP file system",
    secret_name: "/fsx-for-ontap/file-system",
    user_name: "fsxadmin",
};

/// `vsadmin` of the storage virtual machine
pub const SVM_CREDENTIAL: Credential = Credential {
    construct_id: "Secret of FSx for ONTAP SVM",
    secret_name: "/fsx-for-ontap/svm",
    user_name: "vsadmin",
};

impl Credential {
    fn properties(&self) -> Secret {
        Secret {
            generate_secret_string: GenerateSecretString {
                generate_string_key: PASSWORD_KEY.to_string(),
                password_length: PASSWORD_LENGTH,
                require_each_included_type: true,
                secret_string_template: format!(r#"{{"userName": "{}"}}"#, self.user_name),
            },
            name: self.secret_name.to_string(),
        }
    }
}

pub fn declare_generated_secret(
    stack: &mut Stack,
    credential: &Credential,
) -> Result<ResourceRef, SynthError> {
    let secret = stack.add(
        &ConstructPath::new(credential.construct_id).child("Resource"),
        &credential.properties(),
    )?;
    stack.set_removal_policy(&secret, RemovalPolicy::Delete);

    tracing::info!(
        "declared generated secret {} for user {}",
        credential.secret_name,
        credential.user_name
    );
    Ok(secret)
}

/// Deploy-time reference to the generated password
pub fn password_of(secret: &ResourceRef) -> Expr {
    secret_field(secret.reference(), PASSWORD_KEY)
}
