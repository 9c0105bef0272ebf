//! ONTAP file system and storage virtual machine

use super::secrets::password_of;
use super::volumes::SecurityStyle;
use crate::cloud::NetworkDescription;
use crate::error::SynthError;
use crate::resource::fsx::{
    ActiveDirectoryConfiguration, DiskIopsConfiguration, FileSystem, OntapConfiguration,
    SelfManagedActiveDirectoryConfiguration, StorageVirtualMachine,
};
use crate::template::{secret_field, ConstructPath, Expr, ResourceRef, Stack, Tag};

pub const FILE_SYSTEM_ID: &str = "FSx for ONTAP file system";
pub const SVM_ID: &str = "SVM";

pub const FILE_SYSTEM_NAME: &str = "fsx-for-ontap-file-system-multi-az";
pub const DEPLOYMENT_TYPE: &str = "MULTI_AZ_1";
/// GiB
pub const STORAGE_CAPACITY: u32 = 1024;
/// MB/s
pub const THROUGHPUT_CAPACITY: u32 = 128;
pub const BACKUP_RETENTION_DAYS: u32 = 7;
/// UTC, HH:MM
pub const DAILY_BACKUP_START: &str = "16:00";
/// UTC, d:HH:MM with 1 = Monday
pub const WEEKLY_MAINTENANCE_START: &str = "6:17:00";
pub const ENDPOINT_IP_ADDRESS_RANGE: &str = "172.31.255.0/24";

pub const SVM_NAME: &str = "fsx-for-ontap-svm-001";
pub const SVM_NETBIOS_NAME: &str = "SVM-001";

/// Fields read from the externally managed service account secret
pub const DIRECTORY_FIELDS: [&str; 5] = [
    "domainName",
    "fileSystemAdministratorsGroup",
    "organizationalUnitDistinguishedName",
    "userName",
    "password",
];

/// Multi-AZ file system spanning the isolated subnets of the primary VPC.
///
/// The caller guarantees at least two isolated subnets.
pub fn declare_file_system(
    stack: &mut Stack,
    network: &NetworkDescription,
    security_group: &ResourceRef,
    admin_secret: &ResourceRef,
) -> Result<ResourceRef, SynthError> {
    let subnet_ids = network.isolated_subnet_ids();
    let preferred_subnet_id = subnet_ids
        .first()
        .cloned()
        .ok_or(SynthError::InsufficientIsolatedSubnets {
            vpc_id: network.vpc_id.clone(),
            found: 0,
        })?;

    let properties = FileSystem {
        file_system_type: "ONTAP".to_string(),
        ontap_configuration: OntapConfiguration {
            automatic_backup_retention_days: BACKUP_RETENTION_DAYS,
            daily_automatic_backup_start_time: DAILY_BACKUP_START.to_string(),
            deployment_type: DEPLOYMENT_TYPE.to_string(),
            disk_iops_configuration: DiskIopsConfiguration {
                mode: "AUTOMATIC".to_string(),
            },
            endpoint_ip_address_range: ENDPOINT_IP_ADDRESS_RANGE.to_string(),
            fsx_admin_password: password_of(admin_secret),
            preferred_subnet_id,
            route_table_ids: network.route_table_ids(),
            throughput_capacity: THROUGHPUT_CAPACITY,
            weekly_maintenance_start_time: WEEKLY_MAINTENANCE_START.to_string(),
        },
        security_group_ids: vec![security_group.get_att("GroupId")],
        storage_capacity: STORAGE_CAPACITY,
        storage_type: "SSD".to_string(),
        subnet_ids,
        tags: vec![Tag::name(FILE_SYSTEM_NAME)],
    };

    stack.add(&ConstructPath::new(FILE_SYSTEM_ID), &properties)
}

/// SVM joined to the self-managed Active Directory described by the
/// `service_account_secret` bundle
pub fn declare_storage_virtual_machine(
    stack: &mut Stack,
    file_system: &ResourceRef,
    dns_ips: &[String],
    service_account_secret: &str,
    admin_secret: &ResourceRef,
) -> Result<ResourceRef, SynthError> {
    let [domain_name, administrators_group, organizational_unit, user_name, password] =
        DIRECTORY_FIELDS.map(|field| secret_field(Expr::from(service_account_secret), field));

    let properties = StorageVirtualMachine {
        active_directory_configuration: ActiveDirectoryConfiguration {
            net_bios_name: SVM_NETBIOS_NAME.to_string(),
            self_managed_active_directory_configuration: SelfManagedActiveDirectoryConfiguration {
                dns_ips: dns_ips.to_vec(),
                domain_name,
                file_system_administrators_group: administrators_group,
                organizational_unit_distinguished_name: organizational_unit,
                password,
                user_name,
            },
        },
        file_system_id: file_system.reference(),
        name: SVM_NAME.to_string(),
        root_volume_security_style: SecurityStyle::Mixed.as_str().to_string(),
        svm_admin_password: password_of(admin_secret),
        tags: vec![Tag::name(SVM_NAME)],
    };

    tracing::info!(
        "SVM {} joins the directory through secret {}",
        SVM_NAME,
        service_account_secret
    );
    stack.add(&ConstructPath::new(SVM_ID), &properties)
}
