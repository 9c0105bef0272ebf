//! FSx for NetApp ONTAP resource properties

use crate::template::{Expr, ResourceProperties, Tag};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiskIopsConfiguration {
    pub mode: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OntapConfiguration {
    pub automatic_backup_retention_days: u32,
    pub daily_automatic_backup_start_time: String,
    pub deployment_type: String,
    pub disk_iops_configuration: DiskIopsConfiguration,
    pub endpoint_ip_address_range: String,
    pub fsx_admin_password: Expr,
    pub preferred_subnet_id: String,
    pub route_table_ids: Vec<String>,
    pub throughput_capacity: u32,
    pub weekly_maintenance_start_time: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileSystem {
    pub file_system_type: String,
    pub ontap_configuration: OntapConfiguration,
    pub security_group_ids: Vec<Expr>,
    pub storage_capacity: u32,
    pub storage_type: String,
    pub subnet_ids: Vec<String>,
    pub tags: Vec<Tag>,
}

impl ResourceProperties for FileSystem {
    const TYPE: &'static str = "AWS::FSx::FileSystem";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SelfManagedActiveDirectoryConfiguration {
    pub dns_ips: Vec<String>,
    pub domain_name: Expr,
    pub file_system_administrators_group: Expr,
    pub organizational_unit_distinguished_name: Expr,
    pub password: Expr,
    pub user_name: Expr,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActiveDirectoryConfiguration {
    pub net_bios_name: String,
    pub self_managed_active_directory_configuration: SelfManagedActiveDirectoryConfiguration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageVirtualMachine {
    pub active_directory_configuration: ActiveDirectoryConfiguration,
    pub file_system_id: Expr,
    pub name: String,
    pub root_volume_security_style: String,
    pub svm_admin_password: Expr,
    pub tags: Vec<Tag>,
}

impl ResourceProperties for StorageVirtualMachine {
    const TYPE: &'static str = "AWS::FSx::StorageVirtualMachine";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TieringPolicy {
    pub cooling_period: u32,
    pub name: String,
}

/// ONTAP volume settings; sizes and flags are strings in the resource schema
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeOntapConfiguration {
    pub junction_path: String,
    pub security_style: String,
    pub size_in_megabytes: String,
    pub storage_efficiency_enabled: String,
    pub storage_virtual_machine_id: Expr,
    pub tiering_policy: TieringPolicy,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Volume {
    pub name: String,
    pub ontap_configuration: VolumeOntapConfiguration,
    pub tags: Vec<Tag>,
    pub volume_type: String,
}

impl ResourceProperties for Volume {
    const TYPE: &'static str = "AWS::FSx::Volume";
}
