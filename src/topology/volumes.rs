//! ONTAP volumes

use crate::error::SynthError;
use crate::resource::fsx::{TieringPolicy, Volume, VolumeOntapConfiguration};
use crate::template::{ConstructPath, ResourceRef, Stack, Tag};

pub const VOLUME_NAME_PREFIX: &str = "fsx_for_ontap_volume_";
pub const VOLUME_SIZE_MEGABYTES: u32 = 1024;
/// Days before unread blocks move to the capacity pool
pub const COOLING_PERIOD_DAYS: u32 = 31;

/// Permission model of a volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityStyle {
    Unix,
    Ntfs,
    Mixed,
}

impl SecurityStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unix => "UNIX",
            Self::Ntfs => "NTFS",
            Self::Mixed => "MIXED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeSpec {
    pub construct_id: &'static str,
    pub suffix: &'static str,
    pub junction_path: &'static str,
    pub security_style: SecurityStyle,
}

impl VolumeSpec {
    pub fn name(&self) -> String {
        format!("{VOLUME_NAME_PREFIX}{}", self.suffix)
    }
}

/// NFS clients see UNIX permissions, SMB clients NTFS ACLs
pub const VOLUMES: [VolumeSpec; 2] = [
    VolumeSpec {
        construct_id: "NFS Volume",
        suffix: "nfs",
        junction_path: "/nfs",
        security_style: SecurityStyle::Unix,
    },
    VolumeSpec {
        construct_id: "SMB Volume",
        suffix: "smb",
        junction_path: "/smb",
        security_style: SecurityStyle::Ntfs,
    },
];

pub fn declare_volume(
    stack: &mut Stack,
    svm: &ResourceRef,
    spec: &VolumeSpec,
) -> Result<ResourceRef, SynthError> {
    let name = spec.name();
    let properties = Volume {
        name: name.clone(),
        ontap_configuration: VolumeOntapConfiguration {
            junction_path: spec.junction_path.to_string(),
            security_style: spec.security_style.as_str().to_string(),
            size_in_megabytes: VOLUME_SIZE_MEGABYTES.to_string(),
            storage_efficiency_enabled: true.to_string(),
            storage_virtual_machine_id: svm.reference(),
            tiering_policy: TieringPolicy {
                cooling_period: COOLING_PERIOD_DAYS,
                name: "AUTO".to_string(),
            },
        },
        tags: vec![Tag::name(name)],
        volume_type: "ONTAP".to_string(),
    };

    stack.add(&ConstructPath::new(spec.construct_id), &properties)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_names() {
        let names: Vec<String> = VOLUMES.iter().map(VolumeSpec::name).collect();
        assert_eq!(
            names,
            vec!["fsx_for_ontap_volume_nfs", "fsx_for_ontap_volume_smb"]
        );
    }

    #[derive(serde::Serialize)]
    struct Placeholder {}

    impl crate::template::ResourceProperties for Placeholder {
        const TYPE: &'static str = "AWS::FSx::StorageVirtualMachine";
    }

    #[test]
    fn test_volume_properties_are_schema_strings() {
        let mut stack = Stack::new("Test");
        let svm = stack.add(&ConstructPath::new("SVM"), &Placeholder {}).unwrap();
        declare_volume(&mut stack, &svm, &VOLUMES[0]).unwrap();
        let template = stack.synth().unwrap();

        let config = &template.resources["NFSVolume"].properties["OntapConfiguration"];
        assert_eq!(config["SizeInMegabytes"], "1024");
        assert_eq!(config["StorageEfficiencyEnabled"], "true");
        assert_eq!(config["SecurityStyle"], "UNIX");
        assert_eq!(config["TieringPolicy"]["CoolingPeriod"], 31);
        assert_eq!(config["TieringPolicy"]["Name"], "AUTO");
        assert_eq!(config["StorageVirtualMachineId"], serde_json::json!({"Ref": "SVM"}));
    }
}
