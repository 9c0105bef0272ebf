//! Stack and construct paths

use super::{Expr, Parameter, RemovalPolicy, Resource, ResourceProperties, Template};
use crate::error::SynthError;
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fmt;

/// Maximum length of a CloudFormation logical id
const MAX_LOGICAL_ID_LEN: usize = 255;

/// Length of the hash suffix appended to multi-component logical ids
const HASH_LEN: usize = 8;

/// Path components left out of the human-readable part of a logical id
const HIDDEN_COMPONENTS: &[&str] = &["Resource", "Default"];

/// Path of a construct below the stack, e.g. `Consumer VPC/PublicSubnet1/Subnet`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstructPath(Vec<String>);

impl ConstructPath {
    pub fn new(id: impl Into<String>) -> Self {
        Self(vec![id.into()])
    }

    pub fn child(&self, id: impl Into<String>) -> Self {
        let mut components = self.0.clone();
        components.push(id.into());
        Self(components)
    }

    pub fn components(&self) -> &[String] {
        &self.0
    }

    /// Id of the construct itself (last component)
    pub fn id(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    fn parent(&self) -> String {
        self.0[..self.0.len().saturating_sub(1)].join("/")
    }
}

impl fmt::Display for ConstructPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// Derive a stable logical id from a construct path.
///
/// A single component maps to its alphanumeric characters. Longer paths get
/// the alphanumeric characters of every visible component followed by the
/// first 8 hex digits of the MD5 of the full path, so that distinct paths with
/// the same letters never collide.
pub fn logical_id(components: &[String]) -> String {
    if let [only] = components {
        let candidate = alphanumeric(only);
        if !candidate.is_empty() && candidate.len() <= MAX_LOGICAL_ID_LEN {
            return candidate;
        }
    }

    let digest = md5::compute(components.join("/").as_bytes());
    let hash = format!("{:x}", digest)[..HASH_LEN].to_uppercase();

    let mut human: String = components
        .iter()
        .filter(|c| !HIDDEN_COMPONENTS.contains(&c.as_str()))
        .map(|c| alphanumeric(c))
        .collect();
    human.truncate(MAX_LOGICAL_ID_LEN - HASH_LEN);

    format!("{human}{hash}")
}

fn alphanumeric(s: &str) -> String {
    s.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Handle on a declared resource or parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    logical_id: String,
}

impl ResourceRef {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// `{"Ref": ..}`
    pub fn reference(&self) -> Expr {
        Expr::reference(&self.logical_id)
    }

    /// `{"Fn::GetAtt": [.., attribute]}`
    pub fn get_att(&self, attribute: &str) -> Expr {
        Expr::get_att(&self.logical_id, attribute)
    }
}

/// Collects declarations until [`Stack::synth`]
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    description: Option<String>,
    parameters: IndexMap<String, Parameter>,
    resources: IndexMap<String, Resource>,
    paths: HashSet<ConstructPath>,
}

impl Stack {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            parameters: IndexMap::new(),
            resources: IndexMap::new(),
            paths: HashSet::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a resource at `path`
    pub fn add<P: ResourceProperties>(
        &mut self,
        path: &ConstructPath,
        properties: &P,
    ) -> Result<ResourceRef, SynthError> {
        let logical_id = self.claim(path)?;
        let properties =
            serde_json::to_value(properties).map_err(|source| SynthError::Properties {
                path: path.to_string(),
                source,
            })?;

        tracing::debug!("declare {} {} as {}", P::TYPE, path, logical_id);

        self.resources.insert(
            logical_id.clone(),
            Resource {
                resource_type: P::TYPE.to_string(),
                properties,
                depends_on: Vec::new(),
                update_replace_policy: None,
                deletion_policy: None,
                metadata: json!({ "topology:path": format!("{}/{}", self.name, path) }),
            },
        );

        Ok(ResourceRef { logical_id })
    }

    /// Declare a template parameter at `path`
    pub fn add_parameter(
        &mut self,
        path: &ConstructPath,
        parameter: Parameter,
    ) -> Result<ResourceRef, SynthError> {
        let logical_id = self.claim(path)?;
        self.parameters.insert(logical_id.clone(), parameter);
        Ok(ResourceRef { logical_id })
    }

    /// Make `resource` wait for `dependency` beyond what its references imply
    pub fn add_dependency(&mut self, resource: &ResourceRef, dependency: &ResourceRef) {
        if let Some(r) = self.resources.get_mut(&resource.logical_id) {
            if !r.depends_on.contains(&dependency.logical_id) {
                r.depends_on.push(dependency.logical_id.clone());
            }
        }
    }

    pub fn set_removal_policy(&mut self, resource: &ResourceRef, policy: RemovalPolicy) {
        if let Some(r) = self.resources.get_mut(&resource.logical_id) {
            r.update_replace_policy = Some(policy);
            r.deletion_policy = Some(policy);
        }
    }

    /// Validate references and produce the template
    pub fn synth(self) -> Result<Template, SynthError> {
        for (logical_id, resource) in &self.resources {
            let mut targets = Vec::new();
            collect_references(&resource.properties, &mut targets);
            targets.extend(resource.depends_on.iter().map(String::as_str));

            for target in targets {
                if !self.resources.contains_key(target) && !self.parameters.contains_key(target) {
                    return Err(SynthError::DanglingReference {
                        source_id: logical_id.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "synthesized stack {}: {} resource(s), {} parameter(s)",
            self.name,
            self.resources.len(),
            self.parameters.len()
        );

        Ok(Template {
            description: self.description,
            parameters: self.parameters,
            resources: self.resources,
        })
    }

    fn claim(&mut self, path: &ConstructPath) -> Result<String, SynthError> {
        let logical_id = logical_id(path.components());
        let taken = self.resources.contains_key(&logical_id)
            || self.parameters.contains_key(&logical_id);

        if taken || !self.paths.insert(path.clone()) {
            return Err(SynthError::DuplicateId {
                scope: format!("{}/{}", self.name, path.parent()),
                id: path.id().to_string(),
            });
        }
        Ok(logical_id)
    }
}

/// Logical ids named by `Ref` and `Fn::GetAtt`, pseudo parameters excluded
fn collect_references<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(id)) = map.get("Ref") {
                if !id.starts_with("AWS::") {
                    out.push(id);
                }
            }
            if let Some(Value::String(id)) = map
                .get("Fn::GetAtt")
                .and_then(|args| args.as_array())
                .and_then(|args| args.first())
            {
                out.push(id);
            }
            for nested in map.values() {
                collect_references(nested, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct Dummy {
        target: Option<Expr>,
    }

    impl ResourceProperties for Dummy {
        const TYPE: &'static str = "Test::Dummy";
    }

    fn path(components: &[&str]) -> Vec<String> {
        components.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_single_component_logical_id_has_no_hash() {
        assert_eq!(logical_id(&path(&["NFS Volume"])), "NFSVolume");
        assert_eq!(logical_id(&path(&["SVM"])), "SVM");
    }

    #[test]
    fn test_nested_logical_id_hides_resource_component() {
        let id = logical_id(&path(&["SSM IAM Role", "Resource"]));
        assert!(id.starts_with("SSMIAMRole"));
        assert_eq!(id.len(), "SSMIAMRole".len() + HASH_LEN);
        assert!(id[id.len() - HASH_LEN..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_logical_id_is_stable_and_path_sensitive() {
        let a = logical_id(&path(&["Consumer VPC", "PublicSubnet1", "Subnet"]));
        let b = logical_id(&path(&["Consumer VPC", "PublicSubnet1", "Subnet"]));
        let c = logical_id(&path(&["ConsumerVPC", "PublicSubnet1", "Subnet"]));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_duplicate_path_is_rejected() {
        let mut stack = Stack::new("Test");
        let p = ConstructPath::new("Thing");
        stack.add(&p, &Dummy { target: None }).unwrap();
        let err = stack.add(&p, &Dummy { target: None }).unwrap_err();
        assert!(matches!(err, SynthError::DuplicateId { ref id, .. } if id == "Thing"));
    }

    #[test]
    fn test_synth_rejects_dangling_reference() {
        let mut stack = Stack::new("Test");
        stack
            .add(
                &ConstructPath::new("Thing"),
                &Dummy {
                    target: Some(Expr::reference("Missing")),
                },
            )
            .unwrap();
        let err = stack.synth().unwrap_err();
        assert!(matches!(err, SynthError::DanglingReference { ref target, .. } if target == "Missing"));
    }

    #[test]
    fn test_synth_accepts_parameters_and_pseudo_parameters() {
        let mut stack = Stack::new("Test");
        let param = stack
            .add_parameter(&ConstructPath::new("Image"), Parameter::ssm_image_id("/ami"))
            .unwrap();
        stack
            .add(
                &ConstructPath::new("A"),
                &Dummy {
                    target: Some(param.reference()),
                },
            )
            .unwrap();
        stack
            .add(
                &ConstructPath::new("B"),
                &Dummy {
                    target: Some(Expr::reference("AWS::Partition")),
                },
            )
            .unwrap();
        let template = stack.synth().unwrap();
        assert_eq!(template.resources.len(), 2);
        assert_eq!(template.parameters.len(), 1);
    }

    #[test]
    fn test_dependency_and_removal_policy_are_recorded() {
        let mut stack = Stack::new("Test");
        let a = stack.add(&ConstructPath::new("A"), &Dummy { target: None }).unwrap();
        let b = stack.add(&ConstructPath::new("B"), &Dummy { target: None }).unwrap();
        stack.add_dependency(&b, &a);
        stack.add_dependency(&b, &a);
        stack.set_removal_policy(&a, RemovalPolicy::Delete);

        let template = stack.synth().unwrap();
        assert_eq!(template.resources["B"].depends_on, vec!["A".to_string()]);
        assert_eq!(
            template.resources["A"].deletion_policy,
            Some(RemovalPolicy::Delete)
        );
        assert_eq!(template.resources["A"].metadata["topology:path"], "Test/A");
    }
}
