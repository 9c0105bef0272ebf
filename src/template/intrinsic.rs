//! Template expressions
//!
//! Property values that are either literals or CloudFormation intrinsic
//! functions resolved by the provisioning engine at deploy time.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Pseudo parameter holding the partition of the deployment region
pub const AWS_PARTITION: &str = "AWS::Partition";

/// A property value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Str(String),
    /// `{"Ref": logical_id}`
    Ref(String),
    /// `{"Fn::GetAtt": [logical_id, attribute]}`
    GetAtt(String, String),
    /// `{"Fn::Join": [delimiter, parts]}`
    Join(String, Vec<Expr>),
    /// `{"Fn::Select": [index, list]}`
    Select(usize, Box<Expr>),
    /// `{"Fn::GetAZs": region}`
    GetAzs(String),
}

impl Expr {
    pub fn reference(logical_id: impl Into<String>) -> Self {
        Self::Ref(logical_id.into())
    }

    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::GetAtt(logical_id.into(), attribute.into())
    }

    /// Join without delimiter
    pub fn concat(parts: Vec<Expr>) -> Self {
        Self::Join(String::new(), parts)
    }

    /// Availability zone `index` of the deployment region
    pub fn availability_zone(index: usize) -> Self {
        Self::Select(index, Box::new(Self::GetAzs(String::new())))
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Str(s) => serializer.serialize_str(s),
            Self::Ref(id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", id)?;
                map.end()
            }
            Self::GetAtt(id, attr) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &[id, attr])?;
                map.end()
            }
            Self::Join(delimiter, parts) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Join", &JoinArgs(delimiter, parts))?;
                map.end()
            }
            Self::Select(index, list) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Select", &SelectArgs(*index, list))?;
                map.end()
            }
            Self::GetAzs(region) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAZs", region)?;
                map.end()
            }
        }
    }
}

struct JoinArgs<'a>(&'a str, &'a [Expr]);

impl Serialize for JoinArgs<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(self.0)?;
        seq.serialize_element(self.1)?;
        seq.end()
    }
}

struct SelectArgs<'a>(usize, &'a Expr);

impl Serialize for SelectArgs<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.0)?;
        seq.serialize_element(self.1)?;
        seq.end()
    }
}

/// Reference one JSON field of a Secrets Manager secret:
/// `{{resolve:secretsmanager:<secret>:SecretString:<field>}}`.
///
/// `secret` may itself be an intrinsic. The value is substituted by the
/// provisioning engine; it never appears in the template.
pub fn secret_field(secret: Expr, field: &str) -> Expr {
    collapse(vec![
        Expr::from("{{resolve:secretsmanager:"),
        secret,
        Expr::Str(format!(":SecretString:{field}}}}}")),
    ])
}

/// Merge adjacent literals; a join made only of literals becomes a literal
fn collapse(parts: Vec<Expr>) -> Expr {
    let mut merged: Vec<Expr> = Vec::with_capacity(parts.len());
    for part in parts {
        if let (Some(Expr::Str(prev)), Expr::Str(next)) = (merged.last_mut(), &part) {
            prev.push_str(next);
            continue;
        }
        merged.push(part);
    }

    if merged.len() == 1 && matches!(merged[0], Expr::Str(_)) {
        return merged.remove(0);
    }
    Expr::concat(merged)
}
