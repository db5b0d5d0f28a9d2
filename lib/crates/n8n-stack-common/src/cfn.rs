//! CloudFormation template model.
//!
//! Maps are `BTreeMap`s so serialization order depends only on logical IDs
//! and property names, never on insertion order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

/// Template format version accepted by CloudFormation.
pub const FORMAT_VERSION: &str = "2010-09-09";

/// Pseudo parameter resolving to the partition (`aws`, `aws-cn`, ...).
pub const AWS_PARTITION: &str = "AWS::Partition";

/// Errors raised while building a template.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateModelError {
    #[error("duplicate logical ID '{0}'")]
    DuplicateLogicalId(String),

    #[error("logical ID '{0}' must be non-empty and alphanumeric")]
    InvalidLogicalId(String),

    #[error("resource '{resource}' depends on unknown logical ID '{missing}'")]
    DanglingDependency { resource: String, missing: String },
}

/// A complete CloudFormation template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Parameter>,
    pub resources: BTreeMap<String, Resource>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

/// A template parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A single resource declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,
}

/// A stack output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Resource tag in the `{"Key": .., "Value": ..}` shape most resource types use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Template {
    /// Create an empty template.
    #[must_use]
    pub fn new(description: Option<String>) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            description,
            parameters: BTreeMap::new(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// Declare a resource under `logical_id`.
    pub fn add_resource(
        &mut self,
        logical_id: &str,
        resource: Resource,
    ) -> Result<(), TemplateModelError> {
        validate_logical_id(logical_id)?;
        if self.resources.contains_key(logical_id) {
            return Err(TemplateModelError::DuplicateLogicalId(logical_id.to_string()));
        }
        self.resources.insert(logical_id.to_string(), resource);
        Ok(())
    }

    /// Declare a parameter under `logical_id`.
    pub fn add_parameter(
        &mut self,
        logical_id: &str,
        parameter: Parameter,
    ) -> Result<(), TemplateModelError> {
        validate_logical_id(logical_id)?;
        if self.parameters.contains_key(logical_id) {
            return Err(TemplateModelError::DuplicateLogicalId(logical_id.to_string()));
        }
        self.parameters.insert(logical_id.to_string(), parameter);
        Ok(())
    }

    /// Declare an output under `logical_id`.
    pub fn add_output(&mut self, logical_id: &str, output: Output) -> Result<(), TemplateModelError> {
        validate_logical_id(logical_id)?;
        if self.outputs.contains_key(logical_id) {
            return Err(TemplateModelError::DuplicateLogicalId(logical_id.to_string()));
        }
        self.outputs.insert(logical_id.to_string(), output);
        Ok(())
    }

    /// Iterate over resources of the given CloudFormation type.
    pub fn resources_of_type<'a>(
        &'a self,
        kind: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Resource)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, r)| r.kind == kind)
            .map(|(id, r)| (id.as_str(), r))
    }

    /// Number of resources of the given type.
    #[must_use]
    pub fn count_of_type(&self, kind: &str) -> usize {
        self.resources_of_type(kind).count()
    }

    /// Check that every `DependsOn` entry names a declared resource.
    pub fn check_dependencies(&self) -> Result<(), TemplateModelError> {
        for (id, resource) in &self.resources {
            for dep in &resource.depends_on {
                if !self.resources.contains_key(dep) {
                    return Err(TemplateModelError::DanglingDependency {
                        resource: id.clone(),
                        missing: dep.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Apply stack-level tags to every resource whose type accepts them.
    ///
    /// `tag_property` returns the property name carrying tags for a resource
    /// type, or `None` when the type is not taggable. Existing tags with the
    /// same key win over stack tags.
    pub fn apply_tags(&mut self, tags: &[Tag], tag_property: impl Fn(&str) -> Option<&'static str>) {
        if tags.is_empty() {
            return;
        }
        for resource in self.resources.values_mut() {
            let Some(prop) = tag_property(&resource.kind) else {
                continue;
            };
            let mut merged: BTreeMap<String, String> =
                tags.iter().map(|t| (t.key.clone(), t.value.clone())).collect();
            if let Some(Value::Array(existing)) = resource.properties.get(prop) {
                for tag in existing {
                    if let (Some(k), Some(v)) = (
                        tag.get("Key").and_then(Value::as_str),
                        tag.get("Value").and_then(Value::as_str),
                    ) {
                        merged.insert(k.to_string(), v.to_string());
                    }
                }
            }
            let list: Vec<Value> = merged
                .into_iter()
                .map(|(key, value)| json!({ "Key": key, "Value": value }))
                .collect();
            resource.properties.insert(prop.to_string(), Value::Array(list));
        }
    }

    /// Pretty-printed JSON with a trailing newline.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }
}

impl Resource {
    #[must_use]
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            properties: BTreeMap::new(),
            depends_on: Vec::new(),
            deletion_policy: None,
            update_replace_policy: None,
        }
    }

    #[must_use]
    pub fn property(mut self, name: &str, value: Value) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    /// Add an explicit dependency. Duplicates are ignored and the list stays sorted.
    #[must_use]
    pub fn depends_on(mut self, logical_id: &str) -> Self {
        if !self.depends_on.iter().any(|d| d == logical_id) {
            self.depends_on.push(logical_id.to_string());
            self.depends_on.sort();
        }
        self
    }

    /// Delete the physical resource with the stack, including on replacement.
    #[must_use]
    pub fn destroy_with_stack(mut self) -> Self {
        self.deletion_policy = Some("Delete".to_string());
        self.update_replace_policy = Some("Delete".to_string());
        self
    }
}

impl Tag {
    #[must_use]
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

fn validate_logical_id(id: &str) -> Result<(), TemplateModelError> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(TemplateModelError::InvalidLogicalId(id.to_string()));
    }
    Ok(())
}

// ── Intrinsic functions ──────────────────────────────────────────────────────

/// `{"Ref": id}`
#[must_use]
pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

/// `{"Fn::GetAtt": [id, attribute]}`
#[must_use]
pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

/// `{"Fn::Join": [separator, parts]}`
#[must_use]
pub fn join(separator: &str, parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": [separator, parts] })
}

/// `{"Fn::Base64": value}`
#[must_use]
pub fn base64(value: Value) -> Value {
    json!({ "Fn::Base64": value })
}

/// First availability zone of the deployment region.
#[must_use]
pub fn first_availability_zone() -> Value {
    json!({ "Fn::Select": [0, { "Fn::GetAZs": "" }] })
}

/// ARN of an AWS managed IAM policy, partition-aware.
#[must_use]
pub fn managed_policy_arn(name: &str) -> Value {
    join(
        "",
        vec![
            json!("arn:"),
            reference(AWS_PARTITION),
            json!(format!(":iam::aws:policy/{name}")),
        ],
    )
}

/// Replace every occurrence of each placeholder token in `text` with the
/// paired value, producing an `Fn::Join` when any token is present.
///
/// Adjacent literal fragments are merged, so the result is a plain string
/// when no token occurs.
#[must_use]
pub fn interpolate(text: &str, tokens: &[(&str, Value)]) -> Value {
    let mut parts: Vec<Value> = Vec::new();
    let mut literal = String::new();
    let mut rest = text;

    loop {
        let next = tokens
            .iter()
            .filter(|(token, _)| !token.is_empty())
            .filter_map(|(token, value)| rest.find(token).map(|pos| (pos, *token, value)))
            .min_by_key(|(pos, _, _)| *pos);

        let Some((pos, token, value)) = next else {
            literal.push_str(rest);
            break;
        };
        literal.push_str(&rest[..pos]);
        if !literal.is_empty() {
            parts.push(Value::String(std::mem::take(&mut literal)));
        }
        parts.push(value.clone());
        rest = &rest[pos + token.len()..];
    }
    if !literal.is_empty() {
        parts.push(Value::String(literal));
    }

    match parts.len() {
        0 => Value::String(String::new()),
        1 if parts[0].is_string() => parts.remove(0),
        _ => join("", parts),
    }
}
