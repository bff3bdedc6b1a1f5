//! Hierarchical API schema, decoded from an OpenAPI v2 (swagger) document.

use crate::error::ExplainError;
use crate::model::TypeIdentity;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

const DEFINITION_REF_PREFIX: &str = "#/definitions/";
const MAX_REFERENCE_HOPS: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub description: String,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Reference(String),
    Container(Container),
    Array(Box<SchemaNode>),
    Map(Box<SchemaNode>),
    /// Primitive type name such as `string`; `None` for untyped values.
    Scalar(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Container {
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub node: SchemaNode,
    pub required: bool,
}

impl Container {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl SchemaNode {
    pub fn new(description: impl Into<String>, shape: Shape) -> Self {
        Self {
            description: description.into(),
            shape,
        }
    }

    #[cfg(test)]
    pub fn scalar(type_name: &str) -> Self {
        Self::new("", Shape::Scalar(Some(type_name.to_string())))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.shape, Shape::Reference(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    definitions: HashMap<String, SchemaNode>,
    kinds: HashMap<TypeIdentity, String>,
}

impl SchemaSet {
    pub fn from_swagger_json(raw: &str) -> Result<Self, ExplainError> {
        let document: SwaggerDocument = serde_json::from_str(raw)?;
        let mut set = Self::default();
        for (name, raw_schema) in document.definitions {
            for gvk in &raw_schema.group_version_kinds {
                set.kinds.insert(
                    TypeIdentity::new(&gvk.group, &gvk.version, &gvk.kind),
                    name.clone(),
                );
            }
            set.definitions.insert(name, raw_schema.into_node());
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn definition(&self, name: &str) -> Option<&SchemaNode> {
        self.definitions.get(name)
    }

    pub fn lookup_kind(&self, identity: &TypeIdentity) -> Result<&str, ExplainError> {
        self.kinds
            .get(identity)
            .map(String::as_str)
            .ok_or_else(|| ExplainError::SchemaNotFound(identity.clone()))
    }

    /// Follows references until a non-reference node is reached.
    ///
    /// Returns `None` for dangling references or reference chains that loop.
    pub fn resolve<'a>(&'a self, node: &'a SchemaNode) -> Option<&'a SchemaNode> {
        let mut current = node;
        for _ in 0..MAX_REFERENCE_HOPS {
            match &current.shape {
                Shape::Reference(name) => current = self.definitions.get(name)?,
                _ => return Some(current),
            }
        }
        None
    }

    /// The node a field can be descended into: the target of a reference, the
    /// element of an array, or an inline container.
    pub fn descend_target<'a>(&'a self, node: &'a SchemaNode) -> Option<&'a SchemaNode> {
        match &node.shape {
            Shape::Reference(_) => self.resolve(node),
            Shape::Container(_) => Some(node),
            Shape::Array(element) => match element.shape {
                Shape::Reference(_) => self.resolve(element),
                Shape::Container(_) => Some(element),
                _ => None,
            },
            Shape::Map(_) | Shape::Scalar(_) => None,
        }
    }

    pub fn type_name(&self, node: &SchemaNode) -> String {
        match &node.shape {
            Shape::Reference(_) => self
                .resolve(node)
                .map(|target| self.type_name(target))
                .unwrap_or_else(|| "Object".to_string()),
            Shape::Container(_) => "Object".to_string(),
            Shape::Array(element) => format!("[]{}", self.type_name(element)),
            Shape::Map(value) => format!("map[string]{}", self.type_name(value)),
            Shape::Scalar(Some(type_name)) => type_name.clone(),
            Shape::Scalar(None) => "Object".to_string(),
        }
    }

    #[cfg(test)]
    pub fn insert(&mut self, name: &str, identity: Option<TypeIdentity>, node: SchemaNode) {
        if let Some(identity) = identity {
            self.kinds.insert(identity, name.to_string());
        }
        self.definitions.insert(name.to_string(), node);
    }
}

#[derive(Debug, Deserialize)]
struct SwaggerDocument {
    #[serde(default)]
    definitions: BTreeMap<String, RawSchema>,
}

#[derive(Debug, Deserialize, Default)]
struct RawSchema {
    #[serde(default)]
    description: String,
    #[serde(default, rename = "type")]
    type_name: Option<String>,
    #[serde(default, rename = "$ref")]
    reference: Option<String>,
    #[serde(default)]
    properties: BTreeMap<String, RawSchema>,
    #[serde(default)]
    required: Vec<String>,
    #[serde(default)]
    items: Option<Box<RawSchema>>,
    #[serde(default, rename = "additionalProperties")]
    additional_properties: Option<AdditionalProperties>,
    #[serde(default, rename = "x-kubernetes-group-version-kind")]
    group_version_kinds: Vec<RawGroupVersionKind>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AdditionalProperties {
    Schema(Box<RawSchema>),
    #[allow(dead_code)]
    Flag(bool),
}

#[derive(Debug, Deserialize)]
struct RawGroupVersionKind {
    #[serde(default)]
    group: String,
    version: String,
    kind: String,
}

impl RawSchema {
    fn into_node(self) -> SchemaNode {
        let RawSchema {
            description,
            type_name,
            reference,
            properties,
            required,
            items,
            additional_properties,
            ..
        } = self;

        if let Some(reference) = reference {
            let target = reference
                .strip_prefix(DEFINITION_REF_PREFIX)
                .unwrap_or(&reference)
                .to_string();
            return SchemaNode::new(description, Shape::Reference(target));
        }

        let object_like = matches!(type_name.as_deref(), Some("object") | None);
        if object_like
            && properties.is_empty()
            && let Some(AdditionalProperties::Schema(value)) = additional_properties
        {
            return SchemaNode::new(description, Shape::Map(Box::new(value.into_node())));
        }

        let shape = match type_name.as_deref() {
            Some("array") => {
                let element = items
                    .map(|items| items.into_node())
                    .unwrap_or_else(|| SchemaNode::new("", Shape::Scalar(None)));
                Shape::Array(Box::new(element))
            }
            Some("object") => Shape::Container(container_from(properties, &required)),
            None if !properties.is_empty() => {
                Shape::Container(container_from(properties, &required))
            }
            Some(primitive) => Shape::Scalar(Some(primitive.to_string())),
            None => Shape::Scalar(None),
        };
        SchemaNode::new(description, shape)
    }
}

fn container_from(properties: BTreeMap<String, RawSchema>, required: &[String]) -> Container {
    let fields = properties
        .into_iter()
        .map(|(name, raw)| Field {
            required: required.iter().any(|entry| entry == &name),
            node: raw.into_node(),
            name,
        })
        .collect();
    Container { fields }
}
