use crate::error::ExplainError;
use crate::model::TypeIdentity;
use crate::schema::{Container, SchemaNode, SchemaSet, Shape};
use std::sync::Arc;

/// A position in a schema: the resolved type plus the field path walked from
/// its root. Navigation returns new documents; a document is never mutated.
#[derive(Debug, Clone)]
pub struct Document {
    schema: Arc<SchemaSet>,
    identity: TypeIdentity,
    root: String,
    path: Vec<String>,
    current: SchemaNode,
}

impl Document {
    pub fn new(
        schema: Arc<SchemaSet>,
        identity: TypeIdentity,
        path: Vec<String>,
    ) -> Result<Self, ExplainError> {
        let root = schema.lookup_kind(&identity)?.to_string();
        Self::at_path(schema, identity, root, path)
    }

    fn at_path(
        schema: Arc<SchemaSet>,
        identity: TypeIdentity,
        root: String,
        path: Vec<String>,
    ) -> Result<Self, ExplainError> {
        let mut node = schema
            .definition(&root)
            .ok_or_else(|| ExplainError::SchemaNotFound(identity.clone()))?;
        for (depth, segment) in path.iter().enumerate() {
            let parent = || full_path(&identity.kind, &path[..depth]);
            let container =
                child_container(&schema, node).ok_or_else(|| ExplainError::FieldPath {
                    field: segment.clone(),
                    parent: parent(),
                })?;
            let field = container
                .field(segment)
                .ok_or_else(|| ExplainError::FieldPath {
                    field: segment.clone(),
                    parent: parent(),
                })?;
            node = &field.node;
        }

        let current = node.clone();
        Ok(Self {
            schema,
            identity,
            root,
            path,
            current,
        })
    }

    pub fn identity(&self) -> &TypeIdentity {
        &self.identity
    }

    #[cfg(test)]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn child_container(&self) -> Option<&Container> {
        child_container(&self.schema, &self.current)
    }

    pub fn field_count(&self) -> usize {
        self.child_container().map(Container::len).unwrap_or(0)
    }

    pub fn full_path(&self) -> String {
        full_path(&self.identity.kind, &self.path)
    }

    /// Returns `None` when there are no fields or the field has nothing to
    /// descend into (a scalar, a map or an array of scalars).
    pub fn descend(&self, field_index: usize) -> Option<Document> {
        let container = self.child_container()?;
        if container.is_empty() {
            return None;
        }
        let field = &container.fields[field_index.min(container.len() - 1)];
        self.schema.descend_target(&field.node)?;

        let mut path = self.path.clone();
        path.push(field.name.clone());
        Some(Document {
            schema: Arc::clone(&self.schema),
            identity: self.identity.clone(),
            root: self.root.clone(),
            path,
            current: field.node.clone(),
        })
    }

    pub fn ascend(&self) -> Option<Document> {
        let (_, parent) = self.path.split_last()?;
        Self::at_path(
            Arc::clone(&self.schema),
            self.identity.clone(),
            self.root.clone(),
            parent.to_vec(),
        )
        .ok()
    }

    pub fn field_label(&self) -> String {
        match self.path.last() {
            Some(name) => format!("{name} <{}>", self.schema.type_name(&self.current)),
            None => String::new(),
        }
    }

    /// The field's own description followed, for references and arrays of
    /// references, by the description of the referenced type.
    pub fn descriptions(&self) -> Vec<String> {
        let mut descriptions = vec![self.current.description.clone()];
        let referenced = match &self.current.shape {
            Shape::Reference(_) => self.schema.resolve(&self.current),
            Shape::Array(element) if element.is_reference() => self.schema.resolve(element),
            _ => None,
        };
        if let Some(target) = referenced {
            descriptions.push(target.description.clone());
        }
        descriptions
    }

    pub fn type_name(&self, node: &SchemaNode) -> String {
        self.schema.type_name(node)
    }
}

fn child_container<'a>(schema: &'a SchemaSet, node: &'a SchemaNode) -> Option<&'a Container> {
    match &schema.descend_target(node)?.shape {
        Shape::Container(container) => Some(container),
        _ => None,
    }
}

fn full_path(kind: &str, path: &[String]) -> String {
    std::iter::once(kind)
        .chain(path.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::Document;
    use crate::error::ExplainError;
    use crate::model::TypeIdentity;
    use crate::schema::tests::pod_schema;
    use std::sync::Arc;

    fn pod_document(path: &[&str]) -> Result<Document, ExplainError> {
        Document::new(
            Arc::new(pod_schema()),
            TypeIdentity::new("", "v1", "Pod"),
            path.iter().map(|segment| segment.to_string()).collect(),
        )
    }

    #[test]
    fn root_document_lists_kind_fields() {
        let doc = pod_document(&[]).expect("root opens");
        assert_eq!(doc.field_count(), 4);
        assert_eq!(doc.field_label(), "");
        assert_eq!(doc.full_path(), "Pod");
        assert_eq!(
            doc.descriptions(),
            vec!["Pod is a collection of containers that can run on a host.".to_string()]
        );
    }

    #[test]
    fn reference_field_adds_target_description() {
        let doc = pod_document(&["spec"]).expect("spec opens");
        assert_eq!(doc.field_label(), "spec <Object>");
        assert_eq!(
            doc.descriptions(),
            vec![
                "Specification of the desired behavior of the pod.".to_string(),
                "PodSpec is a description of a pod.".to_string(),
            ]
        );
        assert_eq!(doc.field_count(), 3);
    }

    #[test]
    fn array_of_references_unwraps_to_element_fields() {
        let doc = pod_document(&["spec", "containers"]).expect("containers open");
        assert_eq!(doc.field_label(), "containers <[]Object>");
        assert_eq!(doc.descriptions().len(), 2);
        assert_eq!(doc.field_count(), 3);
    }

    #[test]
    fn scalar_path_opens_without_fields() {
        let doc = pod_document(&["spec", "restartPolicy"]).expect("scalar opens");
        assert_eq!(doc.field_label(), "restartPolicy <string>");
        assert_eq!(doc.field_count(), 0);
        assert!(doc.child_container().is_none());
        assert_eq!(doc.descriptions().len(), 1);
    }

    #[test]
    fn unknown_segment_is_a_field_path_error() {
        let error = pod_document(&["spec", "nope"]).expect_err("bad path");
        match error {
            ExplainError::FieldPath { field, parent } => {
                assert_eq!(field, "nope");
                assert_eq!(parent, "Pod.spec");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(pod_document(&["kind", "deeper"]).is_err());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let result = Document::new(
            Arc::new(pod_schema()),
            TypeIdentity::new("apps", "v1", "Deployment"),
            Vec::new(),
        );
        assert!(matches!(result, Err(ExplainError::SchemaNotFound(_))));
    }

    #[test]
    fn descend_into_scalar_is_a_noop() {
        let doc = pod_document(&[]).expect("root opens");
        // fields: apiVersion, kind, metadata, spec
        assert!(doc.descend(0).is_none());
        assert!(doc.descend(1).is_none());
        let leaf = pod_document(&["spec", "restartPolicy"]).expect("scalar opens");
        assert!(leaf.descend(0).is_none());
    }

    #[test]
    fn descend_clamps_index_and_appends_segment() {
        let doc = pod_document(&[]).expect("root opens");
        let spec = doc.descend(99).expect("last field is spec");
        assert_eq!(spec.path(), ["spec".to_string()]);
        assert_eq!(spec.full_path(), "Pod.spec");
    }

    #[test]
    fn ascend_after_descend_restores_path() {
        let doc = pod_document(&["spec"]).expect("spec opens");
        for index in 0..doc.field_count() {
            if let Some(child) = doc.descend(index) {
                let parent = child.ascend().expect("child has a parent");
                assert_eq!(parent.path(), doc.path());
                assert_eq!(parent.field_count(), doc.field_count());
            }
        }
    }

    #[test]
    fn ascend_at_root_is_a_noop() {
        let doc = pod_document(&[]).expect("root opens");
        assert!(doc.ascend().is_none());
    }
}
