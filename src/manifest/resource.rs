//! Resource documents and ordered resource collections

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{self, KdError, Result};

/// Identity of a resource: API group, kind and name.
///
/// The derived ordering is the output order of composed manifests.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey {
    /// API group, empty for the core group (`apiVersion: v1`)
    pub group: String,
    pub kind: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(group: impl Into<String>, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Key of a resource value, if it has a kind and a name
    pub fn of(value: &Value) -> Option<Self> {
        let api_version = value.get("apiVersion").and_then(Value::as_str).unwrap_or("");
        let kind = value.get("kind").and_then(Value::as_str)?;
        let name = value
            .get("metadata")
            .and_then(|metadata| metadata.get("name"))
            .and_then(Value::as_str)?;
        Some(Self::new(group_of(api_version), kind, name))
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.name)
    }
}

/// API group of an `apiVersion` such as `apps/v1`
pub fn group_of(api_version: &str) -> &str {
    api_version
        .split_once('/')
        .map(|(group, _)| group)
        .unwrap_or("")
}

/// One structured resource with its identity
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDoc {
    key: ResourceKey,
    value: Value,
}

impl ResourceDoc {
    /// Wrap a parsed document; `origin` names the source in errors
    pub fn from_value(value: Value, origin: &Path) -> Result<Self> {
        let key = ResourceKey::of(&value).ok_or_else(|| {
            error::compose::failed(origin, "resource without kind or metadata.name")
        })?;
        Ok(Self { key, value })
    }

    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

/// Split multi-document YAML into values, skipping empty documents
pub fn parse_documents(text: &str, origin: &Path) -> Result<Vec<Value>> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(text) {
        let value = Value::deserialize(document)
            .map_err(|e| error::compose::failed(origin, e.to_string()))?;
        match value {
            Value::Null => {}
            Value::Mapping(_) if is_list(&value) => {
                if let Some(Value::Sequence(items)) = value.get("items") {
                    documents.extend(items.iter().cloned());
                }
            }
            other => documents.push(other),
        }
    }
    Ok(documents)
}

fn is_list(value: &Value) -> bool {
    value.get("kind").and_then(Value::as_str) == Some("List")
        && matches!(value.get("items"), Some(Value::Sequence(_)))
}

/// Read every resource document of a manifest file
pub fn read_documents(path: &Path) -> Result<Vec<ResourceDoc>> {
    let text = std::fs::read_to_string(path).map_err(|e| KdError::IoError {
        message: format!("Failed to read {}: {}", path.display(), e),
    })?;
    parse_documents(&text, path)?
        .into_iter()
        .map(|value| ResourceDoc::from_value(value, path))
        .collect()
}

/// Resources keyed by identity, iterated in (group, kind, name) order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSet {
    resources: BTreeMap<ResourceKey, Value>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect documents, rejecting a second document with the same key
    pub fn from_docs(docs: impl IntoIterator<Item = ResourceDoc>) -> Result<Self> {
        let mut set = Self::new();
        for doc in docs {
            set.insert(doc)?;
        }
        Ok(set)
    }

    pub fn insert(&mut self, doc: ResourceDoc) -> Result<()> {
        if self.resources.contains_key(&doc.key) {
            let ResourceKey { group, kind, name } = doc.key;
            return Err(KdError::DuplicateResource { group, kind, name });
        }
        self.resources.insert(doc.key, doc.value);
        Ok(())
    }

    /// Move every resource of `other` into this set
    pub fn absorb(&mut self, other: ResourceSet) -> Result<()> {
        for (key, value) in other.resources {
            self.insert(ResourceDoc { key, value })?;
        }
        Ok(())
    }

    pub fn get(&self, key: &ResourceKey) -> Option<&Value> {
        self.resources.get(key)
    }

    pub fn get_mut(&mut self, key: &ResourceKey) -> Option<&mut Value> {
        self.resources.get_mut(key)
    }

    pub fn remove(&mut self, key: &ResourceKey) -> Option<Value> {
        self.resources.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKey, &Value)> {
        self.resources.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&ResourceKey, &mut Value)> {
        self.resources.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn into_docs(self) -> Vec<ResourceDoc> {
        self.resources
            .into_iter()
            .map(|(key, value)| ResourceDoc { key, value })
            .collect()
    }

    /// Multi-document YAML, one document per resource separated by `---`
    pub fn to_yaml(&self) -> Result<String> {
        let documents = self
            .resources
            .values()
            .map(|value| {
                serde_yaml::to_string(value)
                    .map_err(|e| error::compose::serialization_failed(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(documents.join("---\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> ResourceDoc {
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        ResourceDoc::from_value(value, Path::new("test.yaml")).unwrap()
    }

    #[test]
    fn test_key_of_grouped_and_core_resources() {
        let deployment = doc("apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n");
        assert_eq!(deployment.key(), &ResourceKey::new("apps", "Deployment", "web"));

        let service = doc("apiVersion: v1\nkind: Service\nmetadata:\n  name: web\n");
        assert_eq!(service.key(), &ResourceKey::new("", "Service", "web"));
    }

    #[test]
    fn test_resource_without_name_is_rejected() {
        let value: Value = serde_yaml::from_str("apiVersion: v1\nkind: Service\n").unwrap();
        let err = ResourceDoc::from_value(value, Path::new("svc.yaml")).unwrap_err();
        assert!(err.to_string().contains("svc.yaml"));
    }

    #[test]
    fn test_parse_documents_skips_empty_and_expands_lists() {
        let text = "---\n\
                    apiVersion: v1\nkind: Service\nmetadata:\n  name: a\n\
                    ---\n\
                    ---\n\
                    apiVersion: v1\nkind: List\nitems:\n\
                    - apiVersion: v1\n  kind: ConfigMap\n  metadata:\n    name: b\n\
                    - apiVersion: v1\n  kind: ConfigMap\n  metadata:\n    name: c\n";
        let documents = parse_documents(text, Path::new("all.yaml")).unwrap();
        assert_eq!(documents.len(), 3);
    }

    #[test]
    fn test_duplicate_resource() {
        let mut set = ResourceSet::new();
        set.insert(doc("apiVersion: v1\nkind: Service\nmetadata:\n  name: web\n"))
            .unwrap();
        let err = set
            .insert(doc("apiVersion: v1\nkind: Service\nmetadata:\n  name: web\n"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Duplicate resource Service 'web' (group '')");
    }

    #[test]
    fn test_to_yaml_sorted_by_group_kind_name() {
        let set = ResourceSet::from_docs([
            doc("apiVersion: networking.k8s.io/v1\nkind: Ingress\nmetadata:\n  name: web\n"),
            doc("apiVersion: v1\nkind: Service\nmetadata:\n  name: web\n"),
            doc("apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n"),
            doc("apiVersion: v1\nkind: Namespace\nmetadata:\n  name: web-prd\n"),
        ])
        .unwrap();

        let kinds: Vec<&str> = set.iter().map(|(key, _)| key.kind.as_str()).collect();
        assert_eq!(kinds, ["Namespace", "Service", "Deployment", "Ingress"]);

        let yaml = set.to_yaml().unwrap();
        assert_eq!(yaml.matches("---\n").count(), 3);
        assert!(yaml.starts_with("apiVersion: v1\nkind: Namespace\n"));
    }
}
