//! Namespace, label and annotation transforms of a kustomization

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};

use super::resource::ResourceSet;

/// Kinds that are not placed in a namespace
const CLUSTER_SCOPED: [&str; 14] = [
    "APIService",
    "ClusterRole",
    "ClusterRoleBinding",
    "CSIDriver",
    "CustomResourceDefinition",
    "IngressClass",
    "MutatingWebhookConfiguration",
    "Namespace",
    "Node",
    "PersistentVolume",
    "PriorityClass",
    "RuntimeClass",
    "StorageClass",
    "ValidatingWebhookConfiguration",
];

/// Kinds with a pod template at `spec.template` and a label selector
const WORKLOADS: [&str; 4] = ["Deployment", "StatefulSet", "DaemonSet", "ReplicaSet"];

pub fn is_namespaced(kind: &str) -> bool {
    !CLUSTER_SCOPED.contains(&kind)
}

/// Place every namespaced resource in `namespace`
pub fn set_namespace(resources: &mut ResourceSet, namespace: &str) {
    for (key, value) in resources.iter_mut() {
        if is_namespaced(&key.kind) {
            if let Some(metadata) = ensure_map(value, &["metadata"]) {
                insert_str(metadata, "namespace", namespace);
            }
        }

        // Service accounts bound by name follow the namespace they live in
        if key.kind == "RoleBinding" || key.kind == "ClusterRoleBinding" {
            if let Some(Value::Sequence(subjects)) = value.get_mut("subjects") {
                for subject in subjects.iter_mut() {
                    if subject.get("kind").and_then(Value::as_str) == Some("ServiceAccount") {
                        if let Value::Mapping(subject) = subject {
                            insert_str(subject, "namespace", namespace);
                        }
                    }
                }
            }
        }
    }
}

/// Add labels to metadata, pod templates and selectors
pub fn add_labels(resources: &mut ResourceSet, labels: &BTreeMap<String, String>) {
    if labels.is_empty() {
        return;
    }
    for (key, value) in resources.iter_mut() {
        merge_strings(ensure_map(value, &["metadata", "labels"]), labels);

        let kind = key.kind.as_str();
        if WORKLOADS.contains(&kind) {
            merge_strings(ensure_map(value, &["spec", "selector", "matchLabels"]), labels);
            merge_strings(
                ensure_map(value, &["spec", "template", "metadata", "labels"]),
                labels,
            );
        } else if kind == "Job" {
            merge_strings(
                ensure_map(value, &["spec", "template", "metadata", "labels"]),
                labels,
            );
        } else if kind == "CronJob" {
            merge_strings(
                ensure_map(
                    value,
                    &["spec", "jobTemplate", "spec", "template", "metadata", "labels"],
                ),
                labels,
            );
        } else if kind == "Service" {
            merge_strings(ensure_map(value, &["spec", "selector"]), labels);
        }
    }
}

/// Add annotations to metadata and pod templates
pub fn add_annotations(resources: &mut ResourceSet, annotations: &BTreeMap<String, String>) {
    if annotations.is_empty() {
        return;
    }
    for (key, value) in resources.iter_mut() {
        merge_strings(ensure_map(value, &["metadata", "annotations"]), annotations);

        let kind = key.kind.as_str();
        if WORKLOADS.contains(&kind) || kind == "Job" {
            merge_strings(
                ensure_map(value, &["spec", "template", "metadata", "annotations"]),
                annotations,
            );
        } else if kind == "CronJob" {
            merge_strings(
                ensure_map(
                    value,
                    &["spec", "jobTemplate", "spec", "template", "metadata", "annotations"],
                ),
                annotations,
            );
        }
    }
}

/// The mapping at `path`, creating (or overwriting non-mapping) entries on the way
fn ensure_map<'a>(value: &'a mut Value, path: &[&str]) -> Option<&'a mut Mapping> {
    if !value.is_mapping() {
        *value = Value::Mapping(Mapping::new());
    }
    let map = value.as_mapping_mut()?;
    match path.split_first() {
        None => Some(map),
        Some((first, rest)) => {
            let entry = map
                .entry(Value::String((*first).to_string()))
                .or_insert_with(|| Value::Mapping(Mapping::new()));
            ensure_map(entry, rest)
        }
    }
}

fn insert_str(map: &mut Mapping, key: &str, value: &str) {
    map.insert(
        Value::String(key.to_string()),
        Value::String(value.to_string()),
    );
}

fn merge_strings(map: Option<&mut Mapping>, entries: &BTreeMap<String, String>) {
    if let Some(map) = map {
        for (key, value) in entries {
            insert_str(map, key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::resource::{ResourceDoc, ResourceKey};
    use std::path::Path;

    fn set(docs: &[&str]) -> ResourceSet {
        ResourceSet::from_docs(docs.iter().map(|text| {
            let value: Value = serde_yaml::from_str(text).unwrap();
            ResourceDoc::from_value(value, Path::new("test.yaml")).unwrap()
        }))
        .unwrap()
    }

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    const DEPLOYMENT: &str = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n\
                              spec:\n  selector:\n    matchLabels:\n      app: web\n  template:\n    metadata:\n      labels:\n        app: web\n";

    #[test]
    fn test_namespace_skips_cluster_scoped() {
        let mut resources = set(&[
            DEPLOYMENT,
            "apiVersion: rbac.authorization.k8s.io/v1\nkind: ClusterRole\nmetadata:\n  name: reader\n",
        ]);
        set_namespace(&mut resources, "web-prd");

        let deployment = resources
            .get(&ResourceKey::new("apps", "Deployment", "web"))
            .unwrap();
        assert_eq!(deployment["metadata"]["namespace"].as_str(), Some("web-prd"));

        let role = resources
            .get(&ResourceKey::new("rbac.authorization.k8s.io", "ClusterRole", "reader"))
            .unwrap();
        assert!(role["metadata"].get("namespace").is_none());
    }

    #[test]
    fn test_namespace_updates_service_account_subjects() {
        let mut resources = set(&[
            "apiVersion: rbac.authorization.k8s.io/v1\nkind: RoleBinding\nmetadata:\n  name: web\n\
             subjects:\n- kind: ServiceAccount\n  name: web\n- kind: User\n  name: jane\n",
        ]);
        set_namespace(&mut resources, "web-acc");
        let binding = resources
            .get(&ResourceKey::new("rbac.authorization.k8s.io", "RoleBinding", "web"))
            .unwrap();
        assert_eq!(binding["subjects"][0]["namespace"].as_str(), Some("web-acc"));
        assert!(binding["subjects"][1].get("namespace").is_none());
    }

    #[test]
    fn test_labels_reach_selectors_and_templates() {
        let mut resources = set(&[
            DEPLOYMENT,
            "apiVersion: v1\nkind: Service\nmetadata:\n  name: web\nspec:\n  selector:\n    app: web\n",
        ]);
        add_labels(&mut resources, &labels(&[("env", "acc")]));

        let deployment = resources
            .get(&ResourceKey::new("apps", "Deployment", "web"))
            .unwrap();
        assert_eq!(deployment["metadata"]["labels"]["env"].as_str(), Some("acc"));
        assert_eq!(deployment["spec"]["selector"]["matchLabels"]["env"].as_str(), Some("acc"));
        assert_eq!(deployment["spec"]["selector"]["matchLabels"]["app"].as_str(), Some("web"));
        assert_eq!(
            deployment["spec"]["template"]["metadata"]["labels"]["env"].as_str(),
            Some("acc")
        );

        let service = resources.get(&ResourceKey::new("", "Service", "web")).unwrap();
        assert_eq!(service["spec"]["selector"]["env"].as_str(), Some("acc"));
    }

    #[test]
    fn test_annotations_reach_templates() {
        let mut resources = set(&[DEPLOYMENT]);
        add_annotations(&mut resources, &labels(&[("team", "platform")]));
        let deployment = resources
            .get(&ResourceKey::new("apps", "Deployment", "web"))
            .unwrap();
        assert_eq!(deployment["metadata"]["annotations"]["team"].as_str(), Some("platform"));
        assert_eq!(
            deployment["spec"]["template"]["metadata"]["annotations"]["team"].as_str(),
            Some("platform")
        );
        assert!(deployment["spec"]["selector"].get("annotations").is_none());
    }
}
