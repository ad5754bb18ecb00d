//! In-process build of kustomization directories
//!
//! Supports the subset of kustomize that kd overlays use: resources and bases,
//! strategic merge patches, namespace, common labels and annotations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use normpath::PathExt;
use serde::Deserialize;
use serde_yaml::Value;

use super::OverlayBuilder;
use super::patch;
use super::resource::{self, ResourceDoc, ResourceKey, ResourceSet};
use super::transform;
use crate::error::{self, KdError, Result};

/// File names recognized as a kustomization, in lookup order
pub const KUSTOMIZATION_FILES: [&str; 3] =
    ["kustomization.yaml", "kustomization.yml", "Kustomization"];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Kustomization {
    #[serde(default)]
    api_version: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    resources: Vec<String>,
    #[serde(default)]
    bases: Vec<String>,
    #[serde(default)]
    patches: Vec<PatchEntry>,
    #[serde(default)]
    patches_strategic_merge: Vec<String>,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    common_labels: BTreeMap<String, String>,
    #[serde(default)]
    common_annotations: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PatchEntry {
    Path(String),
    Spec(PatchSpec),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PatchSpec {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    patch: Option<String>,
    #[serde(default)]
    target: Option<Selector>,
}

/// Resources a patch applies to; unset fields match anything
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Selector {
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    label_selector: Option<String>,
    #[serde(default)]
    annotation_selector: Option<String>,
}

impl Selector {
    fn matches(&self, key: &ResourceKey, value: &Value) -> bool {
        let api_version = value.get("apiVersion").and_then(Value::as_str).unwrap_or("");
        let version = api_version.rsplit('/').next().unwrap_or(api_version);
        let metadata = value.get("metadata");
        let namespace = metadata
            .and_then(|m| m.get("namespace"))
            .and_then(Value::as_str)
            .unwrap_or("");

        matches_opt(&self.group, &key.group)
            && matches_opt(&self.version, version)
            && matches_opt(&self.kind, &key.kind)
            && matches_opt(&self.name, &key.name)
            && matches_opt(&self.namespace, namespace)
            && matches_pairs(&self.label_selector, metadata.and_then(|m| m.get("labels")))
            && matches_pairs(
                &self.annotation_selector,
                metadata.and_then(|m| m.get("annotations")),
            )
    }
}

fn matches_opt(expected: &Option<String>, actual: &str) -> bool {
    expected.as_deref().is_none_or(|expected| expected == actual)
}

/// `key=value,other=value` equality selectors against a string map
fn matches_pairs(selector: &Option<String>, map: Option<&Value>) -> bool {
    let Some(selector) = selector.as_deref() else {
        return true;
    };
    selector
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .all(|term| {
            let (key, expected) = term.split_once('=').unwrap_or((term, ""));
            let actual = map.and_then(|m| m.get(key.trim())).and_then(Value::as_str);
            match actual {
                Some(actual) => expected.is_empty() || actual == expected.trim_start_matches('='),
                None => false,
            }
        })
}

/// Builds overlays from kustomization files on disk
#[derive(Debug, Default)]
pub struct KustomizeBuilder;

impl OverlayBuilder for KustomizeBuilder {
    fn build(&self, overlay_dir: &Path) -> Result<Vec<ResourceDoc>> {
        let mut visiting = Vec::new();
        build_dir(overlay_dir, &mut visiting).map(ResourceSet::into_docs)
    }
}

fn build_dir(dir: &Path, visiting: &mut Vec<PathBuf>) -> Result<ResourceSet> {
    let canonical = dir
        .normalize()
        .map(|path| path.into_path_buf())
        .map_err(|_| error::compose::directory_not_found(dir))?;
    if visiting.contains(&canonical) {
        return Err(error::compose::failed(dir, "cycle in kustomization resources"));
    }
    visiting.push(canonical);

    let kustomization = load(dir)?;
    if let Some(kind) = kustomization.kind.as_deref() {
        if kind != "Kustomization" {
            return Err(error::compose::failed(
                dir,
                format!("unsupported kind '{kind}', expected 'Kustomization'"),
            ));
        }
    }
    if let Some(api_version) = kustomization.api_version.as_deref() {
        if !api_version.starts_with("kustomize.config.k8s.io/") {
            return Err(error::compose::failed(
                dir,
                format!("unsupported apiVersion '{api_version}'"),
            ));
        }
    }

    let mut resources = ResourceSet::new();
    for entry in kustomization.bases.iter().chain(&kustomization.resources) {
        let path = dir.join(entry);
        if path.is_dir() {
            resources.absorb(build_dir(&path, visiting)?)?;
        } else if path.is_file() {
            for doc in resource::read_documents(&path)? {
                resources.insert(doc)?;
            }
        } else {
            return Err(error::compose::failed(
                dir,
                format!("resource '{entry}' not found"),
            ));
        }
    }

    for entry in &kustomization.patches_strategic_merge {
        let documents = read_patch(dir, entry)?;
        for patch_doc in documents {
            apply_patch(dir, &mut resources, &patch_doc, None)?;
        }
    }

    for entry in &kustomization.patches {
        let (documents, target) = match entry {
            PatchEntry::Path(path) => (read_patch_file(dir, path)?, None),
            PatchEntry::Spec(spec) => {
                let documents = match (&spec.path, &spec.patch) {
                    (Some(path), None) => read_patch_file(dir, path)?,
                    (None, Some(inline)) => parse_patch(dir, inline)?,
                    _ => {
                        return Err(error::compose::failed(
                            dir,
                            "a patch needs exactly one of 'path' or 'patch'",
                        ));
                    }
                };
                (documents, spec.target.as_ref())
            }
        };
        for patch_doc in documents {
            apply_patch(dir, &mut resources, &patch_doc, target)?;
        }
    }

    if let Some(namespace) = kustomization.namespace.as_deref() {
        transform::set_namespace(&mut resources, namespace);
    }
    transform::add_labels(&mut resources, &kustomization.common_labels);
    transform::add_annotations(&mut resources, &kustomization.common_annotations);

    visiting.pop();
    Ok(resources)
}

fn load(dir: &Path) -> Result<Kustomization> {
    let Some(path) = KUSTOMIZATION_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
    else {
        return Err(error::compose::failed(dir, "no kustomization file found"));
    };

    let text = std::fs::read_to_string(&path).map_err(|e| KdError::IoError {
        message: format!("Failed to read {}: {}", path.display(), e),
    })?;
    if text.trim().is_empty() {
        return Ok(Kustomization::default());
    }
    serde_yaml::from_str(&text).map_err(|e| error::compose::failed(&path, e.to_string()))
}

/// A `patchesStrategicMerge` entry is a file path or inline YAML
fn read_patch(dir: &Path, entry: &str) -> Result<Vec<Value>> {
    if dir.join(entry).is_file() {
        read_patch_file(dir, entry)
    } else if entry.contains('\n') || entry.contains(": ") {
        parse_patch(dir, entry)
    } else {
        Err(error::compose::failed(
            dir,
            format!("patch '{entry}' not found"),
        ))
    }
}

fn read_patch_file(dir: &Path, entry: &str) -> Result<Vec<Value>> {
    let path = dir.join(entry);
    let text = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            error::compose::failed(dir, format!("patch '{entry}' not found"))
        }
        _ => KdError::IoError {
            message: format!("Failed to read {}: {}", path.display(), e),
        },
    })?;
    parse_patch(&path, &text)
}

fn parse_patch(origin: &Path, text: &str) -> Result<Vec<Value>> {
    let documents = resource::parse_documents(text, origin)?;
    if documents.iter().any(Value::is_sequence) {
        return Err(error::compose::failed(
            origin,
            "JSON6902 patches are not supported, use a strategic merge patch",
        ));
    }
    Ok(documents)
}

fn apply_patch(
    dir: &Path,
    resources: &mut ResourceSet,
    patch_doc: &Value,
    target: Option<&Selector>,
) -> Result<()> {
    let keys: Vec<ResourceKey> = match target {
        Some(selector) => resources
            .iter()
            .filter(|(key, value)| selector.matches(key, value))
            .map(|(key, _)| key.clone())
            .collect(),
        None => {
            let key = ResourceKey::of(patch_doc).ok_or_else(|| {
                error::compose::failed(dir, "patch without kind or metadata.name")
            })?;
            vec![key]
        }
    };

    let missing = keys.is_empty() || keys.iter().any(|key| resources.get(key).is_none());
    if missing {
        let description = match ResourceKey::of(patch_doc) {
            Some(key) if target.is_none() => key.to_string(),
            _ => "target".to_string(),
        };
        return Err(error::compose::failed(
            dir,
            format!("patch {description} matches no resource"),
        ));
    }

    for key in keys {
        if patch::is_delete(patch_doc) {
            resources.remove(&key);
        } else if let Some(resource) = resources.get_mut(&key) {
            let mut doc = patch_doc.clone();
            if target.is_some() {
                retarget(&mut doc, &key);
            }
            patch::merge(resource, &doc);
        }
    }
    Ok(())
}

/// Drop the identity fields of a targeted patch so it cannot rename its targets
fn retarget(patch_doc: &mut Value, key: &ResourceKey) {
    if let Value::Mapping(map) = patch_doc {
        map.remove("apiVersion");
        map.remove("kind");
        if let Some(Value::Mapping(metadata)) = map.get_mut("metadata") {
            metadata.insert(
                Value::String("name".to_string()),
                Value::String(key.name.clone()),
            );
        }
    }
}
