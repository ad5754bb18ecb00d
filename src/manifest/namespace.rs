//! The Namespace object every target deploys into

use std::path::Path;

use serde::Serialize;

use super::resource::ResourceDoc;
use crate::error::{self, Result};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Namespace<'a> {
    api_version: &'static str,
    kind: &'static str,
    metadata: Metadata<'a>,
}

#[derive(Serialize)]
struct Metadata<'a> {
    name: &'a str,
}

/// A `v1/Namespace` resource named `name`
pub fn namespace_document(name: &str) -> Result<ResourceDoc> {
    let value = serde_yaml::to_value(Namespace {
        api_version: "v1",
        kind: "Namespace",
        metadata: Metadata { name },
    })
    .map_err(|e| error::compose::serialization_failed(e.to_string()))?;

    ResourceDoc::from_value(value, Path::new("namespace"))
}
