//! Cloud CDN cache invalidation through the gcloud CLI

use super::CdnInvalidator;
use super::exec::Invocation;
use crate::error::Result;
use crate::ui::Logger;

const GCLOUD: &str = "gcloud";

#[derive(Debug, Default)]
pub struct Gcloud;

impl CdnInvalidator for Gcloud {
    fn cdn_enabled(&self, project: &str, backend: &str, log: &Logger) -> Result<bool> {
        let captured = describe_backend_invocation(project, backend).capture(log)?;
        Ok(captured.stdout.contains("enableCDN: true"))
    }

    fn invalidate(&self, project: &str, url_map: &str, log: &Logger) -> Result<()> {
        invalidate_invocation(project, url_map).run(log)
    }
}

pub fn describe_backend_invocation(project: &str, backend: &str) -> Invocation {
    Invocation::new(GCLOUD)
        .args(["compute", "backend-services", "describe", backend, "--global"])
        .args(["--project", project])
}

/// Asynchronous invalidation of every path behind a URL map
pub fn invalidate_invocation(project: &str, url_map: &str) -> Invocation {
    Invocation::new(GCLOUD)
        .args(["compute", "url-maps", "invalidate-cdn-cache", url_map, "--global"])
        .args(["--path", "/*", "--async", "--quiet", "--no-user-output-enabled"])
        .args(["--project", project])
}
