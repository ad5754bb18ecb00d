//! Resolving app and target selectors against the configuration
//!
//! App selectors have the form `name` or `name:tag`. An empty name selects
//! the default app. Duplicate names are not rejected by the loader; the
//! first configured match wins.

use super::types::{App, Config, DEFAULT_TAG, ResolvedApp, ResolvedTarget};
use crate::error::{self, KdError, Result};

impl Config {
    /// Resolve one app selector, optionally with an explicit tag
    pub fn resolve_app(&self, selector: &str, explicit_tag: &str) -> Result<ResolvedApp> {
        let (name, embedded_tag) = match selector.split_once(':') {
            Some((name, tag)) => (name, tag),
            None => (selector, ""),
        };

        if !embedded_tag.is_empty() && !explicit_tag.is_empty() {
            return Err(error::selection::conflicting_tag(embedded_tag, explicit_tag));
        }

        let tag = [explicit_tag, embedded_tag]
            .into_iter()
            .find(|tag| !tag.is_empty())
            .unwrap_or(DEFAULT_TAG);

        let app = if name.is_empty() {
            self.default_app()?
        } else {
            self.apps
                .iter()
                .find(|app| app.name == name)
                .ok_or_else(|| error::selection::unknown_app(name))?
        };

        Ok(ResolvedApp {
            app: app.clone(),
            tag: tag.to_string(),
            registry: self.registry.clone(),
        })
    }

    /// Resolve several selectors in order; no selectors selects the default app
    pub fn resolve_apps<S: AsRef<str>>(
        &self,
        selectors: &[S],
        explicit_tag: &str,
    ) -> Result<Vec<ResolvedApp>> {
        if selectors.is_empty() {
            return Ok(vec![self.resolve_app("", explicit_tag)?]);
        }

        selectors
            .iter()
            .map(|selector| self.resolve_app(selector.as_ref(), explicit_tag))
            .collect()
    }

    /// Every configured app with the given tag (or the default tag)
    pub fn resolve_all_apps(&self, explicit_tag: &str) -> Vec<ResolvedApp> {
        let tag = if explicit_tag.is_empty() {
            DEFAULT_TAG
        } else {
            explicit_tag
        };

        self.apps
            .iter()
            .map(|app| ResolvedApp {
                app: app.clone(),
                tag: tag.to_string(),
                registry: self.registry.clone(),
            })
            .collect()
    }

    /// Resolve a target by name or alias
    pub fn resolve_target(&self, selector: &str) -> Result<ResolvedTarget> {
        self.targets
            .iter()
            .find(|target| target.matches(selector))
            .map(|target| ResolvedTarget {
                target: target.clone(),
            })
            .ok_or_else(|| error::selection::unknown_target(selector))
    }

    fn default_app(&self) -> Result<&App> {
        if let Some(app) = self.apps.iter().find(|app| app.default) {
            return Ok(app);
        }

        match self.apps.as_slice() {
            [] => Err(KdError::NoAppsConfigured),
            [only] => Ok(only),
            apps => Err(KdError::AmbiguousDefault { count: apps.len() }),
        }
    }
}
