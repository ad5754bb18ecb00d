//! Build operation: pre-build hook, image build, push, post-build hook

use std::path::Path;

use super::Toolbox;
use crate::cli::BuildArgs;
use crate::config::ResolvedApp;
use crate::error::{HookStage, Result};
use crate::git;
use crate::ui::Logger;

/// Options for building
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Registry cache tag; derived from the git branch when unset
    pub cache_tag: Option<String>,
}

impl From<&BuildArgs> for BuildOptions {
    fn from(args: &BuildArgs) -> Self {
        Self {
            cache_tag: args.cache_tag.clone(),
        }
    }
}

/// Builds and pushes app images
pub struct BuildOperation<'a> {
    root: &'a Path,
    tools: &'a Toolbox<'a>,
    log: &'a Logger,
}

impl<'a> BuildOperation<'a> {
    pub fn new(root: &'a Path, tools: &'a Toolbox<'a>, log: &'a Logger) -> Self {
        Self { root, tools, log }
    }

    /// Build every app in order, stopping at the first failure
    pub fn execute(&self, apps: &[ResolvedApp], options: &BuildOptions) -> Result<Vec<String>> {
        apps.iter()
            .map(|app| self.build_app(app, options))
            .collect()
    }

    /// Build and push one app, returning the pushed digest
    pub fn build_app(&self, app: &ResolvedApp, options: &BuildOptions) -> Result<String> {
        if let Some(command) = non_empty(&app.app.pre_build) {
            if command.contains("/.ssh") {
                self.log
                    .warn("Pre-build command in 'kdeploy.conf' contains reference to '.ssh'.");
                self.log
                    .warn("Please use SSH agent forwarding through SSH_AUTH_SOCK instead.");
            }
            self.tools
                .hooks
                .run_hook(HookStage::PreBuild, command, self.root, self.log)?;
        }

        let cache_tag = git::cache_tag(
            &self.root.join(&app.app.root),
            options.cache_tag.as_deref(),
        );
        self.log.note(format!("Building {}", app.name()));
        self.log.debug(format!("Using build cache tag {cache_tag}"));
        self.tools.builder.build(app, &cache_tag, self.log)?;

        self.log
            .note(format!("Pushing {}:{}", app.name(), app.tag));
        let digest = self.tools.pusher.push(app, self.log)?;

        if let Some(command) = non_empty(&app.app.post_build) {
            self.tools
                .hooks
                .run_hook(HookStage::PostBuild, command, self.root, self.log)?;
        }

        self.log
            .success(format!("Successfully built {}", app.repository()));
        Ok(digest)
    }
}

fn non_empty(command: &Option<String>) -> Option<&str> {
    command.as_deref().filter(|command| !command.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::App;
    use crate::error::KdError;
    use crate::operations::fakes::Fakes;
    use crate::ui::Level;

    fn app(pre_build: Option<&str>, post_build: Option<&str>) -> ResolvedApp {
        ResolvedApp {
            app: App {
                name: "web".to_string(),
                path: ".".to_string(),
                root: ".".to_string(),
                platform: "linux/amd64".to_string(),
                pre_build: pre_build.map(str::to_string),
                post_build: post_build.map(str::to_string),
                ..App::default()
            },
            tag: "v1".to_string(),
            registry: "eu.gcr.io/p".to_string(),
        }
    }

    fn options() -> BuildOptions {
        BuildOptions {
            cache_tag: Some("ci".to_string()),
        }
    }

    #[test]
    fn test_build_runs_steps_in_order() {
        let fakes = Fakes::new();
        let (log, _) = Logger::capturing(Level::Info);
        let tools = fakes.toolbox();
        let operation = BuildOperation::new(Path::new("."), &tools, &log);

        let digest = operation
            .build_app(&app(Some("make assets"), Some("make clean")), &options())
            .unwrap();

        assert_eq!(digest, "sha256:pushed");
        assert_eq!(
            fakes.calls(),
            [
                "hook Pre-build make assets",
                "build eu.gcr.io/p/web:v1 cache=ci",
                "push eu.gcr.io/p/web:v1",
                "hook Post-build make clean",
            ]
        );
    }

    #[test]
    fn test_pre_build_failure_stops_build() {
        let fakes = Fakes::new();
        fakes.fail_on("hook Pre-build");
        let (log, _) = Logger::capturing(Level::Info);
        let tools = fakes.toolbox();
        let operation = BuildOperation::new(Path::new("."), &tools, &log);

        let err = operation
            .build_app(&app(Some("false"), None), &options())
            .unwrap_err();
        assert!(matches!(
            err,
            KdError::HookFailed {
                stage: HookStage::PreBuild,
                ..
            }
        ));
        assert_eq!(fakes.calls(), ["hook Pre-build false"]);
    }

    #[test]
    fn test_push_failure_skips_post_build() {
        let fakes = Fakes::new();
        fakes.fail_on("push");
        let (log, _) = Logger::capturing(Level::Info);
        let tools = fakes.toolbox();
        let operation = BuildOperation::new(Path::new("."), &tools, &log);

        assert!(
            operation
                .build_app(&app(None, Some("make clean")), &options())
                .is_err()
        );
        assert!(!fakes.calls().iter().any(|call| call.starts_with("hook")));
    }

    #[test]
    fn test_ssh_reference_in_pre_build_warns() {
        let fakes = Fakes::new();
        let (log, buffer) = Logger::capturing(Level::Info);
        let tools = fakes.toolbox();
        let operation = BuildOperation::new(Path::new("."), &tools, &log);

        operation
            .build_app(&app(Some("cp ~/.ssh/id_rsa ."), None), &options())
            .unwrap();
        let logged = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("contains reference to '.ssh'"));
    }

    #[test]
    fn test_execute_stops_at_first_failing_app() {
        let fakes = Fakes::new();
        fakes.fail_on("build eu.gcr.io/p/api");
        let (log, _) = Logger::capturing(Level::Info);
        let tools = fakes.toolbox();
        let operation = BuildOperation::new(Path::new("."), &tools, &log);

        let mut api = app(None, None);
        api.app.name = "api".to_string();
        let web = app(None, None);

        assert!(operation.execute(&[api, web], &options()).is_err());
        assert_eq!(fakes.calls(), ["build eu.gcr.io/p/api:v1 cache=ci"]);
    }
}
