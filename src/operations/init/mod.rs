//! Init operation: scaffold `kdeploy.conf` and manifests for a new workspace
//!
//! Apps are discovered by their `Dockerfile`. Every app gets a `_base`
//! directory plus `acceptance` and `production` overlays, matching the
//! targets written to the configuration.

mod templates;

use std::path::{Path, PathBuf};

use inquire::{Select, Text};
use normpath::PathExt;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::cli::InitArgs;
use crate::config::CONFIG_NAME;
use crate::error::{self, KdError, Result};
use crate::manifest::BASE_DIR;
use crate::ui::Logger;

/// Options for scaffolding; prompts are shown for every missing value
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    pub namespace: Option<String>,
    pub registry: Option<String>,
    pub context: Option<String>,
}

impl From<&InitArgs> for InitOptions {
    fn from(args: &InitArgs) -> Self {
        Self {
            namespace: args.namespace.clone(),
            registry: args.registry.clone(),
            context: args.context.clone(),
        }
    }
}

/// An app found by its Dockerfile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundApp {
    pub name: String,
    /// Relative to the workspace root, `.` for the root itself
    pub path: String,
}

/// Everything needed to render the scaffold
#[derive(Debug, Clone)]
pub struct Project {
    pub customer: String,
    pub registry: String,
    pub context: String,
    pub apps: Vec<FoundApp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Acceptance,
    Production,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Acceptance, Environment::Production];

    pub fn name(self) -> &'static str {
        match self {
            Environment::Acceptance => "acceptance",
            Environment::Production => "production",
        }
    }

    pub fn alias(self) -> &'static str {
        match self {
            Environment::Acceptance => "acc",
            Environment::Production => "prd",
        }
    }

    pub fn namespace(self, customer: &str) -> String {
        format!("{customer}-{}", self.alias())
    }

    pub fn replicas(self) -> u32 {
        match self {
            Environment::Acceptance => 1,
            Environment::Production => 2,
        }
    }
}

/// Writes an initial configuration into a workspace
pub struct InitOperation<'a> {
    root: &'a Path,
    log: &'a Logger,
}

impl<'a> InitOperation<'a> {
    pub fn new(root: &'a Path, log: &'a Logger) -> Self {
        Self { root, log }
    }

    pub fn execute(&self, options: &InitOptions) -> Result<()> {
        let config_path = self.root.join(CONFIG_NAME);
        if config_path.exists() {
            return Err(error::config::invalid(format!(
                "{} already exists, refusing to overwrite it",
                config_path.display()
            )));
        }

        let apps = find_apps(self.root);
        if apps.is_empty() {
            self.log
                .warn("Could not find any apps; are you missing a Dockerfile?");
            self.log
                .warn("Create a Dockerfile and rerun init to configure your app");
        }

        let project = self.request_details(options, apps)?;
        self.write(&project)?;

        if project.apps.is_empty() {
            self.log
                .success("Created example configuration without any apps");
        } else {
            let names: Vec<&str> = project.apps.iter().map(|app| app.name.as_str()).collect();
            self.log.success(format!(
                "Created example configuration for {}",
                names.join(", ")
            ));
        }
        self.log.note("Next:  1. Review and adjust configuration");
        self.log.note("       2. Make sure your apps log to stdout/stderr");
        self.log
            .note("       3. Let your apps respond to health checks at /healthz");
        self.log.note("       4. Use kd to build and deploy");
        Ok(())
    }

    fn request_details(&self, options: &InitOptions, apps: Vec<FoundApp>) -> Result<Project> {
        let interactive = options.namespace.is_none()
            || options.registry.is_none()
            || options.context.is_none();
        if interactive {
            self.log.note("Enter a few project details");
        }

        let customer = match &options.namespace {
            Some(namespace) => namespace.clone(),
            None => Text::new("Namespace (e.g. customer name):")
                .with_validator(inquire::required!("A namespace is required"))
                .prompt()?,
        };
        let customer = slugify(&customer);
        if customer.is_empty() {
            return Err(error::config::invalid(
                "namespace must contain letters or digits",
            ));
        }

        let registry = match &options.registry {
            Some(registry) => registry.clone(),
            None => Text::new("Container registry:")
                .with_default(&format!("eu.gcr.io/my-project/{customer}"))
                .prompt()?,
        };

        let context = match &options.context {
            Some(context) => context.clone(),
            None => {
                let contexts = kube_contexts(self.log);
                if contexts.is_empty() {
                    Text::new("Kubernetes cluster context:")
                        .with_validator(inquire::required!("A context is required"))
                        .prompt()?
                } else {
                    Select::new("Select Kubernetes cluster context:", contexts).prompt()?
                }
            }
        };

        Ok(Project {
            customer,
            registry: registry.trim().trim_end_matches('/').to_string(),
            context: context.trim().to_string(),
            apps,
        })
    }

    fn write(&self, project: &Project) -> Result<()> {
        write_file(&self.root.join(CONFIG_NAME), &templates::config(project))?;

        for app in &project.apps {
            let deploy_dir = self.root.join(&app.path).join("config").join("deploy");
            let base_dir = deploy_dir.join(BASE_DIR);
            write_file(&base_dir.join("kustomization.yaml"), &templates::base_kustomization())?;
            write_file(&base_dir.join("service.yaml"), &templates::base_service(app))?;
            write_file(&base_dir.join("ingress.yaml"), &templates::base_ingress(app))?;
            write_file(&base_dir.join("deployment.yaml"), &templates::base_deployment(app))?;

            for env in Environment::ALL {
                let env_dir = deploy_dir.join(env.name());
                write_file(&env_dir.join("kustomization.yaml"), &templates::env_kustomization())?;
                write_file(
                    &env_dir.join("ingress.yaml"),
                    &templates::env_ingress(app, env, &project.customer),
                )?;
                write_file(
                    &env_dir.join("deployment.yaml"),
                    &templates::env_deployment(app, env),
                )?;
            }
        }
        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|e| KdError::IoError {
        message: format!("Failed to write {}: {}", path.display(), e),
    })
}

/// Directories containing a `Dockerfile`, skipping hidden directories
pub fn find_apps(root: &Path) -> Vec<FoundApp> {
    let root: PathBuf = root
        .normalize()
        .map(|path| path.into_path_buf())
        .unwrap_or_else(|_| root.to_path_buf());

    WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == "Dockerfile")
        .filter_map(|entry| {
            let dir = entry.path().parent()?;
            let name = slugify(&dir.file_name()?.to_string_lossy());
            let relative = dir.strip_prefix(&root).ok()?;
            let path = if relative.as_os_str().is_empty() {
                ".".to_string()
            } else {
                relative.to_string_lossy().replace('\\', "/")
            };
            (!name.is_empty()).then_some(FoundApp { name, path })
        })
        .collect()
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

#[derive(Deserialize)]
struct KubeConfig {
    #[serde(default)]
    contexts: Vec<NamedContext>,
}

#[derive(Deserialize)]
struct NamedContext {
    name: String,
}

/// Context names from `~/.kube/config`, empty when it cannot be read
fn kube_contexts(log: &Logger) -> Vec<String> {
    let Some(path) = dirs::home_dir().map(|home| home.join(".kube").join("config")) else {
        return Vec::new();
    };
    match std::fs::read_to_string(&path) {
        Ok(text) => parse_contexts(&text),
        Err(e) => {
            log.debug(format!("Cannot read {}: {}", path.display(), e));
            Vec::new()
        }
    }
}

fn parse_contexts(text: &str) -> Vec<String> {
    let mut names: Vec<String> = serde_yaml::from_str::<KubeConfig>(text)
        .map(|config| config.contexts.into_iter().map(|c| c.name).collect())
        .unwrap_or_default();
    names.sort();
    names
}

/// Lowercase, with runs of other characters collapsed to single dashes
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
