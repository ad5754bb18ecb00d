//! File contents written by `kd init`

use super::{Environment, FoundApp, Project};
use crate::config::LATEST_VERSION;

pub fn config(project: &Project) -> String {
    let mut apps = String::from("apps:");
    if project.apps.is_empty() {
        apps.push_str(" []\n");
    } else {
        apps.push('\n');
        for app in &project.apps {
            apps.push_str(&format!("- name: {}\n  path: {}\n", app.name, app.path));
        }
    }

    let mut targets = String::new();
    for env in Environment::ALL {
        if !targets.is_empty() {
            targets.push('\n');
        }
        targets.push_str(&format!(
            "- name: {name}\n  alias: {alias}\n  context: {context}\n  namespace: {namespace}\n  path: config/deploy/{name}\n",
            name = env.name(),
            alias = env.alias(),
            context = project.context,
            namespace = env.namespace(&project.customer),
        ));
    }

    format!(
        "# Check version compatibility with kd
version: {LATEST_VERSION}

# Private docker registry to push images to
registry: {registry}

# List of apps to build
{apps}
# List of available deployment targets
targets:
{targets}",
        registry = project.registry,
    )
}

pub fn base_kustomization() -> String {
    "# List of base resources
resources:
- deployment.yaml
- service.yaml
- ingress.yaml
"
    .to_string()
}

pub fn env_kustomization() -> String {
    "# List of patches to apply (in order) for this environment
patches:
- deployment.yaml
- ingress.yaml

# Patches are applied to base resources
resources:
- ../_base
"
    .to_string()
}

pub fn base_service(app: &FoundApp) -> String {
    format!(
        "# Service defines the common entrypoint for multiple application pods
apiVersion: v1
kind: Service
metadata:
  name: {name}
  labels:
    app: {name}

spec:
  type: NodePort
  ports:
  - port: 80
    name: http
  selector:
    app: {name}
",
        name = app.name
    )
}

pub fn base_ingress(app: &FoundApp) -> String {
    format!(
        "# Defines a cloud load balancer for HTTP + HTTPS
apiVersion: networking.k8s.io/v1
kind: Ingress
metadata:
  name: ingress
  annotations:
    cert-manager.io/cluster-issuer: \"letsencrypt-prod\"
    acme.cert-manager.io/http01-edit-in-place: \"true\"
    kubernetes.io/ingress.class: \"gce\"
    kubernetes.io/ingress.allow-http: \"true\"

spec:
  defaultBackend:
    service:
      name: {name}
      port:
        number: 80
",
        name = app.name
    )
}

pub fn env_ingress(app: &FoundApp, env: Environment, customer: &str) -> String {
    let host_prefix = match env {
        Environment::Acceptance => "acceptance.",
        Environment::Production => "",
    };
    format!(
        "# Defines a cloud load balancer for HTTP + HTTPS
apiVersion: networking.k8s.io/v1
kind: Ingress
metadata:
  name: ingress
  annotations:
    kubernetes.io/ingress.global-static-ip-name: {namespace}

spec:
  tls:
  - secretName: {name}-tls
    hosts:
    # Replace this with the actual {env_name} hostnames of this application.
    - {host_prefix}{name}.example.com
",
        name = app.name,
        namespace = env.namespace(customer),
        env_name = env.name(),
    )
}

pub fn base_deployment(app: &FoundApp) -> String {
    format!(
        "# Defines an app consisting of one or more identical pods
apiVersion: apps/v1
kind: Deployment
metadata:
  name: {name}

spec:
  selector:
    matchLabels:
      app: {name}

  revisionHistoryLimit: 5
  minReadySeconds: 5

  strategy:
    rollingUpdate:
      maxSurge: 1
      maxUnavailable: 0

  template:
    metadata:
      labels:
        app: {name}

    spec:
      containers:
      - name: {name}

        # Replaced on deploy by the digest of the most recently pushed image.
        image: {name}

        ports:
        - containerPort: 80
          name: http

        env:
        - name: PORT
          value: \"80\"

        readinessProbe:
          httpGet:
            path: /healthz
            port: 80
          initialDelaySeconds: 2
          periodSeconds: 5
          timeoutSeconds: 1
",
        name = app.name
    )
}

pub fn env_deployment(app: &FoundApp, env: Environment) -> String {
    let (cpu_request, memory_request) = match env {
        Environment::Acceptance => ("0m", "0Mi"),
        Environment::Production => ("100m", "250Mi"),
    };
    format!(
        "# Defines an app consisting of one or more identical pods
apiVersion: apps/v1
kind: Deployment
metadata:
  name: {name}

spec:
  replicas: {replicas}

  template:
    spec:
      containers:
      - name: {name}

        # Environment variables specific to {env_name}.
        env:
        - name: RACK_ENV
          value: {env_name}

        resources:
          requests:
            cpu: {cpu_request}
            memory: {memory_request}
          limits:
            cpu: 500m
            memory: 500Mi
",
        name = app.name,
        replicas = env.replicas(),
        env_name = env.name(),
    )
}
