use clap::Parser;

/// Arguments for the init command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Answer the questions interactively:\n    kd init\n\n\
                  Without prompts:\n    \
                  kd init --namespace acme --registry eu.gcr.io/acme-prj/acme --context gke_acme-prj_europe-west1_main")]
pub struct InitArgs {
    /// Namespace prefix, usually the customer name
    #[arg(long)]
    pub namespace: Option<String>,

    /// Container registry to push images to
    #[arg(long)]
    pub registry: Option<String>,

    /// Kubernetes cluster context
    #[arg(long)]
    pub context: Option<String>,
}
