use clap::Parser;

/// Arguments for the deploy command
#[derive(Parser, Debug)]
#[command(
    allow_missing_positional = true,
    long_about = "Deploys applications to the given target. If only one application is \
                  configured, the name can be omitted. By default the image tagged \"latest\" \
                  is deployed. Every image that was deployed successfully is tagged with the \
                  name of the target.",
    after_help = "EXAMPLES:\n  \
                  Deploy the default application:\n    kd deploy production\n\n\
                  Deploy a specific tag:\n    kd deploy my-app:v2 acc\n\n\
                  Build first, then deploy:\n    kd deploy --build my-app acc\n\n\
                  Show the manifests instead of applying them:\n    kd deploy --dry-run acc"
)]
pub struct DeployArgs {
    /// Applications to deploy, as NAME or NAME:TAG
    #[arg(value_name = "APP[:TAG]")]
    pub apps: Vec<String>,

    /// Target name or alias
    #[arg(required = true)]
    pub target: String,

    /// Deploy every configured application
    #[arg(long, conflicts_with = "apps")]
    pub all: bool,

    /// Build and push the images before deploying them
    #[arg(long)]
    pub build: bool,

    /// Print the composed manifests instead of applying them
    #[arg(long)]
    pub dry_run: bool,

    /// Tag of the images to deploy
    #[arg(long)]
    pub tag: Option<String>,

    /// Tag to use for the build cache (defaults to the git branch)
    #[arg(long, requires = "build")]
    pub cache_tag: Option<String>,
}

