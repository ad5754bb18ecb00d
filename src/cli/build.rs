use clap::Parser;

/// Arguments for the build command
#[derive(Parser, Debug)]
#[command(
    long_about = "Builds one or more applications. If only one application is configured, \
                  the name can be omitted. Images are pushed to the registry and tagged as \
                  \"latest\" by default; the tag can optionally be specified.",
    after_help = "EXAMPLES:\n  \
                  Build the default application:\n    kd build\n\n\
                  Build with a specific tag:\n    kd build my-app:awesome-tag\n\n\
                  Build every application:\n    kd build --all --tag v2"
)]
pub struct BuildArgs {
    /// Applications to build, as NAME or NAME:TAG
    #[arg(value_name = "APP[:TAG]")]
    pub apps: Vec<String>,

    /// Build every configured application
    #[arg(long, conflicts_with = "apps")]
    pub all: bool,

    /// Tag to use for the built images
    #[arg(long)]
    pub tag: Option<String>,

    /// Tag to use for the build cache (defaults to the git branch)
    #[arg(long)]
    pub cache_tag: Option<String>,
}
