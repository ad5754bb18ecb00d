use clap::Parser;

/// Arguments for the kubectl command
#[derive(Parser, Debug)]
#[command(
    long_about = "Invokes kubectl with the context and namespace of the given target, so \
                  commands always reach the right cluster and namespace.",
    after_help = "EXAMPLES:\n  \
                  List pods of production:\n    kd ctl production get pods -o wide"
)]
pub struct KubectlArgs {
    /// Target name or alias
    pub target: String,

    /// Arguments passed to kubectl unchanged
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
