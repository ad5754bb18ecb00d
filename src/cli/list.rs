use clap::{Parser, ValueEnum};

/// What to list
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Apps,
    Targets,
}

/// Output format of the list command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Name,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List all targets:\n    kd list targets\n\n\
                  List application names only:\n    kd list apps -o name")]
pub struct ListArgs {
    /// Either apps or targets
    #[arg(value_enum)]
    pub kind: ListKind,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}
