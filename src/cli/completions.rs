use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    kd completions bash > ~/.bash_completion.d/kd\n\n\
                  Generate zsh completions:\n    kd completions zsh > ~/.zfunc/_kd\n\n\
                  Generate fish completions:\n    kd completions fish > ~/.config/fish/completions/kd.fish\n\n\
                  Generate PowerShell completions:\n    kd completions powershell")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
