//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Shaderbox editor arguments.
#[derive(Parser, Debug)]
#[command(
    name = "Shaderbox Editor",
    about = "Line-driven shader session editor with undo/redo",
    long_about = "Edits a session of fragment shaders through line commands read from a \
        script file or stdin. Every change can be undone.\n\n\
        COMMANDS:\n  \
          new NAME [CODE]      delete NAME          rename OLD NEW\n  \
          duplicate NAME NEW   code NAME CODE       font-size N\n  \
          dark on|off          undo                 redo\n  \
          undo-until INDEX     redo-until INDEX     undo-all\n  \
          history              describe TEXT        disable\n  \
          enable               reset                save\n  \
          list\n\n\
        Names containing spaces go in double quotes.",
    version
)]
pub struct Args {
    /// Editor configuration file.
    #[arg(long, default_value = "shaderbox.toml")]
    pub config: PathBuf,

    /// Read commands from this file instead of stdin.
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Start with an empty session instead of the example shaders.
    #[arg(long)]
    pub no_examples: bool,
}
