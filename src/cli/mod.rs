pub mod build;
pub mod completions;
pub mod init;
pub mod list;
pub mod validate;

use clap::{Parser, Subcommand};

/// mapscript - Map scene to browser script generator
#[derive(Parser, Debug)]
#[command(name = "mapscript")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate map scripts from scene files
    Build(build::BuildArgs),

    /// Validate scene files without generating scripts
    Validate(validate::ValidateArgs),

    /// List discovered maps and their contents
    List(list::ListArgs),

    /// Initialize a mapscript project (generates mapscript.yaml)
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
