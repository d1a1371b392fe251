use clap::Parser;
use mapscript::cli::{Cli, Commands};
use mapscript::output::Printer;
use miette::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let printer = Printer::new();

    match cli.command {
        Commands::Build(args) => mapscript::cli::build::run(args, &printer)?,
        Commands::Validate(args) => mapscript::cli::validate::run(args, &printer)?,
        Commands::List(args) => mapscript::cli::list::run(args, &printer)?,
        Commands::Init(args) => mapscript::cli::init::run(args, &printer)?,
        Commands::Completions(args) => mapscript::cli::completions::run(args)?,
    }

    Ok(())
}
