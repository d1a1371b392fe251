//! Build command implementation.
//!
//! Loads scene files, validates them and writes one script per map.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Args;

use crate::discovery::{discover, discover_paths, DiscoveryResult, LoadOptions, LoadedScene};
use crate::emit::{emit, EmitOptions};
use crate::error::{MapError, Result};
use crate::output::{display_path, plural, Printer};
use crate::page;
use crate::registry::RegistrationPolicy;
use crate::validation::{print_diagnostics, validate_scene, ValidationResult};

/// Generate map scripts from scene files
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Scene files or directories (default: discover from mapscript.yaml or current directory)
    pub files: Vec<PathBuf>,

    /// Output directory (default: manifest output, or dist)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Compress generated scripts
    #[arg(long)]
    pub compress: bool,

    /// Also write a standalone HTML page per map
    #[arg(long)]
    pub html: bool,

    /// Fail on entities that cannot be decoded instead of skipping them
    #[arg(long)]
    pub strict: bool,

    /// Write scripts to stdout instead of files
    #[arg(long)]
    pub stdout: bool,
}

pub fn run(args: BuildArgs, printer: &Printer) -> Result<()> {
    let discovery = if args.files.is_empty() {
        discover(".")?
    } else {
        discover_paths(&args.files)?
    };

    if discovery.scan.is_empty() {
        printer.warning("Warning", "no scene files found");
        return Ok(());
    }

    let mut scenes = load(&discovery, args.strict)?;
    check_scenes(&scenes, printer)?;

    let manifest = &discovery.manifest;
    let options = EmitOptions {
        compress: (args.compress || manifest.compress).then_some(true),
    };
    let html = args.html || manifest.html;
    let output = args.output.clone().unwrap_or_else(|| discovery.output_dir());

    if !args.stdout && !output.exists() {
        fs::create_dir_all(&output).map_err(|e| MapError::Io {
            path: output.clone(),
            message: format!("Failed to create output directory: {}", e),
        })?;
    }

    for loaded in &mut scenes {
        let map_id = loaded.scene.map_id().to_string();
        printer.status(
            "Generating",
            &format!(
                "{} {}",
                map_id,
                printer.dim(&format!("({})", display_path(&loaded.path)))
            ),
        );

        let script = emit(&mut loaded.scene, &options)?;

        if args.stdout {
            let mut stdout = io::stdout().lock();
            stdout.write_all(script.as_bytes())?;
            if !script.ends_with('\n') {
                writeln!(stdout)?;
            }
            continue;
        }

        write_output(&output.join(format!("{}.js", map_id)), &script)?;
        if html {
            let page = page::compose(&loaded.scene, &script);
            write_output(&output.join(format!("{}.html", map_id)), &page)?;
        }
    }

    let count = plural(scenes.len(), "map", "maps");
    if args.stdout {
        printer.success("Finished", &count);
    } else {
        printer.success(
            "Finished",
            &format!("{} to {}", count, printer.highlight(&display_path(&output))),
        );
    }

    Ok(())
}

/// Load every discovered scene, with `--strict` overriding the manifest policy.
pub(crate) fn load(discovery: &DiscoveryResult, strict: bool) -> Result<Vec<LoadedScene>> {
    let mut options = LoadOptions::from_manifest(&discovery.manifest);
    if strict {
        options.policy = RegistrationPolicy::Strict;
    }
    discovery.load_with_options(&options)
}

fn check_scenes(scenes: &[LoadedScene], printer: &Printer) -> Result<()> {
    let mut result = ValidationResult::new();
    for loaded in scenes {
        result.merge(validate_scene(&loaded.scene));
    }

    if result.has_errors() {
        print_diagnostics(&result, printer);
        return Err(MapError::Validation {
            message: format!(
                "{} in {}",
                plural(result.error_count(), "error", "errors"),
                plural(scenes.len(), "map", "maps")
            ),
            help: Some("Run `mapscript validate` for details".to_string()),
        });
    }
    if result.has_warnings() {
        print_diagnostics(&result, printer);
    }

    Ok(())
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| MapError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write output: {}", e),
    })
}
