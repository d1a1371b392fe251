//! List command implementation.
//!
//! Discovers scenes and prints what each map contains.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::discovery::{discover, discover_paths, LoadedScene};
use crate::error::{MapError, Result};
use crate::output::{display_path, plural, Printer};
use crate::registry::EntityKind;
use crate::types::Entity;

use super::build::load;

/// List discovered maps and their contents
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Scene files or directories (default: current directory)
    pub files: Vec<PathBuf>,

    /// Print the inventory as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// What one scene registers.
#[derive(Debug, Serialize)]
pub struct SceneSummary {
    pub map: String,
    pub path: String,
    /// Entity counts by kind, zero counts omitted.
    pub entities: BTreeMap<EntityKind, usize>,
    /// Distinct marker images, icons and shadows together.
    pub icons: usize,
    pub groups: Vec<String>,
    pub skipped: usize,
}

impl SceneSummary {
    fn from_loaded(loaded: &mut LoadedScene) -> Result<Self> {
        let scene = &mut loaded.scene;
        let icons = scene.marker_data()?.icons.len();

        let entities = EntityKind::ALL
            .iter()
            .map(|kind| (*kind, scene.count(*kind)))
            .filter(|(_, n)| *n > 0)
            .collect();

        let groups = scene
            .handles(EntityKind::MarkerGroup)
            .filter_map(|h| match h.entity() {
                Entity::MarkerGroup(group) => Some(group.name.clone()),
                _ => None,
            })
            .collect();

        Ok(Self {
            map: scene.map_id().to_string(),
            path: display_path(&loaded.path),
            entities,
            icons,
            groups,
            skipped: scene.skipped().len(),
        })
    }
}

pub fn run(args: ListArgs, printer: &Printer) -> Result<()> {
    let discovery = if args.files.is_empty() {
        discover(".")?
    } else {
        discover_paths(&args.files)?
    };

    let mut scenes = load(&discovery, false)?;
    let summaries = scenes
        .iter_mut()
        .map(SceneSummary::from_loaded)
        .collect::<Result<Vec<_>>>()?;

    if args.json {
        let json = serde_json::to_string_pretty(&summaries).map_err(|e| MapError::Build {
            message: format!("Failed to serialize inventory: {}", e),
            help: None,
        })?;
        println!("{}", json);
    } else {
        print_inventory(&summaries, printer);
    }

    Ok(())
}

fn print_inventory(summaries: &[SceneSummary], printer: &Printer) {
    if summaries.is_empty() {
        printer.warning("Warning", "no scene files found");
        return;
    }

    for summary in summaries {
        printer.info(
            "Map",
            &format!(
                "{} {}",
                printer.bold(&summary.map),
                printer.dim(&format!("({})", summary.path))
            ),
        );

        let counts: Vec<String> = summary
            .entities
            .iter()
            .map(|(kind, n)| format!("{} {}", n, kind))
            .collect();
        if !counts.is_empty() {
            printer.info("Entities", &counts.join(", "));
        }
        if summary.icons > 0 {
            printer.info("Icons", &plural(summary.icons, "image", "images"));
        }
        if !summary.groups.is_empty() {
            printer.info("Groups", &summary.groups.join(", "));
        }
        if summary.skipped > 0 {
            printer.warning("Skipped", &plural(summary.skipped, "entity", "entities"));
        }
    }
}
