use anyhow::Context;
use clap::Parser;
use slicekit::{
    build_index, init_logging, shared_bus, Catalog, EventBus, FilamentSize, InMemoryRegistry,
    MaterialIndex, Preferences, SettingsManager,
};
use slicekit_core::{approximate_diameter, format_diameter};
use std::path::PathBuf;
use std::sync::Arc;

/// Inspect a material catalog the way the slicer sees it
#[derive(Debug, Parser)]
#[command(name = "slicekit", version = slicekit::VERSION)]
struct Args {
    /// Catalog JSON file with materials and machines
    catalog: PathBuf,

    /// Configuration file (JSON or TOML); defaults to the user config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mark a root material id as favorite and save the configuration
    #[arg(long = "favorite", value_name = "ROOT_ID")]
    favorites: Vec<String>,

    /// Remove a root material id from the favorites and save the configuration
    #[arg(long = "unfavorite", value_name = "ROOT_ID")]
    unfavorites: Vec<String>,

    /// Only list materials for this filament size, e.g. "1.75mm"
    #[arg(long)]
    diameter: Option<FilamentSize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging()?;
    tracing::info!("SliceKit {} (built {})", slicekit::VERSION, slicekit::BUILD_DATE);

    let config_path = match args.config {
        Some(path) => path,
        None => {
            SettingsManager::ensure_config_dir()?;
            SettingsManager::config_file_path()?
        }
    };

    let bus = shared_bus(EventBus::new());
    let preferences = Arc::new(
        Preferences::open(&config_path)
            .with_context(|| format!("loading configuration {}", config_path.display()))?
            .with_bus(bus.clone()),
    );

    let catalog = Catalog::load(&args.catalog)
        .with_context(|| format!("loading catalog {}", args.catalog.display()))?;
    let registry = Arc::new(InMemoryRegistry::with_bus(bus.clone()));
    let index = build_index(registry.clone(), catalog.build_tree()?, preferences, bus);

    catalog.populate(&registry)?;
    settle(&index).await;

    for id in &args.favorites {
        index.add_favorite(id);
    }
    for id in &args.unfavorites {
        index.remove_favorite(id);
    }

    print_summary(&index, &catalog, args.diameter);
    Ok(())
}

/// Drive the debounce timer until no update is pending
async fn settle(index: &MaterialIndex) {
    while let Some(deadline) = index.next_deadline() {
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
        index.poll(std::time::Instant::now());
    }
}

fn print_summary(index: &MaterialIndex, catalog: &Catalog, size: Option<FilamentSize>) {
    let groups = index.all_material_groups();
    match size {
        Some(size) => println!("Material groups ({} filament):", size),
        None => println!("Material groups: {}", groups.len()),
    }
    for group in groups.values() {
        let root = &group.root_material_node;
        if let Some(size) = size {
            if size.approximate() != approximate_diameter(root.approximate_diameter()) {
                continue;
            }
        }
        println!(
            "  {}{} {} [{}] {} variants{}{}",
            if index.is_favorite(&group.name) { "*" } else { " " },
            group.name,
            root.material_type(),
            root.metadata.brand,
            group.derived_material_node_list.len(),
            if group.is_read_only { ", read-only" } else { "" },
            match index.fallback_material_id_by_material_type(root.material_type()) {
                Some(fallback) if fallback != group.name => format!(", falls back to {}", fallback),
                _ => String::new(),
            }
        );
    }

    for stack in catalog.global_stacks() {
        println!("Machine {}:", stack.definition_id);
        for extruder in &stack.extruders {
            let default = index
                .default_material(&stack, extruder.position, extruder.nozzle_name(), None)
                .map(|node| node.container_id().to_string())
                .unwrap_or_else(|e| format!("<{}>", e));
            let available = index
                .available_materials_for_machine_extruder(&stack, extruder)
                .map(|materials| materials.len())
                .unwrap_or(0);
            println!(
                "  extruder {} ({}, {}): default {}, {} compatible materials",
                extruder.position,
                extruder.nozzle_name().unwrap_or("no nozzle"),
                format_diameter(extruder.material_diameter),
                default,
                available
            );
        }
    }

    let favorites = index.favorites();
    if !favorites.is_empty() {
        println!("Favorites: {}", favorites.join(", "));
    }
}
