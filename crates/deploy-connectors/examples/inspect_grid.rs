//! Exports a grid layout file and prints what it depends on.
//!
//! Every media item and document is unknown to the in-memory services used
//! here, so the output shows which references would be dropped.

use std::fs;
use std::sync::Arc;

use deploy_connectors::memory::{
    MemoryDataTypeService, MemoryEntityService, MemoryMacroService, MemoryMediaStore,
};
use deploy_connectors::{ConnectorRegistry, DependencyMode, EditorAlias, Property, Services};

fn format_mode(mode: DependencyMode) -> &'static str {
    match mode {
        DependencyMode::MustExist => "exist",
        DependencyMode::MustMatch => "match",
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "grid.json".to_string());

    println!("Reading: {}", path);

    let json = fs::read_to_string(&path).expect("Failed to read file");
    println!("File size: {} bytes", json.len());

    let store = Arc::new(MemoryMediaStore::new());
    let services = Services {
        entities: Arc::new(MemoryEntityService::new()),
        media: store.clone(),
        files: store,
        macros: Arc::new(MemoryMacroService::new()),
        data_types: Arc::new(MemoryDataTypeService::new()),
    };
    let registry = ConnectorRegistry::standard(&services).expect("Failed to build registry");

    let property = Property::new("grid", EditorAlias::Grid, json.as_str());
    let mut dependencies = Vec::new();
    let portable = registry
        .to_portable(&property, &mut dependencies)
        .expect("Failed to export");

    println!("\n=== Dependencies ({}) ===", dependencies.len());
    for dependency in &dependencies {
        println!(
            "  {} [{}{}]",
            dependency.udi,
            format_mode(dependency.mode),
            if dependency.ordering { ", ordered" } else { "" }
        );
    }

    println!("\n=== Portable value ===");
    match portable {
        Some(value) => {
            let preview: String = value.chars().take(400).collect();
            if value.len() > 400 {
                println!("{}...", preview);
            } else {
                println!("{}", preview);
            }
        }
        None => println!("(none)"),
    }
}
