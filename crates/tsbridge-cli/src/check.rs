//! `tsbridge check`

use std::path::Path;

use anyhow::{Context, Result};
use tsbridge_core::{FilterSpec, GeneratorConfig};

/// Problems `validate` cannot see: inputs that are not on disk.
pub fn missing_inputs(config: &GeneratorConfig) -> Vec<&Path> {
    config
        .input
        .iter()
        .map(|p| p.as_path())
        .filter(|p| !p.is_file())
        .collect()
}

fn describe_filter(spec: &FilterSpec) -> String {
    match spec {
        FilterSpec::RejectAll => "reject all (nothing selected)".to_string(),
        FilterSpec::AcceptAll => "accept all".to_string(),
        FilterSpec::TypeSet { names } => format!("{} explicit type(s)", names.len()),
        FilterSpec::HasMarker { marker } => format!("types marked {marker:?}"),
        FilterSpec::Extends { base } => format!("subtypes of {base}"),
        FilterSpec::NameContains { text } => format!("names containing '{text}'"),
        FilterSpec::Regex { pattern } => format!("names matching /{pattern}/"),
        FilterSpec::And { filters } => format!("all of {} filters", filters.len()),
        FilterSpec::Or { filters } => format!("any of {} filters", filters.len()),
        FilterSpec::Not { .. } => "negated filter".to_string(),
    }
}

/// Check command implementation
pub fn run(path: &Path, config: &GeneratorConfig) -> Result<()> {
    println!("Checking configuration: {}", path.display());

    config.validate().context("Invalid configuration")?;
    let missing = missing_inputs(config);
    if let Some(first) = missing.first() {
        anyhow::bail!("Type manifest not found: {}", first.display());
    }

    println!("✓ Packages: {}", config.packages.join(", "));
    println!("✓ Inputs: {}", config.input.len());
    println!("✓ Model filter: {}", describe_filter(&config.model_filter));
    println!("✓ Rest filter: {}", describe_filter(&config.rest_filter));
    println!(
        "✓ Converters: model={}, rest={}",
        if config.converters.model.is_some() { "on" } else { "off" },
        if config.converters.rest.is_some() { "on" } else { "off" },
    );
    println!("✓ Custom types: {}", config.custom_types.len());
    println!("\nConfiguration is valid!");

    Ok(())
}
