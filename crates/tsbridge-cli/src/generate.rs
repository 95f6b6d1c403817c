//! `tsbridge generate`

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tsbridge_core::GeneratorConfig;

/// Replace configured inputs and output directory with command-line values.
pub fn apply_overrides(config: &mut GeneratorConfig, inputs: Vec<PathBuf>, output: Option<PathBuf>) {
    if !inputs.is_empty() {
        config.input = inputs;
    }
    if let Some(output) = output {
        config.output_dir = output;
    }
}

/// Generate command implementation
pub fn run(mut config: GeneratorConfig, inputs: Vec<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    apply_overrides(&mut config, inputs, output);

    let generator = config
        .build_generator()
        .context("Invalid configuration")?;
    let modules = generator
        .generate(&config.discovery(), &config.packages)
        .context("Generation failed")?;

    info!(
        modules = modules.tree().len(),
        declarations = modules.table().len(),
        "Writing modules"
    );
    let written = modules
        .write_to(&config.output_dir)
        .with_context(|| format!("Failed to write modules to {:?}", config.output_dir))?;

    for path in &written {
        println!("  {}", path.display());
    }
    println!(
        "✓ Generated {} module file(s) in {}",
        written.len(),
        config.output_dir.display()
    );

    Ok(())
}
