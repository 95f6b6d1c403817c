//! `tsbridge classify`

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::json;
use tsbridge_core::{Category, Discovery, Generator, GeneratorConfig, TypeDiscovery};

use crate::generate::apply_overrides;

/// One classified candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedType {
    pub name: String,
    pub categories: Vec<Category>,
    pub explanations: Vec<(Category, String)>,
}

/// Classify every candidate of `discovery`, in name order.
pub fn classify(generator: &Generator, discovery: &Discovery) -> Vec<ClassifiedType> {
    let classification = generator.classify(discovery.candidates.iter());
    let mut report: Vec<ClassifiedType> = discovery
        .candidates
        .iter()
        .map(|descriptor| ClassifiedType {
            name: descriptor.name.clone(),
            categories: classification.categories_of(&descriptor.name),
            explanations: generator.explain(descriptor),
        })
        .collect();
    report.sort_by(|a, b| a.name.cmp(&b.name));
    report.dedup_by(|a, b| a.name == b.name);
    report
}

fn category_label(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "skipped".to_string();
    }
    categories
        .iter()
        .map(Category::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_text(report: &[ClassifiedType], discovery: &Discovery) -> String {
    let mut out = String::new();
    for entry in report {
        out.push_str(&format!("{}: {}\n", entry.name, category_label(&entry.categories)));
        for (category, explanation) in &entry.explanations {
            out.push_str(&format!("    {category}: {explanation}\n"));
        }
    }
    for failure in &discovery.failures {
        out.push_str(&format!("! {}: {}\n", failure.name, failure.reason));
    }
    out
}

pub fn render_json(report: &[ClassifiedType], discovery: &Discovery) -> Result<String> {
    let types: Vec<serde_json::Value> = report
        .iter()
        .map(|entry| {
            let explanations: serde_json::Map<String, serde_json::Value> = entry
                .explanations
                .iter()
                .map(|(category, text)| (category.to_string(), json!(text)))
                .collect();
            json!({
                "name": entry.name,
                "categories": entry.categories.iter().map(Category::to_string).collect::<Vec<_>>(),
                "explanations": explanations,
            })
        })
        .collect();
    let failures: Vec<serde_json::Value> = discovery
        .failures
        .iter()
        .map(|f| json!({ "name": f.name, "reason": f.reason }))
        .collect();

    serde_json::to_string_pretty(&json!({ "types": types, "failures": failures }))
        .context("Failed to serialize classification report")
}

/// Classify command implementation
pub fn run(mut config: GeneratorConfig, inputs: Vec<PathBuf>, as_json: bool) -> Result<()> {
    apply_overrides(&mut config, inputs, None);

    let generator = config
        .build_generator()
        .context("Invalid configuration")?;
    let discovery = config
        .discovery()
        .discover(&config.packages)
        .context("Type discovery failed")?;

    let report = classify(&generator, &discovery);
    if as_json {
        println!("{}", render_json(&report, &discovery)?);
    } else {
        print!("{}", render_text(&report, &discovery));
    }

    Ok(())
}
