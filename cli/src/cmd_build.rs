//! `abiscope build`: compile a corpus directory into a registry artifact.

use abiscope_registry::{BuildReport, RegistryBuilder};
use anyhow::{Context, Result};
use std::path::Path;

use crate::config::AppConfig;

pub fn run(config: &AppConfig, corpus: &Path, out: &Path, as_json: bool) -> Result<()> {
    let mut builder = RegistryBuilder::with_config(config.builder.clone());
    builder
        .load_directory(corpus)
        .with_context(|| format!("load corpus '{}'", corpus.display()))?;
    let (registry, report) = builder.finish();

    registry
        .save_json(out)
        .with_context(|| format!("write registry artifact '{}'", out.display()))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", summary(&report));
        let stats = registry.stats();
        println!(
            "✓ {} functions, {} topics ({} event variants) → {}",
            stats.functions,
            stats.topics,
            stats.event_variants,
            out.display()
        );
    }
    Ok(())
}

fn summary(report: &BuildReport) -> String {
    let mut out = format!(
        "Documents: {} scanned, {} skipped\n\
         Entries:   {} skipped, {} ignored\n\
         Functions: {} registered, {} duplicate, {} selector collisions\n\
         Events:    {} variants registered, {} duplicate\n",
        report.documents_scanned,
        report.documents_skipped,
        report.entries_skipped,
        report.entries_ignored,
        report.functions_registered,
        report.functions_duplicate,
        report.functions_collided,
        report.event_variants_registered,
        report.events_duplicate,
    );
    if !report.diagnostics.is_empty() {
        out.push_str("Diagnostics:\n");
        for d in &report.diagnostics {
            out.push_str(&format!("  ✗ {d}\n"));
        }
    }
    out
}
