//! Command handlers shared by the binary and the integration tests

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use layoutgen_codegen::{
    CHeaderCodegen, CHeaderConfig, Codegen, JsonCodegen, NativeAssertionsCodegen,
    NativeAssertionsConfig,
};
use layoutgen_core::{compat, Catalog, CatalogDefinition, CatalogSnapshot, CompatibilityReport};
use tracing::info;

use crate::config::ProjectConfig;

/// The catalog named by the config: a definition file if set, otherwise the
/// built-in revision.
pub fn load_catalog(config: &ProjectConfig) -> Result<Catalog> {
    let catalog = match &config.catalog {
        Some(path) => {
            info!("Loading catalog definition from {:?}", path);
            CatalogDefinition::load(path)
                .with_context(|| format!("Failed to load catalog definition: {:?}", path))?
                .build()
                .with_context(|| format!("Invalid catalog definition: {:?}", path))?
        }
        None => {
            info!("Using built-in engine revision '{}'", config.revision);
            config.revision.catalog()?
        }
    };
    Ok(catalog)
}

/// Write the C header and, when configured, the native assertions and the
/// declaration dump. Returns the written paths.
pub fn emit(config: &ProjectConfig, catalog: &Catalog) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", config.output_dir))?;

    let mut written = Vec::new();

    let mut header = CHeaderCodegen::new().with_config(CHeaderConfig {
        include_guard: config.include_guard(),
        ..CHeaderConfig::default()
    });
    let path = config.header_path();
    write_output(&path, &header.generate(catalog)?)?;
    written.push(path);

    if let Some(path) = config.native_assertions_path() {
        let mut native = NativeAssertionsCodegen::new().with_config(NativeAssertionsConfig {
            c_header: config.header_name.clone(),
            native_includes: config.native_includes.clone(),
            ..NativeAssertionsConfig::default()
        });
        write_output(&path, &native.generate(catalog)?)?;
        written.push(path);
    }

    if let Some(path) = config.declarations_path() {
        write_output(&path, &JsonCodegen::new().generate(catalog)?)?;
        written.push(path);
    }

    info!(
        "Generated {} file(s) for {} types in {:?}",
        written.len(),
        catalog.len(),
        config.output_dir
    );
    Ok(written)
}

/// Record the catalog's layouts as a baseline snapshot.
pub fn snapshot(catalog: &Catalog, output: &Path) -> Result<CatalogSnapshot> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    let snapshot = catalog.snapshot();
    snapshot
        .save(output)
        .with_context(|| format!("Failed to write snapshot: {:?}", output))?;
    info!(
        "Wrote snapshot of {} types to {:?} (fingerprint {})",
        snapshot.entries.len(),
        output,
        snapshot.short_fingerprint()?
    );
    Ok(snapshot)
}

/// Compare the catalog against a baseline snapshot.
pub fn check(catalog: &Catalog, baseline: &Path) -> Result<CompatibilityReport> {
    let old = CatalogSnapshot::load(baseline)
        .with_context(|| format!("Failed to load baseline snapshot: {:?}", baseline))?;
    let new = catalog.snapshot();

    if old.fingerprint()? == new.fingerprint()? {
        info!("Catalog matches baseline {}", old.short_fingerprint()?);
    }
    Ok(compat::diff_snapshots(&old, &new))
}

/// One line per type: id, external name, size, alignment.
pub fn list(catalog: &Catalog) -> Result<String> {
    let id_width = catalog.all_types().map(|t| t.id.len()).max().unwrap_or(0).max(2);
    let mut names = Vec::with_capacity(catalog.len());
    for ty in catalog {
        names.push(catalog.external_name(&ty.id)?);
    }
    let name_width = names.iter().map(String::len).max().unwrap_or(0).max(4);

    let mut output = String::new();
    writeln!(
        output,
        "{:<id_width$}  {:<name_width$}  {:>5}  {:>5}  KIND",
        "ID", "NAME", "SIZE", "ALIGN"
    )?;
    for (ty, name) in catalog.all_types().zip(&names) {
        let layout = catalog.layout(&ty.id)?;
        writeln!(
            output,
            "{:<id_width$}  {:<name_width$}  {:>5}  {:>5}  {}",
            ty.id,
            name,
            layout.size,
            layout.align,
            ty.kind()
        )?;
    }
    Ok(output)
}

/// Machine-readable form of [`list`].
pub fn list_json(catalog: &Catalog) -> Result<String> {
    let snapshot = catalog.snapshot();
    Ok(serde_json::to_string_pretty(&snapshot.entries)?)
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
    info!("Wrote {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use layoutgen_core::EngineRevision;

    #[test]
    fn test_list_table() {
        let catalog = EngineRevision::Initial.catalog().unwrap();
        let table = list(&catalog).unwrap();
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), catalog.len() + 1);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].starts_with("MAT44_DOUBLE"));
        assert!(lines[1].contains("FMAT44_DOUBLE"));
        assert!(lines[1].contains("  128      8  fixed_array_of_scalars"));
    }

    #[test]
    fn test_list_json() {
        let catalog = EngineRevision::Initial.catalog().unwrap();
        let value: serde_json::Value = serde_json::from_str(&list_json(&catalog).unwrap()).unwrap();
        assert_eq!(value[0]["external_name"], "FMAT44_DOUBLE");
    }
}
