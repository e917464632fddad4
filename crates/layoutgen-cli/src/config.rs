//! Project configuration (`layoutgen.toml`)
//!
//! ```toml
//! revision = "current"
//! output_dir = "generated"
//! header_name = "filament_value_types.h"
//! native_assertions = "filament_value_types_native.h"
//! native_includes = ["<math/vec3.h>", "<filament/Frustum.h>"]
//! baseline = "abi/layout-snapshot.json"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use layoutgen_core::EngineRevision;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "layoutgen.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Catalog definition file; the built-in `revision` is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    pub revision: EngineRevision,
    pub output_dir: PathBuf,
    pub header_name: String,
    /// Native assertion header, or absent to skip it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_assertions: Option<String>,
    pub native_includes: Vec<String>,
    /// JSON declaration dump, or absent to skip it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declarations: Option<String>,
    pub baseline: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            catalog: None,
            revision: EngineRevision::latest(),
            output_dir: PathBuf::from("generated"),
            header_name: "value_types.h".to_string(),
            native_assertions: Some("value_types_native.h".to_string()),
            native_includes: Vec::new(),
            declarations: None,
            baseline: PathBuf::from("layout-snapshot.json"),
        }
    }
}

impl ProjectConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse project configuration")
    }

    /// Load a config file, resolving its relative paths against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {:?}", path))?;
        debug!("Loaded project config from {:?}", path);

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn relative_to(mut self, base: &Path) -> Self {
        let rebase = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };
        self.catalog = self.catalog.as_deref().map(rebase);
        self.output_dir = rebase(&self.output_dir);
        self.baseline = rebase(&self.baseline);
        self
    }

    pub fn header_path(&self) -> PathBuf {
        self.output_dir.join(&self.header_name)
    }

    pub fn native_assertions_path(&self) -> Option<PathBuf> {
        self.native_assertions
            .as_ref()
            .map(|name| self.output_dir.join(name))
    }

    pub fn declarations_path(&self) -> Option<PathBuf> {
        self.declarations.as_ref().map(|name| self.output_dir.join(name))
    }

    /// Include guard derived from the header file name.
    pub fn include_guard(&self) -> String {
        let guard: String = self
            .header_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        if guard.starts_with(|c: char| c.is_ascii_digit()) {
            format!("_{}", guard)
        } else {
            guard
        }
    }
}
