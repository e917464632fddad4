//! Catalog snapshots for ABI compatibility checks
//!
//! A snapshot captures the `id -> (external name, layout)` mapping of a
//! catalog at one point in time. Snapshots are checked in alongside released
//! bindings and diffed against the next catalog revision.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::error::SnapshotError;
use crate::layout::LayoutDescriptor;
use crate::naming::NamingScheme;

/// Version of the on-disk snapshot format
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub format_version: u32,
    pub naming: NamingScheme,
    /// Version of layoutgen that captured this snapshot
    #[serde(default)]
    pub generator_version: String,
    pub entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub id: String,
    pub external_name: String,
    pub layout: LayoutDescriptor,
}

impl CatalogSnapshot {
    pub fn capture(catalog: &Catalog) -> Self {
        let naming = catalog.naming();
        let entries = catalog
            .layouts()
            .map(|(ty, layout)| SnapshotEntry {
                id: ty.id.clone(),
                external_name: naming.normalize(&ty.id),
                layout: layout.clone(),
            })
            .collect();

        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            naming,
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            entries,
        }
    }

    pub fn entry(&self, id: &str) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Hash over the entries only, so regenerating a snapshot with another
    /// generator version does not change it.
    pub fn fingerprint(&self) -> Result<String, SnapshotError> {
        let mut hasher = Sha256::new();
        hasher.update(self.naming.to_string().as_bytes());
        for entry in &self.entries {
            hasher.update(serde_json::to_vec(entry)?);
        }
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Get a short hash for display purposes
    pub fn short_fingerprint(&self) -> Result<String, SnapshotError> {
        Ok(self.fingerprint()?.chars().take(12).collect())
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(content: &str) -> Result<Self, SnapshotError> {
        let snapshot: CatalogSnapshot = serde_json::from_str(content)?;
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedFormat {
                found: snapshot.format_version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }
        Ok(snapshot)
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let mut content = self.to_json()?;
        content.push('\n');
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Conventional snapshot location inside an output directory
    pub fn default_path(output_dir: &Path) -> PathBuf {
        output_dir.join("layout-snapshot.json")
    }
}

impl Catalog {
    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot::capture(self)
    }
}
