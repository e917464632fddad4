//! ABI compatibility checking between catalog revisions
//!
//! Every id present in both revisions must keep its layout byte for byte.
//! Renamed external symbols and removed ids are reported as warnings; only
//! layout changes fail the release gate.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::layout::LayoutDescriptor;
use crate::snapshot::CatalogSnapshot;

/// The layout of a published type changed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Layout of '{id}' changed: was [{old}], now [{new}]")]
pub struct LayoutBreakError {
    pub id: String,
    pub old: LayoutDescriptor,
    pub new: LayoutDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameChangeWarning {
    pub id: String,
    pub old_name: String,
    pub new_name: String,
}

impl fmt::Display for NameChangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "External name of '{}' changed from {} to {}",
            self.id, self.old_name, self.new_name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRemovedWarning {
    pub id: String,
    pub external_name: String,
}

impl fmt::Display for TypeRemovedWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type '{}' ({}) was removed", self.id, self.external_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompatibilityViolation {
    LayoutBreak(LayoutBreakError),
    NameChange(NameChangeWarning),
    Removed(TypeRemovedWarning),
}

impl CompatibilityViolation {
    pub fn id(&self) -> &str {
        match self {
            CompatibilityViolation::LayoutBreak(e) => &e.id,
            CompatibilityViolation::NameChange(w) => &w.id,
            CompatibilityViolation::Removed(w) => &w.id,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, CompatibilityViolation::LayoutBreak(_))
    }
}

impl fmt::Display for CompatibilityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompatibilityViolation::LayoutBreak(e) => write!(f, "[LAYOUT_BREAK] {}", e),
            CompatibilityViolation::NameChange(w) => write!(f, "[NAME_CHANGE] {}", w),
            CompatibilityViolation::Removed(w) => write!(f, "[REMOVED] {}", w),
        }
    }
}

/// Raised when a report containing layout breaks is turned into a result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} layout break(s) found:\n{}", .breaks.len(), format_breaks(.breaks))]
pub struct CompatibilityError {
    pub breaks: Vec<LayoutBreakError>,
}

fn format_breaks(breaks: &[LayoutBreakError]) -> String {
    breaks
        .iter()
        .map(|b| format!("  - {}", b))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Outcome of diffing two catalog revisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatibilityReport {
    violations: Vec<CompatibilityViolation>,
}

impl CompatibilityReport {
    pub fn violations(&self) -> &[CompatibilityViolation] {
        &self.violations
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn is_breaking(&self) -> bool {
        self.violations.iter().any(CompatibilityViolation::is_fatal)
    }

    pub fn layout_breaks(&self) -> impl Iterator<Item = &LayoutBreakError> {
        self.violations.iter().filter_map(|v| match v {
            CompatibilityViolation::LayoutBreak(e) => Some(e),
            _ => None,
        })
    }

    pub fn name_changes(&self) -> impl Iterator<Item = &NameChangeWarning> {
        self.violations.iter().filter_map(|v| match v {
            CompatibilityViolation::NameChange(w) => Some(w),
            _ => None,
        })
    }

    pub fn removals(&self) -> impl Iterator<Item = &TypeRemovedWarning> {
        self.violations.iter().filter_map(|v| match v {
            CompatibilityViolation::Removed(w) => Some(w),
            _ => None,
        })
    }

    /// Fail if any layout broke; warnings alone pass.
    pub fn into_result(self) -> Result<Self, CompatibilityError> {
        if self.is_breaking() {
            Err(CompatibilityError {
                breaks: self.layout_breaks().cloned().collect(),
            })
        } else {
            Ok(self)
        }
    }

    pub fn format_summary(&self) -> String {
        if self.violations.is_empty() {
            return "No compatibility issues".to_string();
        }
        let mut lines = vec![format!(
            "Found {} compatibility issue(s) ({} fatal):",
            self.violations.len(),
            self.layout_breaks().count()
        )];
        lines.extend(self.violations.iter().map(|v| format!("  - {}", v)));
        lines.join("\n")
    }
}

impl fmt::Display for CompatibilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_summary())
    }
}

/// Compare two snapshots. Violations come in the new snapshot's order,
/// followed by ids that no longer exist.
pub fn diff_snapshots(old: &CatalogSnapshot, new: &CatalogSnapshot) -> CompatibilityReport {
    let mut violations = Vec::new();

    for entry in &new.entries {
        let Some(previous) = old.entry(&entry.id) else {
            continue;
        };

        if previous.layout != entry.layout {
            warn!("Layout of '{}' changed", entry.id);
            violations.push(CompatibilityViolation::LayoutBreak(LayoutBreakError {
                id: entry.id.clone(),
                old: previous.layout.clone(),
                new: entry.layout.clone(),
            }));
        } else if previous.external_name != entry.external_name {
            warn!(
                "External name of '{}' changed: {} -> {}",
                entry.id, previous.external_name, entry.external_name
            );
            violations.push(CompatibilityViolation::NameChange(NameChangeWarning {
                id: entry.id.clone(),
                old_name: previous.external_name.clone(),
                new_name: entry.external_name.clone(),
            }));
        }
    }

    let current: HashSet<&str> = new.entries.iter().map(|e| e.id.as_str()).collect();
    for entry in old.entries.iter().filter(|e| !current.contains(e.id.as_str())) {
        warn!("Type '{}' was removed", entry.id);
        violations.push(CompatibilityViolation::Removed(TypeRemovedWarning {
            id: entry.id.clone(),
            external_name: entry.external_name.clone(),
        }));
    }

    info!(
        "Compared {} -> {} types: {} issue(s)",
        old.entries.len(),
        new.entries.len(),
        violations.len()
    );
    CompatibilityReport { violations }
}

/// Compare two catalogs by re-deriving the layouts of both.
pub fn diff(old: &Catalog, new: &Catalog) -> CompatibilityReport {
    diff_snapshots(&old.snapshot(), &new.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineRevision;
    use crate::naming::NamingScheme;
    use crate::types::{LogicalType, ScalarKind::*};

    fn vec3(fields: [&str; 3]) -> LogicalType {
        LogicalType::structure("VEC3_F32", fields.map(|name| (name, Float32)))
    }

    fn catalog(types: Vec<LogicalType>) -> Catalog {
        Catalog::from_types(NamingScheme::V1, types).unwrap()
    }

    #[test]
    fn test_identical_catalogs_have_no_violations() {
        let a = catalog(vec![vec3(["x", "y", "z"]), LogicalType::alias("COLOR_RGB", "VEC3_F32")]);
        let b = catalog(vec![vec3(["x", "y", "z"]), LogicalType::alias("COLOR_RGB", "VEC3_F32")]);

        let report = diff(&a, &b);
        assert!(report.is_empty());
        assert!(!report.is_breaking());
    }

    #[test]
    fn test_reordered_fields_break_layout_once() {
        let a = catalog(vec![vec3(["x", "y", "z"])]);
        let b = catalog(vec![vec3(["y", "x", "z"])]);

        let report = diff(&a, &b);
        let breaks: Vec<_> = report.layout_breaks().collect();
        assert_eq!(breaks.len(), 1);
        assert_eq!(breaks[0].id, "VEC3_F32");
        assert_eq!(breaks[0].old.field_offset("x"), Some(0));
        assert_eq!(breaks[0].new.field_offset("x"), Some(4));
        assert!(report.is_breaking());
        assert!(report.clone().into_result().is_err());
    }

    #[test]
    fn test_scalar_kind_change_breaks_layout() {
        let a = catalog(vec![LogicalType::scalar_alias("ENTITY", UInt32)]);
        let b = catalog(vec![LogicalType::scalar_alias("ENTITY", Float32)]);

        let report = diff(&a, &b);
        assert_eq!(report.layout_breaks().count(), 1);
    }

    #[test]
    fn test_additions_are_compatible() {
        for (i, older) in EngineRevision::ALL.iter().enumerate() {
            for newer in &EngineRevision::ALL[i..] {
                let report = diff(&older.catalog().unwrap(), &newer.catalog().unwrap());
                assert!(report.is_empty(), "{} -> {}: {}", older, newer, report);
            }
        }
    }

    #[test]
    fn test_removal_and_rename_are_warnings() {
        let old = EngineRevision::Current.catalog().unwrap().snapshot();
        let mut new = old.clone();
        new.entries.retain(|e| e.id != "FRUSTUM");
        if let Some(entry) = new.entries.iter_mut().find(|e| e.id == "ENTITY") {
            entry.external_name = "FENTITY_HANDLE".to_string();
        }

        let report = diff_snapshots(&old, &new);
        assert!(!report.is_breaking());
        assert_eq!(report.violations().len(), 2);

        let renamed: Vec<_> = report.name_changes().collect();
        assert_eq!(renamed[0].old_name, "FENTITY");
        assert_eq!(renamed[0].new_name, "FENTITY_HANDLE");

        let removed: Vec<_> = report.removals().collect();
        assert_eq!(removed[0].id, "FRUSTUM");
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_error_message_lists_breaks() {
        let a = catalog(vec![vec3(["x", "y", "z"])]);
        let b = catalog(vec![vec3(["z", "y", "x"])]);

        let err = diff(&a, &b).into_result().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("1 layout break(s)"));
        assert!(message.contains("VEC3_F32"));
    }
}
