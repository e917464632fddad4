//! Error types and batch error reporting for code generation
//!
//! This module provides:
//! - Standard error types for code generation failures
//! - Batch error collection so every problem in a catalog is reported at once

use std::fmt;

use layoutgen_core::CatalogError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Code generation error: {0}")]
    Generation(String),

    #[error("Format error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("Batch errors ({count} total):\n{summary}")]
    Batch { count: usize, summary: String },
}

/// Declaration an error was found in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLocation {
    /// Type id (e.g., "VEC3_FLOAT")
    pub type_id: Option<String>,
}

impl ErrorLocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_type(mut self, type_id: impl Into<String>) -> Self {
        self.type_id = Some(type_id.into());
        self
    }
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_id {
            Some(t) => write!(f, "{}", t),
            None => write!(f, "<unknown location>"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCategory {
    /// A declaration refers to a type that was not declared before it
    UnresolvedReference,
    /// Engine-side type name that cannot be spelled in C++
    InvalidNativeName,
    /// Layout that the target language cannot express
    UnsupportedLayout,
    Other,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::UnresolvedReference => write!(f, "UNRESOLVED_REFERENCE"),
            ErrorCategory::InvalidNativeName => write!(f, "INVALID_NATIVE_NAME"),
            ErrorCategory::UnsupportedLayout => write!(f, "UNSUPPORTED_LAYOUT"),
            ErrorCategory::Other => write!(f, "OTHER"),
        }
    }
}

/// A single error entry in the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub category: ErrorCategory,
    pub location: ErrorLocation,
    pub message: String,
    /// Optional suggestion for fixing
    pub suggestion: Option<String>,
}

impl ErrorEntry {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            location: ErrorLocation::new(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn at(mut self, location: ErrorLocation) -> Self {
        self.location = location;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn unresolved_reference(type_id: &str, referenced: &str) -> Self {
        Self::new(
            ErrorCategory::UnresolvedReference,
            format!("'{}' is referenced before it is declared", referenced),
        )
        .at(ErrorLocation::new().in_type(type_id))
    }

    pub fn invalid_native_name(type_id: &str, native_name: &str) -> Self {
        Self::new(
            ErrorCategory::InvalidNativeName,
            format!("'{}' is not a valid qualified C++ name", native_name),
        )
        .at(ErrorLocation::new().in_type(type_id))
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] at {}: {}", self.category, self.location, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

/// Batch error collector for accumulating errors during code generation
///
/// Instead of failing on the first bad declaration, backends collect every
/// problem and report them together.
///
/// ```ignore
/// let mut errors = BatchErrors::new();
/// errors.add(ErrorEntry::invalid_native_name("ENTITY", "utils:Entity"));
/// errors.into_result()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct BatchErrors {
    entries: Vec<ErrorEntry>,
}

impl BatchErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: ErrorEntry) {
        self.entries.push(entry);
    }

    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// `Ok(())` when nothing was collected, otherwise a `CodegenError::Batch`.
    pub fn into_result(self) -> Result<(), CodegenError> {
        if self.has_errors() {
            Err(self.into())
        } else {
            Ok(())
        }
    }

    /// Format errors as a summary report, grouped by category
    pub fn format_summary(&self) -> String {
        if self.entries.is_empty() {
            return "No errors".to_string();
        }

        let mut by_category: std::collections::BTreeMap<ErrorCategory, Vec<&ErrorEntry>> =
            std::collections::BTreeMap::new();
        for entry in &self.entries {
            by_category.entry(entry.category).or_default().push(entry);
        }

        let mut lines = Vec::new();
        lines.push(format!("Found {} error(s):", self.entries.len()));
        lines.push(String::new());

        for (category, entries) in by_category {
            lines.push(format!("## {} ({} errors):", category, entries.len()));
            for entry in entries.iter().take(10) {
                lines.push(format!("  - {}", entry));
            }
            if entries.len() > 10 {
                lines.push(format!("  ... and {} more", entries.len() - 10));
            }
            lines.push(String::new());
        }

        lines.join("\n")
    }
}

impl From<BatchErrors> for CodegenError {
    fn from(errors: BatchErrors) -> Self {
        CodegenError::Batch {
            count: errors.count(),
            summary: errors.format_summary(),
        }
    }
}

impl fmt::Display for BatchErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_summary())
    }
}
