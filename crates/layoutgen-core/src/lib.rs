//! Value-type catalog and layout contract for layoutgen
//!
//! Engine value types (vectors, matrices, colors, handles) are registered
//! once into an immutable [`Catalog`]. Each type derives exactly one layout
//! and one external name, and [`compat::diff`] guards those layouts across
//! catalog revisions.

pub mod catalog;
pub mod compat;
pub mod definition;
pub mod engine;
pub mod error;
pub mod layout;
pub mod naming;
pub mod snapshot;
pub mod types;

pub use catalog::{Catalog, CatalogBuilder};
pub use compat::{diff, diff_snapshots, CompatibilityReport, CompatibilityViolation};
pub use definition::CatalogDefinition;
pub use engine::EngineRevision;
pub use error::{CatalogError, DefinitionError, SnapshotError};
pub use layout::{derive_layout, LayoutDescriptor};
pub use naming::NamingScheme;
pub use snapshot::CatalogSnapshot;
pub use types::{FieldDef, LogicalType, ScalarKind, TypeKind, TypeShape};
