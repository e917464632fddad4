//! Declaration emitter
//!
//! Walks a catalog in registration order and produces one [`Declaration`]
//! per type: its external name, its layout and, for structs, every field
//! with its offset. Backends render declarations; they never look at the
//! catalog directly.

use layoutgen_core::layout::LayoutBody;
use layoutgen_core::{
    derive_layout, Catalog, CatalogError, LayoutDescriptor, LogicalType, ScalarKind, TypeKind,
    TypeShape,
};
use serde::Serialize;
use tracing::debug;

/// A type as it appears at the foreign boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    pub id: String,
    pub external_name: String,
    pub kind: TypeKind,
    pub layout: LayoutDescriptor,
    /// Struct fields in declaration order; empty for other kinds
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDeclaration>,
    /// External name of the aliased type or of the struct-array element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDeclaration {
    pub name: String,
    pub external_name: String,
    pub scalar: ScalarKind,
    pub offset: u64,
}

impl Declaration {
    /// Element scalar and count for fixed arrays.
    pub fn array_shape(&self) -> Option<(ScalarKind, u32)> {
        match (&self.kind, &self.layout.body) {
            (TypeKind::FixedArrayOfScalars, LayoutBody::Array { scalar, count }) => {
                Some((*scalar, *count))
            }
            _ => None,
        }
    }

    /// Element count for struct arrays.
    pub fn repeat_count(&self) -> Option<u32> {
        match (&self.kind, &self.layout.body) {
            (TypeKind::StructArray, LayoutBody::Repeated { count, .. }) => Some(*count),
            _ => None,
        }
    }

    /// The scalar a scalar alias stands for.
    pub fn scalar(&self) -> Option<ScalarKind> {
        match (&self.kind, &self.layout.body) {
            (TypeKind::ScalarAlias, LayoutBody::Scalar { scalar }) => Some(*scalar),
            _ => None,
        }
    }
}

/// Produces declarations for every type of a catalog.
#[derive(Debug, Clone, Copy)]
pub struct Emitter<'a> {
    catalog: &'a Catalog,
}

impl<'a> Emitter<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// A fresh pass over the catalog; calling it again starts over.
    pub fn declarations(&self) -> Declarations<'a> {
        Declarations {
            catalog: self.catalog,
            types: self.catalog.all_types(),
        }
    }

    /// Declaration for a single type.
    pub fn declare(&self, ty: &LogicalType) -> Result<Declaration, CatalogError> {
        let catalog = self.catalog;
        let naming = catalog.naming();
        let layout = derive_layout(ty, catalog)?;

        let fields = match &layout.body {
            LayoutBody::Fields { fields } if ty.kind() == TypeKind::NamedFieldStruct => fields
                .iter()
                .map(|field| FieldDeclaration {
                    name: field.name.clone(),
                    external_name: field.name.clone(),
                    scalar: field.scalar,
                    offset: field.offset,
                })
                .collect(),
            _ => Vec::new(),
        };

        let target = match &ty.shape {
            TypeShape::Alias { target } => Some(catalog.external_name(target)?),
            TypeShape::StructArray { element, .. } => Some(catalog.external_name(element)?),
            _ => None,
        };

        let declaration = Declaration {
            id: ty.id.clone(),
            external_name: naming.normalize(&ty.id),
            kind: ty.kind(),
            layout,
            fields,
            target,
            native_name: ty.native_name.clone(),
            doc: ty.doc.clone(),
        };
        debug!(
            "Declared {} as {} ({})",
            declaration.id,
            declaration.external_name,
            declaration.layout
        );
        Ok(declaration)
    }
}

/// Lazy, restartable sequence of declarations in catalog order.
#[derive(Debug, Clone)]
pub struct Declarations<'a> {
    catalog: &'a Catalog,
    types: std::slice::Iter<'a, LogicalType>,
}

impl Iterator for Declarations<'_> {
    type Item = Result<Declaration, CatalogError>;

    fn next(&mut self) -> Option<Self::Item> {
        let ty = self.types.next()?;
        Some(Emitter::new(self.catalog).declare(ty))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.types.size_hint()
    }
}

impl ExactSizeIterator for Declarations<'_> {}

/// Emit declarations for every type in `catalog`, in catalog order.
pub fn emit(catalog: &Catalog) -> Declarations<'_> {
    Emitter::new(catalog).declarations()
}

/// Collect all declarations, stopping at the first error.
pub fn emit_all(catalog: &Catalog) -> Result<Vec<Declaration>, CatalogError> {
    emit(catalog).collect()
}
