//! Layout derivation: logical type -> concrete byte layout
//!
//! Structs follow the sequential layout rule: fields are placed in declaration
//! order, each at the next offset satisfying the natural alignment of its
//! scalar, and the total size is rounded up to the struct's alignment. Arrays
//! are packed with no inter-element padding. Aliases reuse their target's
//! descriptor verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CatalogError;
use crate::types::{FieldDef, LogicalType, ScalarKind, TypeShape};

/// Aliases and struct arrays may nest; anything deeper than this is a cycle.
const MAX_REFERENCE_DEPTH: usize = 64;

/// Resolves type ids while deriving layouts of types that reference others.
pub trait TypeLookup {
    fn lookup(&self, id: &str) -> Result<&LogicalType, CatalogError>;
}

/// Concrete byte layout of a logical type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutDescriptor {
    pub size: u64,
    pub align: u64,
    pub body: LayoutBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum LayoutBody {
    Scalar { scalar: ScalarKind },
    Array { scalar: ScalarKind, count: u32 },
    Fields { fields: Vec<FieldLayout> },
    Repeated {
        element: Box<LayoutDescriptor>,
        count: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldLayout {
    pub name: String,
    pub scalar: ScalarKind,
    pub offset: u64,
}

impl LayoutDescriptor {
    pub fn fields(&self) -> &[FieldLayout] {
        match &self.body {
            LayoutBody::Fields { fields } => fields,
            _ => &[],
        }
    }

    pub fn field_offset(&self, name: &str) -> Option<u64> {
        self.fields()
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.offset)
    }

    /// True when both layouts occupy the same bytes with the same alignment,
    /// regardless of how the bytes are described.
    pub fn same_footprint(&self, other: &LayoutDescriptor) -> bool {
        self.size == other.size && self.align == other.align
    }
}

impl fmt::Display for LayoutDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "size {}, align {}, ", self.size, self.align)?;
        match &self.body {
            LayoutBody::Scalar { scalar } => write!(f, "{}", scalar),
            LayoutBody::Array { scalar, count } => write!(f, "{}[{}]", scalar, count),
            LayoutBody::Fields { fields } => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {} @{}", field.name, field.scalar, field.offset)?;
                }
                write!(f, "}}")
            }
            LayoutBody::Repeated { element, count } => write!(f, "[({})] x {}", element, count),
        }
    }
}

/// Round `offset` up to the next multiple of `align` (a power of two).
pub fn align_up(offset: u64, align: u64) -> Option<u64> {
    debug_assert!(align.is_power_of_two());
    offset.checked_add(align - 1).map(|v| v & !(align - 1))
}

/// Derive the layout of `ty`, resolving referenced types through `types`.
///
/// Pure: an unchanged type always derives the same descriptor.
pub fn derive_layout(
    ty: &LogicalType,
    types: &impl TypeLookup,
) -> Result<LayoutDescriptor, CatalogError> {
    derive_at_depth(ty, types, 0)
}

fn derive_at_depth(
    ty: &LogicalType,
    types: &impl TypeLookup,
    depth: usize,
) -> Result<LayoutDescriptor, CatalogError> {
    if depth > MAX_REFERENCE_DEPTH {
        return Err(CatalogError::invalid_shape(
            &ty.id,
            "type references are nested too deeply (cyclic alias?)",
        ));
    }

    match &ty.shape {
        TypeShape::ScalarAlias { scalar } => Ok(LayoutDescriptor {
            size: scalar.size(),
            align: scalar.align(),
            body: LayoutBody::Scalar { scalar: *scalar },
        }),

        TypeShape::FixedArray { scalar, arity } => {
            if *arity == 0 {
                return Err(CatalogError::invalid_shape(&ty.id, "arity must be non-zero"));
            }
            let size = scalar
                .size()
                .checked_mul(u64::from(*arity))
                .ok_or_else(|| CatalogError::invalid_shape(&ty.id, "array size overflows"))?;
            Ok(LayoutDescriptor {
                size,
                align: scalar.align(),
                body: LayoutBody::Array {
                    scalar: *scalar,
                    count: *arity,
                },
            })
        }

        TypeShape::Struct { fields } => derive_struct(&ty.id, fields),

        TypeShape::StructArray { element, arity } => {
            if *arity == 0 {
                return Err(CatalogError::invalid_shape(&ty.id, "arity must be non-zero"));
            }
            if element == &ty.id {
                return Err(CatalogError::invalid_shape(&ty.id, "struct array of itself"));
            }
            let element_layout = derive_at_depth(types.lookup(element)?, types, depth + 1)?;
            let size = element_layout
                .size
                .checked_mul(u64::from(*arity))
                .ok_or_else(|| CatalogError::invalid_shape(&ty.id, "array size overflows"))?;
            Ok(LayoutDescriptor {
                size,
                align: element_layout.align,
                body: LayoutBody::Repeated {
                    element: Box::new(element_layout),
                    count: *arity,
                },
            })
        }

        TypeShape::Alias { target } => {
            if target == &ty.id {
                return Err(CatalogError::invalid_shape(&ty.id, "alias of itself"));
            }
            derive_at_depth(types.lookup(target)?, types, depth + 1)
        }
    }
}

fn derive_struct(
    id: &str,
    fields: &[FieldDef],
) -> Result<LayoutDescriptor, CatalogError> {
    if fields.is_empty() {
        return Err(CatalogError::invalid_shape(id, "struct has no fields"));
    }

    let overflow = || CatalogError::invalid_shape(id, "struct size overflows");
    let mut offset = 0u64;
    let mut align = 1u64;
    let mut laid_out = Vec::with_capacity(fields.len());

    for field in fields {
        let field_align = field.scalar.align();
        offset = align_up(offset, field_align).ok_or_else(overflow)?;
        laid_out.push(FieldLayout {
            name: field.name.clone(),
            scalar: field.scalar,
            offset,
        });
        offset = offset.checked_add(field.scalar.size()).ok_or_else(overflow)?;
        align = align.max(field_align);
    }

    let size = align_up(offset, align).ok_or_else(overflow)?;
    Ok(LayoutDescriptor {
        size,
        align,
        body: LayoutBody::Fields { fields: laid_out },
    })
}
