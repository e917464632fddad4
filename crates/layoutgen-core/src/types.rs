//! Logical value types and the scalar kinds they are built from

use serde::{Deserialize, Serialize};
use std::fmt;

/// The atomic unit every composite value type is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    /// Boolean widened to 32 bits (`FBOOL` at the foreign boundary)
    Bool32,
    UInt32,
    Float32,
    Float64,
}

impl ScalarKind {
    pub const fn size(self) -> u64 {
        match self {
            ScalarKind::Bool32 | ScalarKind::UInt32 | ScalarKind::Float32 => 4,
            ScalarKind::Float64 => 8,
        }
    }

    /// Natural alignment; always equal to the size for these kinds.
    pub const fn align(self) -> u64 {
        self.size()
    }

    /// Spelling of the scalar in the generated C header.
    pub const fn c_name(self) -> &'static str {
        match self {
            ScalarKind::Bool32 => "FBOOL",
            ScalarKind::UInt32 => "uint32_t",
            ScalarKind::Float32 => "float",
            ScalarKind::Float64 => "double",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Bool32 => "bool32",
            ScalarKind::UInt32 => "uint32",
            ScalarKind::Float32 => "float32",
            ScalarKind::Float64 => "float64",
        };
        f.write_str(name)
    }
}

/// The kind of a logical type, independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    ScalarAlias,
    FixedArrayOfScalars,
    NamedFieldStruct,
    StructArray,
    TypeAlias,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeKind::ScalarAlias => "scalar_alias",
            TypeKind::FixedArrayOfScalars => "fixed_array_of_scalars",
            TypeKind::NamedFieldStruct => "named_field_struct",
            TypeKind::StructArray => "struct_array",
            TypeKind::TypeAlias => "type_alias",
        };
        f.write_str(name)
    }
}

/// A named scalar field of a struct. Declaration order is part of the layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    pub name: String,
    pub scalar: ScalarKind,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, scalar: ScalarKind) -> Self {
        Self {
            name: name.into(),
            scalar,
        }
    }
}

/// The layout-relevant payload of a logical type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeShape {
    /// A single opaque scalar (entity handles, packed sampler parameters)
    ScalarAlias { scalar: ScalarKind },

    /// `arity` packed scalars (flattened matrices, quaternions)
    FixedArray { scalar: ScalarKind, arity: u32 },

    /// Named scalar fields laid out sequentially in declaration order
    Struct { fields: Vec<FieldDef> },

    /// `arity` copies of another registered type (frustum planes)
    StructArray { element: String, arity: u32 },

    /// Same layout as another registered type under a distinct identity
    Alias { target: String },
}

impl TypeShape {
    pub fn kind(&self) -> TypeKind {
        match self {
            TypeShape::ScalarAlias { .. } => TypeKind::ScalarAlias,
            TypeShape::FixedArray { .. } => TypeKind::FixedArrayOfScalars,
            TypeShape::Struct { .. } => TypeKind::NamedFieldStruct,
            TypeShape::StructArray { .. } => TypeKind::StructArray,
            TypeShape::Alias { .. } => TypeKind::TypeAlias,
        }
    }

    /// The id of another catalog entry this shape depends on, if any.
    pub fn referenced_id(&self) -> Option<&str> {
        match self {
            TypeShape::StructArray { element, .. } => Some(element),
            TypeShape::Alias { target } => Some(target),
            _ => None,
        }
    }
}

/// A named entry of the type catalog.
///
/// Once published, `shape` is frozen; a breaking change needs a new `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalType {
    pub id: String,
    pub shape: TypeShape,
    /// Engine-side spelling of the type, e.g. `filament::math::float3`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl LogicalType {
    pub fn new(id: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            id: id.into(),
            shape,
            native_name: None,
            doc: None,
        }
    }

    pub fn scalar_alias(id: impl Into<String>, scalar: ScalarKind) -> Self {
        Self::new(id, TypeShape::ScalarAlias { scalar })
    }

    pub fn fixed_array(id: impl Into<String>, scalar: ScalarKind, arity: u32) -> Self {
        Self::new(id, TypeShape::FixedArray { scalar, arity })
    }

    pub fn structure<N: Into<String>>(
        id: impl Into<String>,
        fields: impl IntoIterator<Item = (N, ScalarKind)>,
    ) -> Self {
        let fields = fields
            .into_iter()
            .map(|(name, scalar)| FieldDef::new(name, scalar))
            .collect();
        Self::new(id, TypeShape::Struct { fields })
    }

    pub fn struct_array(id: impl Into<String>, element: impl Into<String>, arity: u32) -> Self {
        Self::new(
            id,
            TypeShape::StructArray {
                element: element.into(),
                arity,
            },
        )
    }

    pub fn alias(id: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            id,
            TypeShape::Alias {
                target: target.into(),
            },
        )
    }

    pub fn with_native_name(mut self, native_name: impl Into<String>) -> Self {
        self.native_name = Some(native_name.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn kind(&self) -> TypeKind {
        self.shape.kind()
    }

    /// Struct fields in declaration order; empty for every other kind.
    pub fn fields(&self) -> &[FieldDef] {
        match &self.shape {
            TypeShape::Struct { fields } => fields,
            _ => &[],
        }
    }
}
