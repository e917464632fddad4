//! The type catalog: an immutable, ordered registry of logical value types
//!
//! A [`CatalogBuilder`] accepts registrations one at a time and rejects
//! anything that would make the catalog ambiguous or underivable. Building
//! it yields a [`Catalog`] value whose layouts are derived once and never
//! change for the lifetime of the process.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::error::CatalogError;
use crate::layout::{derive_layout, LayoutDescriptor, TypeLookup};
use crate::naming::{is_c_keyword, is_valid_c_identifier, NamingScheme};
use crate::types::{LogicalType, TypeShape};

/// Collects type registrations in a fixed order.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    naming: NamingScheme,
    types: Vec<LogicalType>,
    layouts: Vec<LayoutDescriptor>,
    index: HashMap<String, usize>,
    /// external name -> id that claimed it
    external_names: HashMap<String, String>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_naming(naming: NamingScheme) -> Self {
        Self {
            naming,
            ..Self::default()
        }
    }

    /// Register a type.
    ///
    /// Fails with `DuplicateId` if the id is taken (even by an identical
    /// definition), `InvalidShape` if the type cannot be laid out or refers to
    /// itself, `UnknownType` if it references an id not yet registered, and
    /// `NameCollision` if its external name is already claimed.
    pub fn register(&mut self, ty: LogicalType) -> Result<&mut Self, CatalogError> {
        if self.index.contains_key(&ty.id) {
            return Err(CatalogError::DuplicateId(ty.id));
        }

        check_shape(&ty)?;

        if let Some(referenced) = ty.shape.referenced_id() {
            if referenced == ty.id {
                return Err(CatalogError::invalid_shape(
                    &ty.id,
                    format!("{} refers to itself", ty.kind()),
                ));
            }
            if !self.index.contains_key(referenced) {
                return Err(CatalogError::UnknownType(referenced.to_string()));
            }
        }

        let external_name = self.naming.normalize(&ty.id);
        if let Some(first) = self.external_names.get(&external_name) {
            return Err(CatalogError::NameCollision {
                first: first.clone(),
                second: ty.id,
                name: external_name,
            });
        }

        let layout = derive_layout(&ty, &*self)?;
        debug!(
            "Registered {} '{}' as {} ({})",
            ty.kind(),
            ty.id,
            external_name,
            layout
        );

        self.external_names.insert(external_name, ty.id.clone());
        self.index.insert(ty.id.clone(), self.types.len());
        self.types.push(ty);
        self.layouts.push(layout);
        Ok(self)
    }

    /// Register every type in order, stopping at the first failure.
    pub fn register_all(
        &mut self,
        types: impl IntoIterator<Item = LogicalType>,
    ) -> Result<&mut Self, CatalogError> {
        for ty in types {
            self.register(ty)?;
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn build(self) -> Catalog {
        info!(
            "Built type catalog with {} types (naming {})",
            self.types.len(),
            self.naming
        );
        Catalog {
            naming: self.naming,
            types: self.types,
            layouts: self.layouts,
            index: self.index,
        }
    }
}

impl TypeLookup for CatalogBuilder {
    fn lookup(&self, id: &str) -> Result<&LogicalType, CatalogError> {
        self.index
            .get(id)
            .map(|&idx| &self.types[idx])
            .ok_or_else(|| CatalogError::UnknownType(id.to_string()))
    }
}

/// Checks that depend only on the type itself.
fn check_shape(ty: &LogicalType) -> Result<(), CatalogError> {
    if !ty.id.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(CatalogError::invalid_shape(
            &ty.id,
            "id must contain at least one ASCII letter or digit",
        ));
    }

    match &ty.shape {
        TypeShape::Struct { fields } => {
            if fields.is_empty() {
                return Err(CatalogError::invalid_shape(&ty.id, "struct has no fields"));
            }
            let mut seen = HashSet::new();
            for field in fields {
                if !is_valid_c_identifier(&field.name) {
                    return Err(CatalogError::invalid_shape(
                        &ty.id,
                        format!("field '{}' is not a valid identifier", field.name),
                    ));
                }
                if is_c_keyword(&field.name) {
                    return Err(CatalogError::invalid_shape(
                        &ty.id,
                        format!("field '{}' is a reserved word", field.name),
                    ));
                }
                if !seen.insert(field.name.as_str()) {
                    return Err(CatalogError::invalid_shape(
                        &ty.id,
                        format!("field '{}' is declared twice", field.name),
                    ));
                }
            }
            Ok(())
        }
        TypeShape::FixedArray { arity: 0, .. } | TypeShape::StructArray { arity: 0, .. } => Err(
            CatalogError::invalid_shape(&ty.id, "arity must be non-zero"),
        ),
        _ => Ok(()),
    }
}

/// An immutable, validated set of logical types in registration order.
///
/// Safe to share across threads for concurrent reads.
#[derive(Debug, Clone)]
pub struct Catalog {
    naming: NamingScheme,
    types: Vec<LogicalType>,
    layouts: Vec<LayoutDescriptor>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Build a catalog from a list of types, in order.
    pub fn from_types(
        naming: NamingScheme,
        types: impl IntoIterator<Item = LogicalType>,
    ) -> Result<Self, CatalogError> {
        let mut builder = CatalogBuilder::with_naming(naming);
        builder.register_all(types)?;
        Ok(builder.build())
    }

    pub fn naming(&self) -> NamingScheme {
        self.naming
    }

    pub fn lookup(&self, id: &str) -> Result<&LogicalType, CatalogError> {
        self.index
            .get(id)
            .map(|&idx| &self.types[idx])
            .ok_or_else(|| CatalogError::UnknownType(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All types in registration order. Each call starts a fresh pass.
    pub fn all_types(&self) -> std::slice::Iter<'_, LogicalType> {
        self.types.iter()
    }

    /// Every type paired with its cached layout, in registration order.
    pub fn layouts(&self) -> impl ExactSizeIterator<Item = (&LogicalType, &LayoutDescriptor)> {
        self.types.iter().zip(&self.layouts)
    }

    /// The cached layout of a registered type.
    pub fn layout(&self, id: &str) -> Result<&LayoutDescriptor, CatalogError> {
        self.index
            .get(id)
            .map(|&idx| &self.layouts[idx])
            .ok_or_else(|| CatalogError::UnknownType(id.to_string()))
    }

    pub fn external_name(&self, id: &str) -> Result<String, CatalogError> {
        self.lookup(id).map(|ty| self.naming.normalize(&ty.id))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Re-run every registration check over this catalog.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut builder = CatalogBuilder::with_naming(self.naming);
        builder.register_all(self.types.iter().cloned())?;
        for (ty, cached) in self.types.iter().zip(&self.layouts) {
            let derived = derive_layout(ty, self)?;
            if &derived != cached {
                return Err(CatalogError::invalid_shape(
                    &ty.id,
                    "cached layout does not match derivation",
                ));
            }
        }
        Ok(())
    }
}

impl TypeLookup for Catalog {
    fn lookup(&self, id: &str) -> Result<&LogicalType, CatalogError> {
        Catalog::lookup(self, id)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a LogicalType;
    type IntoIter = std::slice::Iter<'a, LogicalType>;

    fn into_iter(self) -> Self::IntoIter {
        self.all_types()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScalarKind::*;

    fn vec3() -> LogicalType {
        LogicalType::structure("VEC3_F32", [("x", Float32), ("y", Float32), ("z", Float32)])
    }

    #[test]
    fn test_register_and_lookup() {
        let mut builder = Catalog::builder();
        builder
            .register(vec3())
            .unwrap()
            .register(LogicalType::alias("COLOR_RGB", "VEC3_F32"))
            .unwrap();
        let catalog = builder.build();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lookup("VEC3_F32").unwrap().id, "VEC3_F32");
        assert_eq!(catalog.layout("COLOR_RGB").unwrap().size, 12);
        assert_eq!(catalog.external_name("COLOR_RGB").unwrap(), "FCOLOR_RGB");
        assert!(matches!(
            catalog.lookup("MISSING"),
            Err(CatalogError::UnknownType(id)) if id == "MISSING"
        ));
    }

    #[test]
    fn test_all_types_is_ordered_and_restartable() {
        let catalog = Catalog::from_types(
            NamingScheme::V1,
            vec![
                LogicalType::scalar_alias("ENTITY", UInt32),
                vec3(),
                LogicalType::fixed_array("MAT33_FLOAT", Float32, 9),
            ],
        )
        .unwrap();

        let first: Vec<_> = catalog.all_types().map(|t| t.id.as_str()).collect();
        let second: Vec<_> = catalog.all_types().map(|t| t.id.as_str()).collect();
        assert_eq!(first, vec!["ENTITY", "VEC3_F32", "MAT33_FLOAT"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_id_rejected_even_when_identical() {
        let mut builder = Catalog::builder();
        builder.register(vec3()).unwrap();
        assert_eq!(
            builder.register(vec3()).unwrap_err(),
            CatalogError::DuplicateId("VEC3_F32".to_string())
        );
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_alias_must_reference_registered_type() {
        let mut builder = Catalog::builder();
        assert_eq!(
            builder
                .register(LogicalType::alias("COLOR_RGB", "VEC3_F32"))
                .unwrap_err(),
            CatalogError::UnknownType("VEC3_F32".to_string())
        );

        let err = builder
            .register(LogicalType::alias("SELF", "SELF"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidShape { id, .. } if id == "SELF"));
    }

    #[test]
    fn test_invalid_shapes_rejected() {
        let mut builder = Catalog::builder();

        let empty = LogicalType::new("EMPTY", TypeShape::Struct { fields: vec![] });
        assert!(matches!(
            builder.register(empty),
            Err(CatalogError::InvalidShape { .. })
        ));

        let zero = LogicalType::fixed_array("ZERO", Float32, 0);
        assert!(matches!(
            builder.register(zero),
            Err(CatalogError::InvalidShape { .. })
        ));

        let keyword = LogicalType::structure("KW", [("float", Float32)]);
        assert!(matches!(
            builder.register(keyword),
            Err(CatalogError::InvalidShape { .. })
        ));

        let repeated = LogicalType::structure("REP", [("x", Float32), ("x", Float32)]);
        assert!(matches!(
            builder.register(repeated),
            Err(CatalogError::InvalidShape { .. })
        ));

        let unnamed = LogicalType::scalar_alias("::", UInt32);
        assert!(matches!(
            builder.register(unnamed),
            Err(CatalogError::InvalidShape { .. })
        ));

        let no_planes = LogicalType::struct_array("NO_PLANES", "VEC4_FLOAT", 0);
        assert!(matches!(
            builder.register(no_planes),
            Err(CatalogError::InvalidShape { ref id, .. }) if id == "NO_PLANES"
        ));

        let nested = LogicalType::struct_array("NESTED", "NESTED", 2);
        assert!(matches!(
            builder.register(nested),
            Err(CatalogError::InvalidShape { ref id, .. }) if id == "NESTED"
        ));

        let frustum = LogicalType::struct_array("FRUSTUM", "VEC4_FLOAT", 6);
        assert_eq!(
            builder.register(frustum).unwrap_err(),
            CatalogError::UnknownType("VEC4_FLOAT".to_string())
        );

        assert!(builder.is_empty());
    }

    #[test]
    fn test_name_collision_rejected() {
        let mut builder = Catalog::builder();
        builder.register(vec3()).unwrap();

        let err = builder
            .register(LogicalType::fixed_array("vec3_f32", Float32, 3))
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::NameCollision {
                first: "VEC3_F32".to_string(),
                second: "vec3_f32".to_string(),
                name: "FVEC3_F32".to_string(),
            }
        );
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_validate_built_catalog() {
        let catalog = Catalog::from_types(
            NamingScheme::V1,
            vec![vec3(), LogicalType::struct_array("TRIANGLE", "VEC3_F32", 3)],
        )
        .unwrap();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.layout("TRIANGLE").unwrap().size, 36);
    }

    #[test]
    fn test_catalog_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Catalog>();
    }
}
