//! Declarative catalog definitions
//!
//! The generator hands over its value types as a flat list of entries, one
//! per type, in a TOML or JSON document:
//!
//! ```toml
//! naming = "v1"
//!
//! [[types]]
//! id = "VEC3_FLOAT"
//! kind = "named_field_struct"
//! native_name = "filament::math::float3"
//! fields = [
//!     { name = "x", scalar = "float32" },
//!     { name = "y", scalar = "float32" },
//!     { name = "z", scalar = "float32" },
//! ]
//!
//! [[types]]
//! id = "LINEAR_COLOR"
//! kind = "type_alias"
//! alias_of = "VEC3_FLOAT"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Catalog, CatalogBuilder};
use crate::error::{CatalogError, DefinitionError};
use crate::naming::NamingScheme;
use crate::types::{FieldDef, LogicalType, ScalarKind, TypeKind, TypeShape};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogDefinition {
    #[serde(default)]
    pub naming: NamingScheme,
    #[serde(default)]
    pub types: Vec<TypeEntry>,
}

/// One entry of the declarative list. Which optional fields are required
/// depends on `kind`; extra fields for another kind are rejected, and so
/// are keys that belong to no kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeEntry {
    pub id: String,
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalar: Option<ScalarKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldDef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl TypeEntry {
    fn require<T>(&self, value: Option<T>, what: &str) -> Result<T, CatalogError> {
        value.ok_or_else(|| {
            CatalogError::invalid_shape(&self.id, format!("{} requires '{}'", self.kind, what))
        })
    }

    fn forbid<T>(&self, value: &Option<T>, what: &str) -> Result<(), CatalogError> {
        match value {
            Some(_) => Err(CatalogError::invalid_shape(
                &self.id,
                format!("'{}' is not allowed for {}", what, self.kind),
            )),
            None => Ok(()),
        }
    }

    fn shape(&self) -> Result<TypeShape, CatalogError> {
        match self.kind {
            TypeKind::ScalarAlias => {
                self.forbid(&self.fields, "fields")?;
                self.forbid(&self.arity, "arity")?;
                self.forbid(&self.alias_of, "alias_of")?;
                self.forbid(&self.element, "element")?;
                Ok(TypeShape::ScalarAlias {
                    scalar: self.require(self.scalar, "scalar")?,
                })
            }
            TypeKind::FixedArrayOfScalars => {
                self.forbid(&self.fields, "fields")?;
                self.forbid(&self.alias_of, "alias_of")?;
                self.forbid(&self.element, "element")?;
                Ok(TypeShape::FixedArray {
                    scalar: self.require(self.scalar, "scalar")?,
                    arity: self.require(self.arity, "arity")?,
                })
            }
            TypeKind::NamedFieldStruct => {
                self.forbid(&self.scalar, "scalar")?;
                self.forbid(&self.arity, "arity")?;
                self.forbid(&self.alias_of, "alias_of")?;
                self.forbid(&self.element, "element")?;
                Ok(TypeShape::Struct {
                    fields: self.require(self.fields.clone(), "fields")?,
                })
            }
            TypeKind::StructArray => {
                self.forbid(&self.scalar, "scalar")?;
                self.forbid(&self.fields, "fields")?;
                self.forbid(&self.alias_of, "alias_of")?;
                Ok(TypeShape::StructArray {
                    element: self.require(self.element.clone(), "element")?,
                    arity: self.require(self.arity, "arity")?,
                })
            }
            TypeKind::TypeAlias => {
                self.forbid(&self.scalar, "scalar")?;
                self.forbid(&self.fields, "fields")?;
                self.forbid(&self.arity, "arity")?;
                self.forbid(&self.element, "element")?;
                Ok(TypeShape::Alias {
                    target: self.require(self.alias_of.clone(), "alias_of")?,
                })
            }
        }
    }
}

impl TryFrom<&TypeEntry> for LogicalType {
    type Error = CatalogError;

    fn try_from(entry: &TypeEntry) -> Result<Self, Self::Error> {
        Ok(LogicalType {
            id: entry.id.clone(),
            shape: entry.shape()?,
            native_name: entry.native_name.clone(),
            doc: entry.doc.clone(),
        })
    }
}

impl From<&LogicalType> for TypeEntry {
    fn from(ty: &LogicalType) -> Self {
        let mut entry = TypeEntry {
            id: ty.id.clone(),
            kind: ty.kind(),
            scalar: None,
            fields: None,
            arity: None,
            alias_of: None,
            element: None,
            native_name: ty.native_name.clone(),
            doc: ty.doc.clone(),
        };
        match &ty.shape {
            TypeShape::ScalarAlias { scalar } => entry.scalar = Some(*scalar),
            TypeShape::FixedArray { scalar, arity } => {
                entry.scalar = Some(*scalar);
                entry.arity = Some(*arity);
            }
            TypeShape::Struct { fields } => entry.fields = Some(fields.clone()),
            TypeShape::StructArray { element, arity } => {
                entry.element = Some(element.clone());
                entry.arity = Some(*arity);
            }
            TypeShape::Alias { target } => entry.alias_of = Some(target.clone()),
        }
        entry
    }
}

impl CatalogDefinition {
    pub fn from_toml_str(content: &str) -> Result<Self, DefinitionError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a definition file; `.json` files are read as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        let content = std::fs::read_to_string(path)?;
        debug!("Loading catalog definition from {}", path.display());
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Describe an existing catalog as a definition document.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            naming: catalog.naming(),
            types: catalog.all_types().map(TypeEntry::from).collect(),
        }
    }

    /// Register every entry, in order, into a fresh catalog.
    pub fn build(&self) -> Result<Catalog, CatalogError> {
        let mut builder = CatalogBuilder::with_naming(self.naming);
        for entry in &self.types {
            builder.register(LogicalType::try_from(entry)?)?;
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DEFINITION: &str = r#"
naming = "v1"

[[types]]
id = "VEC3_F32"
kind = "named_field_struct"
native_name = "filament::math::float3"
fields = [
    { name = "x", scalar = "float32" },
    { name = "y", scalar = "float32" },
    { name = "z", scalar = "float32" },
]

[[types]]
id = "COLOR_RGB"
kind = "type_alias"
alias_of = "VEC3_F32"

[[types]]
id = "MAT44_F64"
kind = "fixed_array_of_scalars"
scalar = "float64"
arity = 16
"#;

    #[test]
    fn test_build_from_toml() {
        let catalog = CatalogDefinition::from_toml_str(DEFINITION)
            .unwrap()
            .build()
            .unwrap();

        let ids: Vec<_> = catalog.all_types().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["VEC3_F32", "COLOR_RGB", "MAT44_F64"]);
        assert_eq!(
            catalog.lookup("VEC3_F32").unwrap().native_name.as_deref(),
            Some("filament::math::float3")
        );
        assert_eq!(catalog.layout("COLOR_RGB").unwrap().size, 12);
        assert_eq!(catalog.layout("MAT44_F64").unwrap().size, 128);
    }

    #[test]
    fn test_definition_of_catalog_rebuilds_identically() {
        let definition = CatalogDefinition::from_toml_str(DEFINITION).unwrap();
        let catalog = definition.build().unwrap();

        let described = CatalogDefinition::from_catalog(&catalog);
        assert_eq!(described, definition);
    }

    #[test]
    fn test_missing_and_extra_fields_rejected() {
        let missing = r#"
[[types]]
id = "MAT"
kind = "fixed_array_of_scalars"
scalar = "float32"
"#;
        let err = CatalogDefinition::from_toml_str(missing)
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidShape { ref id, .. } if id == "MAT"));

        let extra = r#"
[[types]]
id = "ENTITY"
kind = "scalar_alias"
scalar = "uint32"
arity = 2
"#;
        let err = CatalogDefinition::from_toml_str(extra)
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidShape { ref id, .. } if id == "ENTITY"));
    }

    #[test]
    fn test_uint32_scalars_parse() {
        let toml_text = r#"
[[types]]
id = "ENTITY"
kind = "scalar_alias"
scalar = "uint32"
native_name = "utils::Entity"

[[types]]
id = "SAMPLER_PARAMS"
kind = "scalar_alias"
scalar = "uint32"
"#;
        let definition = CatalogDefinition::from_toml_str(toml_text).unwrap();
        assert_eq!(definition.types[0].scalar, Some(ScalarKind::UInt32));
        assert_eq!(definition.types[1].scalar, Some(ScalarKind::UInt32));

        let json = r#"{ "types": [{ "id": "ENTITY", "kind": "scalar_alias", "scalar": "uint32" }] }"#;
        let definition = CatalogDefinition::from_json_str(json).unwrap();
        assert_eq!(definition.types[0].scalar, Some(ScalarKind::UInt32));

        // Written back with the same spelling
        let written = toml::to_string(&definition).unwrap();
        assert!(written.contains("scalar = \"uint32\""), "{}", written);
    }

    #[test]
    fn test_misspelled_keys_rejected() {
        let misspelled = r#"
[[types]]
id = "ENTITY"
kind = "scalar_alias"
scalar = "uint32"
native_nam = "utils::Entity"
"#;
        assert!(matches!(
            CatalogDefinition::from_toml_str(misspelled),
            Err(DefinitionError::Toml(_))
        ));

        let json = r#"{ "type": [] }"#;
        assert!(matches!(
            CatalogDefinition::from_json_str(json),
            Err(DefinitionError::Json(_))
        ));
    }

    #[test]
    fn test_json_definition() {
        let json = r#"{
            "types": [
                { "id": "ENTITY", "kind": "scalar_alias", "scalar": "uint32" },
                { "id": "LIGHT_INSTANCE", "kind": "type_alias", "alias_of": "ENTITY" }
            ]
        }"#;
        let catalog = CatalogDefinition::from_json_str(json).unwrap().build().unwrap();
        assert_eq!(catalog.naming(), NamingScheme::V1);
        assert_eq!(
            catalog.layout("LIGHT_INSTANCE").unwrap(),
            catalog.layout("ENTITY").unwrap()
        );
    }
}
