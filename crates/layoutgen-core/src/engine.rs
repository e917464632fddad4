//! Built-in value types of the engine's public API
//!
//! The catalog grew in three steps. Each revision registers everything its
//! predecessor did, in the same order, and appends new types at the end, so
//! earlier bindings keep both their layouts and their external names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::naming::NamingScheme;
use crate::types::{LogicalType, ScalarKind, ScalarKind::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineRevision {
    /// Matrices and vectors only
    Initial,
    /// Adds entity and component instance handles
    EntityHandles,
    /// Adds sampler parameters, colors, 3x3 matrices, quaternions and frustums
    Current,
}

impl EngineRevision {
    pub const ALL: [EngineRevision; 3] = [
        EngineRevision::Initial,
        EngineRevision::EntityHandles,
        EngineRevision::Current,
    ];

    pub fn latest() -> Self {
        EngineRevision::Current
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EngineRevision::Initial => "initial",
            EngineRevision::EntityHandles => "entity_handles",
            EngineRevision::Current => "current",
        }
    }

    /// The value types of this revision, in registration order.
    pub fn types(self) -> Vec<LogicalType> {
        let mut types = math_types();
        if self >= EngineRevision::EntityHandles {
            types.extend(handle_types());
        }
        if self >= EngineRevision::Current {
            types.extend(current_types());
        }
        types
    }

    pub fn catalog(self) -> Result<Catalog, CatalogError> {
        Catalog::from_types(NamingScheme::V1, self.types())
    }
}

impl fmt::Display for EngineRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineRevision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EngineRevision::ALL
            .into_iter()
            .find(|rev| rev.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown engine revision '{}' (expected one of: initial, entity_handles, current)",
                    s
                )
            })
    }
}

fn vec2(id: &str, scalar: ScalarKind, native: &str) -> LogicalType {
    LogicalType::structure(id, [("x", scalar), ("y", scalar)]).with_native_name(native)
}

fn vec3(id: &str, scalar: ScalarKind, native: &str) -> LogicalType {
    LogicalType::structure(id, [("x", scalar), ("y", scalar), ("z", scalar)])
        .with_native_name(native)
}

fn vec4(id: &str, scalar: ScalarKind, native: &str) -> LogicalType {
    LogicalType::structure(id, [("x", scalar), ("y", scalar), ("z", scalar), ("w", scalar)])
        .with_native_name(native)
}

fn math_types() -> Vec<LogicalType> {
    vec![
        LogicalType::fixed_array("MAT44_DOUBLE", Float64, 16)
            .with_native_name("filament::math::mat4")
            .with_doc("4x4 double matrix, column-major"),
        LogicalType::fixed_array("MAT44_FLOAT", Float32, 16)
            .with_native_name("filament::math::mat4f")
            .with_doc("4x4 float matrix, column-major"),
        vec2("VEC2_DOUBLE", Float64, "filament::math::double2"),
        vec2("VEC2_FLOAT", Float32, "filament::math::float2"),
        vec3("VEC3_DOUBLE", Float64, "filament::math::double3"),
        vec3("VEC3_FLOAT", Float32, "filament::math::float3"),
        vec4("VEC4_DOUBLE", Float64, "filament::math::double4"),
        vec4("VEC4_FLOAT", Float32, "filament::math::float4"),
    ]
}

fn handle_types() -> Vec<LogicalType> {
    vec![
        LogicalType::scalar_alias("ENTITY", UInt32)
            .with_native_name("utils::Entity")
            .with_doc("Opaque entity handle"),
        LogicalType::scalar_alias("LIGHT_INSTANCE", UInt32)
            .with_doc("Light component instance of an entity"),
        LogicalType::scalar_alias("TRANSFORM_INSTANCE", UInt32)
            .with_doc("Transform component instance of an entity"),
    ]
}

fn current_types() -> Vec<LogicalType> {
    vec![
        // Packed bit-field; only its width is part of the contract
        LogicalType::scalar_alias("SAMPLER_PARAMS", UInt32)
            .with_native_name("filament::backend::SamplerParams")
            .with_doc("Packed sampler parameters, treated as an opaque 32-bit value"),
        LogicalType::alias("LINEAR_COLOR", "VEC3_FLOAT")
            .with_native_name("filament::LinearColor")
            .with_doc("Linear RGB color"),
        LogicalType::alias("LINEAR_COLOR_A", "VEC4_FLOAT")
            .with_native_name("filament::LinearColorA")
            .with_doc("Linear RGBA color"),
        LogicalType::fixed_array("MAT33_DOUBLE", Float64, 9)
            .with_native_name("filament::math::mat3")
            .with_doc("3x3 double matrix, column-major"),
        LogicalType::fixed_array("MAT33_FLOAT", Float32, 9)
            .with_native_name("filament::math::mat3f")
            .with_doc("3x3 float matrix, column-major"),
        LogicalType::fixed_array("QUATERNION_FLOAT", Float32, 4)
            .with_native_name("filament::math::quatf")
            .with_doc("Float quaternion stored as x, y, z, w"),
        LogicalType::struct_array("FRUSTUM", "VEC4_FLOAT", 6)
            .with_native_name("filament::Frustum")
            .with_doc("Six clip planes"),
    ]
}
