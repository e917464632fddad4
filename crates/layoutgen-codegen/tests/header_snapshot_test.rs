//! Snapshot tests for the generated C header
//!
//! The header is the published contract, so any change to its text must be
//! reviewed through the snapshot.

use layoutgen_codegen::{CHeaderCodegen, Codegen};
use layoutgen_core::{Catalog, EngineRevision, LogicalType, NamingScheme, ScalarKind::*};
use insta::assert_snapshot;

fn small_catalog() -> Catalog {
    Catalog::from_types(
        NamingScheme::V1,
        vec![
            LogicalType::structure("VEC3_FLOAT", [("x", Float32), ("y", Float32), ("z", Float32)])
                .with_doc("Three packed floats"),
            LogicalType::alias("LINEAR_COLOR", "VEC3_FLOAT"),
            LogicalType::struct_array("TRIANGLE", "VEC3_FLOAT", 3),
            LogicalType::fixed_array("MAT33_FLOAT", Float32, 9),
            LogicalType::scalar_alias("ENTITY", UInt32),
        ],
    )
    .unwrap()
}

#[test]
fn test_snapshot_small_catalog() -> Result<(), Box<dyn std::error::Error>> {
    let header = CHeaderCodegen::new().generate(&small_catalog())?;
    assert_snapshot!("small_catalog_header", header);
    Ok(())
}

#[test]
fn test_header_is_byte_identical_across_runs() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = EngineRevision::Current.catalog()?;
    let first = CHeaderCodegen::new().generate(&catalog)?;
    let second = CHeaderCodegen::new().generate(&catalog.clone())?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_current_revision_header() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = EngineRevision::Current.catalog()?;
    let header = CHeaderCodegen::new().generate(&catalog)?;

    // Every typedef ends in " NAME;", once per type, in catalog order
    let mut last = 0;
    for ty in &catalog {
        let declared = format!(" {};\n", catalog.external_name(&ty.id)?);
        assert_eq!(header.matches(&declared).count(), 1, "{}", ty.id);
        let position = header.find(&declared).unwrap_or_default();
        assert!(position > last, "{} is out of order", ty.id);
        last = position;
    }

    assert!(header.contains("typedef FVEC3_FLOAT FLINEAR_COLOR;"));
    assert!(header.contains("typedef FVEC4_FLOAT FLINEAR_COLOR_A;"));
    assert!(header.contains("typedef uint32_t FSAMPLER_PARAMS;"));
    assert!(header.contains("    double m[16];\n} FMAT44_DOUBLE;"));
    assert!(header.contains("    FVEC4_FLOAT elements[6];\n} FFRUSTUM;"));
    assert!(header.contains("LAYOUTGEN_STATIC_ASSERT(sizeof(FFRUSTUM) == 96, \"FFRUSTUM size\");"));
    assert!(header.contains(
        "LAYOUTGEN_STATIC_ASSERT(offsetof(FVEC4_DOUBLE, w) == 24, \"FVEC4_DOUBLE.w offset\");"
    ));
    Ok(())
}
