//! Property tests for layout derivation

use layoutgen_core::{
    derive_layout, Catalog, CatalogBuilder, LogicalType, NamingScheme, ScalarKind,
};
use proptest::prelude::*;

fn scalar_strategy() -> impl Strategy<Value = ScalarKind> {
    prop_oneof![
        Just(ScalarKind::Bool32),
        Just(ScalarKind::UInt32),
        Just(ScalarKind::Float32),
        Just(ScalarKind::Float64),
    ]
}

fn struct_strategy() -> impl Strategy<Value = LogicalType> {
    prop::collection::vec(scalar_strategy(), 1..12).prop_map(|scalars| {
        LogicalType::structure(
            "GENERATED",
            scalars
                .into_iter()
                .enumerate()
                .map(|(i, scalar)| (format!("f{}", i), scalar)),
        )
    })
}

fn type_strategy() -> impl Strategy<Value = LogicalType> {
    prop_oneof![
        scalar_strategy().prop_map(|s| LogicalType::scalar_alias("GENERATED", s)),
        (scalar_strategy(), 1u32..64)
            .prop_map(|(s, arity)| LogicalType::fixed_array("GENERATED", s, arity)),
        struct_strategy(),
    ]
}

fn catalog_with(ty: LogicalType) -> Catalog {
    let mut builder = CatalogBuilder::with_naming(NamingScheme::V1);
    builder.register(ty).unwrap();
    builder.build()
}

proptest! {
    #[test]
    fn derivation_is_deterministic(ty in type_strategy()) {
        let catalog = catalog_with(ty.clone());
        let first = derive_layout(&ty, &catalog).unwrap();
        let second = derive_layout(&ty, &catalog).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(catalog.layout("GENERATED").unwrap(), &first);
    }

    #[test]
    fn alias_matches_target(ty in type_strategy()) {
        let mut builder = CatalogBuilder::new();
        builder.register(ty).unwrap();
        builder.register(LogicalType::alias("ALIAS", "GENERATED")).unwrap();
        builder.register(LogicalType::alias("ALIAS_OF_ALIAS", "ALIAS")).unwrap();
        let catalog = builder.build();

        let target = catalog.layout("GENERATED").unwrap();
        prop_assert_eq!(catalog.layout("ALIAS").unwrap(), target);
        prop_assert_eq!(catalog.layout("ALIAS_OF_ALIAS").unwrap(), target);
    }

    #[test]
    fn struct_fields_keep_declaration_order(ty in struct_strategy()) {
        let catalog = catalog_with(ty.clone());
        let layout = catalog.layout("GENERATED").unwrap();

        let declared: Vec<_> = ty.fields().iter().map(|f| f.name.as_str()).collect();
        let laid_out: Vec<_> = layout.fields().iter().map(|f| f.name.as_str()).collect();
        prop_assert_eq!(declared, laid_out);

        let mut end = 0;
        for field in layout.fields() {
            prop_assert!(field.offset >= end);
            prop_assert_eq!(field.offset % field.scalar.align(), 0);
            end = field.offset + field.scalar.size();
        }
        prop_assert!(layout.size >= end);
        prop_assert_eq!(layout.size % layout.align, 0);
    }

    #[test]
    fn arrays_are_packed(scalar in scalar_strategy(), arity in 1u32..256) {
        let catalog = catalog_with(LogicalType::fixed_array("GENERATED", scalar, arity));
        let layout = catalog.layout("GENERATED").unwrap();
        prop_assert_eq!(layout.size, scalar.size() * u64::from(arity));
        prop_assert_eq!(layout.align, scalar.align());
    }
}
