use autoquery::Dictionary;
use proptest::prelude::*;
use std::collections::BTreeMap;

proptest! {
    #[test]
    fn prop_injective_round_trip(
        map in proptest::collection::btree_map("[a-z]{1,8}(\\.[a-z]{1,8})?", "[a-z_]{1,10}", 0..16),
    ) {
        // Make the mapping injective by suffixing each storage path with its key.
        let entries: BTreeMap<String, String> =
            map.into_iter().map(|(k, v)| (k.clone(), format!("{v}.{k}"))).collect();
        let d = Dictionary::new(entries.clone());
        for (public, storage) in &entries {
            prop_assert_eq!(d.resolve(public), Some(storage.as_str()));
            prop_assert_eq!(d.resolve_inverse(storage), Some(public.as_str()));
        }
    }

    #[test]
    fn prop_unmapped_names_fall_back(name in "[A-Z][a-z]{0,8}") {
        let d = Dictionary::new([("vehicle.year", "car.year")]);
        prop_assert_eq!(d.resolve_or_raw(&name), name.as_str());
    }

    #[test]
    fn prop_transform_keys_preserves_values(
        map in proptest::collection::btree_map("[a-c]{1,3}", any::<i32>(), 0..12),
    ) {
        let d = Dictionary::new([("a", "x.a"), ("bb", "y.bb")]);
        let out = d.transform_keys(&map);
        prop_assert_eq!(out.len(), map.len());
        for ((original, value), (renamed, kept)) in map.iter().zip(&out) {
            prop_assert_eq!(value, *kept);
            prop_assert_eq!(renamed.as_str(), d.resolve_or_raw(original));
        }
    }
}
