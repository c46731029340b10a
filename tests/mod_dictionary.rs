use autoquery::Dictionary;
use std::collections::BTreeMap;

fn vehicles() -> Dictionary {
    Dictionary::new([("vehicle.model", "car.model"), ("vehicle.year", "car.year")])
}

#[test]
fn resolve_both_directions() {
    let d = vehicles();
    assert_eq!(d.resolve("vehicle.year"), Some("car.year"));
    assert_eq!(d.resolve_inverse("car.model"), Some("vehicle.model"));
    assert_eq!(d.resolve("car.year"), None);
    assert_eq!(d.resolve_inverse("vehicle.year"), None);
    assert_eq!(d.len(), 2);
    assert!(!d.is_empty());
    assert!(Dictionary::default().is_empty());
}

#[test]
fn resolve_or_raw_falls_back() {
    let d = vehicles();
    assert_eq!(d.resolve_or_raw("vehicle.model"), "car.model");
    assert_eq!(d.resolve_or_raw("name"), "name");
}

#[test]
fn duplicate_public_names_keep_last() {
    let d = Dictionary::new([("year", "car.year"), ("year", "built")]);
    assert_eq!(d.resolve("year"), Some("built"));
    assert_eq!(d.len(), 1);
}

#[test]
fn invert_swaps_pairs() {
    let forward =
        BTreeMap::from([("a".to_string(), "x".to_string()), ("b".to_string(), "y".to_string())]);
    let inverse = Dictionary::invert(&forward);
    assert_eq!(inverse.get("x").map(String::as_str), Some("a"));
    assert_eq!(inverse.get("y").map(String::as_str), Some("b"));

    let shared =
        BTreeMap::from([("a".to_string(), "x".to_string()), ("b".to_string(), "x".to_string())]);
    assert_eq!(Dictionary::invert(&shared).get("x").map(String::as_str), Some("b"));
}

#[test]
fn transform_keys_renames_and_keeps_unmapped() {
    let d = vehicles();
    let input = BTreeMap::from([("vehicle.year".to_string(), 1), ("likes".to_string(), 2)]);
    let out = d.transform_keys(&input);
    assert_eq!(out, vec![("likes".to_string(), &2), ("car.year".to_string(), &1)]);
}

#[test]
fn iter_and_conversions() {
    let d: Dictionary = [("firstName", "name")].into_iter().collect();
    assert_eq!(d.iter().collect::<Vec<_>>(), vec![("firstName", "name")]);
    let map: BTreeMap<String, String> = d.clone().into();
    assert_eq!(Dictionary::from(map), d);
}

#[test]
fn serde_as_flat_table() {
    let d = vehicles();
    let json = serde_json::to_string(&d).unwrap();
    assert_eq!(json, r#"{"vehicle.model":"car.model","vehicle.year":"car.year"}"#);
    let back: Dictionary = serde_json::from_str(&json).unwrap();
    assert_eq!(back.resolve_inverse("car.year"), Some("vehicle.year"));
}
