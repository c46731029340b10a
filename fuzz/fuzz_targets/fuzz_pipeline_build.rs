#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|pairs: Vec<(String, String)>| {
    if pairs.len() > 64 { return; }
    let schema = autoquery::Schema::new("fuzz")
        .field("car.year", autoquery::FieldKind::Number)
        .field("seen", autoquery::FieldKind::Date);
    let dictionary = autoquery::Dictionary::new([("year", "car.year")]);
    let builder = autoquery::AutoQuery::create(schema, dictionary);
    let stages = builder.build_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    assert!(!stages.is_empty());
    for stage in &stages {
        let _ = stage.to_document();
    }
});
