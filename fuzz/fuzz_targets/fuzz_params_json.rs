#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        let schema = autoquery::Schema::new("fuzz").field("n", autoquery::FieldKind::Number);
        if let Ok(params) = autoquery::query::parse_params_json(s) {
            let query = autoquery::QueryBuilder::new(schema.clone()).build(&params);
            let _ = query.filter_document();
            let _ = query.sort_document();
        }
        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(s) {
            let _ = autoquery::AutoQuery::new(schema).build(&map);
        }
    }
});
