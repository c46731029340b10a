#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        let tagged = autoquery::query::parse_operator(s);
        // Stripping a marker never grows the operand.
        assert!(tagged.operand.len() <= s.len());
        let values: Vec<autoquery::query::QueryScalar> = s.split(',').map(Into::into).collect();
        let p = autoquery::query::partition_negated(&values);
        assert_eq!(p.included.len() + p.excluded.len(), values.len());
    }
});
