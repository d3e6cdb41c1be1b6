#![no_main]
use headerparser::{types, Additional, Field, HeaderParser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let mut parser = HeaderParser::new();
    parser.add_field(Field::new("Package").alias("Source")).unwrap();
    parser.add_field(Field::new("Version").with_type(types::integer)).unwrap();
    parser.add_field(Field::new("Description").unfold()).unwrap();
    parser.add_field(Field::new("Tag").multiple().with_type(types::lower)).unwrap();
    parser.add_field(Field::new("Enabled").with_type(types::boolean).default(false)).unwrap();
    parser.add_additional(Additional::new()).unwrap();

    let _ = parser.parse(data);
    for record in parser.parse_stanzas(data) {
        let _ = record;
    }
});
