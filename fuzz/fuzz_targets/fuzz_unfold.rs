#![no_main]
use headerparser::types::unfold;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let once = unfold(data);
    assert!(!once.contains(['\r', '\n']));
    assert_eq!(unfold(&once), once);
});
