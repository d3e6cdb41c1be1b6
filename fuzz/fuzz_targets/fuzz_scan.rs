#![no_main]
use headerparser::{scan, scan_stanzas, ScanEvent, Scanner};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let events: Vec<_> = scan(data).collect();
    let bodies = events
        .iter()
        .filter(|e| matches!(e, Ok(ScanEvent::Body(_))))
        .count();
    assert!(bodies <= 1);

    let _: Vec<_> = scan_stanzas(data).collect();

    let mut scanner = Scanner::from_text(data);
    if let Ok(stanza) = scanner.scan_next_stanza() {
        let _ = stanza.count();
    }
    if !scanner.is_exhausted() {
        let _ = scanner.get_unscanned();
    }
});
