#![no_main]

use libfuzzer_sys::fuzz_target;
use voeis::store::{parse_number_line, write_number_line};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Whatever parses must survive a write/parse cycle unchanged
        if let Ok(record) = parse_number_line(input, 6, 12) {
            let mut line = Vec::new();
            write_number_line(&mut line, &record).unwrap();
            let line = String::from_utf8(line).unwrap();
            let again = parse_number_line(line.trim_end_matches('\n'), 6, 12).unwrap();
            assert_eq!(again, record);
        }
    }
});
