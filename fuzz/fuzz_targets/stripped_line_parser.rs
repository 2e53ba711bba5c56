#![no_main]

use libfuzzer_sys::fuzz_target;
use voeis::corpus::{parse_name_line, parse_stripped_line};

fuzz_target!(|data: &[u8]| {
    // The corpus is read lossily, so any byte string is a possible line
    let input = String::from_utf8_lossy(data);
    let _ = parse_stripped_line(&input);
    let _ = parse_name_line(&input);
});
