#![no_main]

use libfuzzer_sys::fuzz_target;

use monkey_interpreter::parser::Parser;

fuzz_target!(|data: &[u8]| {
    // the parser collects errors instead of panicking, whatever the input
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = Parser::parse(s);
    }
});
