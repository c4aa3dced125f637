#![no_main]

use libfuzzer_sys::fuzz_target;
use serpent::syntax::{Mode, parse_source, tokenize, unparse};

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // Fuzz the tokenizer on its own, then the parser
        let _ = tokenize(s, true);
        if let Ok(tree) = parse_source(s, Mode::Module) {
            let _ = unparse(&tree);
        }
    }
});
