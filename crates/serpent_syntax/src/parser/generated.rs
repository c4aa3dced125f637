//! The Python parser generated from `grammar/python.gram` by the build script.

include!(concat!(env!("OUT_DIR"), "/python_parser.rs"));
