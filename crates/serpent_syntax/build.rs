use std::env;
use std::path::PathBuf;

use serpent_pegen::{GeneratorConfig, generate_file};

/// Grammars compiled into this crate: source file and generated module name.
const GRAMMARS: &[(&str, &str)] = &[("python.gram", "python_parser.rs"), ("toy.gram", "toy_parser.rs")];

fn main() -> miette::Result<()> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").map_err(|e| miette::miette!("{e}"))?);
    let out_dir = PathBuf::from(env::var("OUT_DIR").map_err(|e| miette::miette!("{e}"))?);

    println!("cargo:rerun-if-changed=build.rs");
    let config = GeneratorConfig::new().with_runtime_path("::serpent_core");
    for (grammar, output) in GRAMMARS {
        let input = manifest_dir.join("grammar").join(grammar);
        println!("cargo:rerun-if-changed={}", input.display());
        generate_file(&input, &out_dir.join(output), &config)?;
    }
    Ok(())
}
