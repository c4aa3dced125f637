//! Layering guardrails between the workspace crates.
//!
//! `serpent_core` is the runtime every generated parser links against and depends on no other
//! workspace crate. `serpent_pegen` is a build-dependency of `serpent_syntax` and must never depend
//! on it. These tests scan the member manifests and fail on a forbidden edge.

/// Crate names appearing as keys in any dependency table of `manifest`.
fn dependency_names(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit a dependency table.
        if line.starts_with('[') {
            in_dependencies = line.ends_with("dependencies]");
            continue;
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Strip inline comments for robustness.
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn runtime_depends_on_no_workspace_crate() {
    let names = dependency_names(include_str!("../crates/serpent_core/Cargo.toml"));
    for name in names {
        assert!(!name.starts_with("serpent"), "serpent_core must not depend on `{name}`");
    }
}

#[test]
fn generator_does_not_depend_on_the_python_frontend() {
    let names = dependency_names(include_str!("../crates/serpent_pegen/Cargo.toml"));
    assert!(
        !names.iter().any(|n| n == "serpent_syntax"),
        "`serpent_syntax` must not appear in serpent_pegen's dependencies"
    );
}

#[test]
fn python_frontend_builds_its_parser_at_build_time() {
    let manifest = include_str!("../crates/serpent_syntax/Cargo.toml");
    let build_table = manifest
        .split("[build-dependencies]")
        .nth(1)
        .expect("serpent_syntax has build-dependencies");
    let build_table = build_table.split("\n[").next().unwrap_or("");
    assert!(build_table.contains("serpent_pegen"), "the generator must run from build.rs");
}
