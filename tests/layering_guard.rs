//! Layering guardrails to keep the reflection core free of engine concerns.
//!
//! `reflectgrid_core` is what derived code links against. It must not depend on the engine, its
//! logging stack, or its locking primitives. This test scans the core crate's `Cargo.toml` and fails
//! if any of those appear in `[dependencies]`.

const FORBIDDEN: &[&str] = &["reflectgrid", "tracing", "parking_lot", "miette", "clap"];

fn dependency_names(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
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
fn core_does_not_depend_on_engine_stack() {
    let manifest = include_str!("../crates/reflectgrid_core/Cargo.toml");
    for name in dependency_names(manifest) {
        assert!(
            !FORBIDDEN.contains(&name.as_str()),
            "`{name}` must not appear in reflectgrid_core [dependencies]"
        );
    }
}

#[test]
fn derive_crate_only_generates_core_paths() {
    let source = include_str!("../crates/reflectgrid_derive/src/lib.rs");
    assert!(source.contains("::reflectgrid_core"));
    assert!(
        !source.contains("::reflectgrid::"),
        "derived code must not name the engine crate"
    );
}
