//! Layering rules between domain, ports, application and adapters.

mod support;

use support::layers::{find_lines_containing, find_non_export_lines_in_mod_files};

#[test]
fn domain_has_no_framework_or_outer_layer_imports() {
    let hits = find_lines_containing(
        "src/domain",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "crate::port",
            "tokio::",
            "diesel::",
            "alloy_",
        ],
    );
    assert!(hits.is_empty(), "found forbidden imports in domain layer: {hits:#?}");
}

#[test]
fn ports_depend_only_on_domain() {
    let hits = find_lines_containing(
        "src/port",
        &["crate::adapter", "crate::infrastructure", "crate::application", "diesel::", "alloy_"],
    );
    assert!(hits.is_empty(), "found outer-layer imports in ports: {hits:#?}");
}

#[test]
fn scheduler_never_names_concrete_adapters() {
    let hits = find_lines_containing(
        "src/application",
        &["crate::adapter", "diesel::", "alloy_"],
    );
    assert!(hits.is_empty(), "application layer imports adapters: {hits:#?}");
}

#[test]
fn mod_rs_is_export_only() {
    let violations = find_non_export_lines_in_mod_files("src");
    assert!(
        violations.is_empty(),
        "found non-export content in mod.rs files: {violations:#?}"
    );
}
