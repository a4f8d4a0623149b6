//! Layering contract tests.

mod support;

use support::architecture::{mentions, mod_file_code, source};

#[test]
fn domain_has_no_framework_or_outer_layer_imports() {
    let offenses = mentions(
        "src/domain",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "crate::port",
            "tokio::",
            "diesel::",
        ],
    );

    assert!(
        offenses.is_empty(),
        "found forbidden imports in domain layer: {offenses:#?}"
    );
}

#[test]
fn ports_depend_only_on_domain() {
    let offenses = mentions(
        "src/port",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "diesel::",
        ],
    );

    assert!(offenses.is_empty(), "found outer layer imports in ports: {offenses:#?}");
}

#[test]
fn application_does_not_reach_adapters() {
    let offenses = mentions(
        "src/application",
        &["crate::adapter", "crate::infrastructure", "diesel::"],
    );

    assert!(
        offenses.is_empty(),
        "application services must go through store ports: {offenses:#?}"
    );
}

#[test]
fn sqlite_access_stays_in_its_adapter() {
    let offenses = mentions("src/adapter/inbound", &["diesel::", "SqliteStore"]);
    assert!(offenses.is_empty(), "CLI must not touch SQLite directly: {offenses:#?}");
}

#[test]
fn mod_rs_is_export_only() {
    // The CLI root owns the dispatcher.
    let offenses = mod_file_code("src", &["src/adapter/inbound/cli/mod.rs"]);
    assert!(
        offenses.is_empty(),
        "found non-export content in mod.rs files: {offenses:#?}"
    );
}

#[test]
fn vote_decision_is_a_pure_function() {
    let vote = source("src/domain/vote.rs");
    assert!(
        vote.text
            .contains("pub const fn decide(current: Option<Vote>, requested: RequestedVote) -> Decision"),
        "vote transitions should be decided by a pure `decide` function"
    );
}

#[test]
fn sqlite_tally_update_is_relative() {
    let store = source("src/adapter/outbound/sqlite/store.rs");
    assert!(
        store
            .text
            .contains("subjects::vote_tally.eq(subjects::vote_tally + change.delta)"),
        "tally must be adjusted by delta, never overwritten with a computed total"
    );
}

#[test]
fn sqlite_vote_changes_match_the_vote_they_were_decided_from() {
    let store = source("src/adapter/outbound/sqlite/store.rs");
    let guarded = store
        .production_lines()
        .filter(|(_, line)| line.contains(".filter(votes::vote.eq(vote_column(*expected)))"))
        .count();
    assert_eq!(guarded, 2, "updates and deletes of vote records must compare the held vote");
}
