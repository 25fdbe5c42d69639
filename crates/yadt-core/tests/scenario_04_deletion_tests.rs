/// Scenario 4: Deletion of a resource
///
/// A deletion evicts the cache entry and prints the removal of the last
/// known recognized sections. A later re-creation counts as a first
/// observation again.
mod common;

use common::{quiet_engine, rule, spec_only, take_output};
use serde_json::json;
use yadt_core::{ChangeEvent, Outcome};

#[test]
fn test_scenario_04_delete_prints_last_cached_state() {
    // GIVEN identity A cached with replicas 3
    let mut engine = quiet_engine();
    engine
        .process(ChangeEvent::applied(spec_only("a", json!({"replicas": 3}))))
        .unwrap();
    take_output(&mut engine);

    // WHEN a deletion arrives whose final object says replicas 0
    let outcome = engine
        .process(ChangeEvent::deleted(spec_only("a", json!({"replicas": 0}))))
        .unwrap();

    // THEN the cached state is shown as removed and the entry is gone
    assert_eq!(outcome, Outcome::Deleted);
    assert_eq!(
        take_output(&mut engine),
        format!(
            "diff deployment.apps default/a\n{}\n- resource deleted\n- spec:\n-   \"replicas\": 3\n\n",
            rule()
        )
    );
    assert!(engine.cache().is_empty());
}

#[test]
fn test_scenario_04_recreate_after_delete_is_first_seen() {
    let mut engine = quiet_engine();
    engine
        .process(ChangeEvent::applied(spec_only("a", json!({"replicas": 3}))))
        .unwrap();
    engine
        .process(ChangeEvent::deleted(spec_only("a", json!({"replicas": 3}))))
        .unwrap();
    take_output(&mut engine);

    let outcome = engine
        .process(ChangeEvent::applied(spec_only("a", json!({"replicas": 3}))))
        .unwrap();

    assert!(matches!(outcome, Outcome::FirstSeen { ref nodes } if nodes.len() == 1));
    assert!(take_output(&mut engine).contains("+ spec:\n"));
}

#[test]
fn test_scenario_04_delete_of_unknown_resource() {
    let mut engine = quiet_engine();

    let outcome = engine
        .process(ChangeEvent::deleted(spec_only("ghost", json!({"replicas": 1}))))
        .unwrap();

    assert_eq!(outcome, Outcome::DeletedUnknown);
    assert!(engine.cache().is_empty());
    assert!(take_output(&mut engine).contains("- resource deleted\n"));
}
