/// Scenario 3: Re-delivery of an unchanged observation
///
/// Identical content for an already cached identity produces no output.
mod common;

use common::{deployment, quiet_engine, spec_only, take_output};
use serde_json::json;
use yadt_core::{ChangeEvent, Outcome};

#[test]
fn test_scenario_03_identical_event_is_silent() {
    // GIVEN identity A observed twice, ending at replicas 3
    let mut engine = quiet_engine();
    for replicas in [1, 3] {
        engine
            .process(ChangeEvent::applied(spec_only("a", json!({"replicas": replicas}))))
            .unwrap();
    }
    take_output(&mut engine);

    // WHEN the same content arrives again
    let outcome = engine
        .process(ChangeEvent::applied(spec_only("a", json!({"replicas": 3}))))
        .unwrap();

    // THEN nothing at all is written
    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(take_output(&mut engine), "");
}

#[test]
fn test_scenario_03_metadata_only_change_is_silent() {
    // GIVEN a cached deployment
    let mut engine = quiet_engine();
    let first = deployment("a", json!({"replicas": 1}), json!({}));
    engine.process(ChangeEvent::applied(first.clone())).unwrap();
    take_output(&mut engine);

    // WHEN only metadata changes
    let mut bumped = first;
    bumped["metadata"]["resourceVersion"] = json!("101");
    bumped["metadata"]["labels"]["tier"] = json!("frontend");
    let outcome = engine.process(ChangeEvent::applied(bumped)).unwrap();

    // THEN metadata is outside the recognized sections and nothing prints
    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(take_output(&mut engine), "");
}

#[test]
fn test_scenario_03_other_identity_is_not_a_repeat() {
    let mut engine = quiet_engine();
    engine
        .process(ChangeEvent::applied(spec_only("a", json!({"replicas": 3}))))
        .unwrap();
    take_output(&mut engine);

    let outcome = engine
        .process(ChangeEvent::applied(spec_only("b", json!({"replicas": 3}))))
        .unwrap();

    assert!(matches!(outcome, Outcome::FirstSeen { .. }));
    assert!(take_output(&mut engine).starts_with("diff deployment.apps default/b\n"));
    assert_eq!(engine.cache().len(), 2);
}
