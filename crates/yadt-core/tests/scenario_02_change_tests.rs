/// Scenario 2: A changed observation
///
/// A scalar change renders as a removal line followed by an addition line,
/// and the header timestamp is shown only when more than a second has
/// passed since the last stamped header.
mod common;

use chrono::{Duration, Local};
use common::{clocked_engine, quiet_engine, rule, spec_only, take_output};
use serde_json::json;
use yadt_core::diff::Path;
use yadt_core::render::ManualClock;
use yadt_core::{ChangeEvent, Outcome};

#[test]
fn test_scenario_02_scalar_change_is_paired_lines() {
    // GIVEN identity A observed with replicas 1
    let mut engine = quiet_engine();
    engine
        .process(ChangeEvent::applied(spec_only("a", json!({"replicas": 1}))))
        .unwrap();
    take_output(&mut engine);

    // WHEN the next event carries replicas 3
    let outcome = engine
        .process(ChangeEvent::applied(spec_only("a", json!({"replicas": 3}))))
        .unwrap();

    // THEN the diff is a removal then an addition at spec.replicas
    match outcome {
        Outcome::Changed { nodes } => {
            assert_eq!(nodes.len(), 1);
            assert_eq!(nodes[0].path, Path::from_iter(["spec", "replicas"]));
        }
        other => panic!("expected a change, got {:?}", other),
    }
    assert_eq!(
        take_output(&mut engine),
        format!(
            "diff deployment.apps default/a\n{}\n- spec.replicas: 1\n+ spec.replicas: 3\n\n",
            rule()
        )
    );
}

#[test]
fn test_scenario_02_timestamp_only_after_a_second() {
    // GIVEN an engine whose clock is under test control
    let clock = ManualClock::new(Local::now());
    let mut engine = clocked_engine(clock.clone());

    // WHEN three headers are printed 200ms apart and a fourth 2s later
    let mut headers = Vec::new();
    for (replicas, wait_ms) in [(1, 0), (2, 200), (3, 200), (4, 2000)] {
        clock.advance(Duration::milliseconds(wait_ms));
        engine
            .process(ChangeEvent::applied(spec_only("a", json!({"replicas": replicas}))))
            .unwrap();
        headers.push(take_output(&mut engine).lines().next().unwrap_or_default().to_string());
    }

    // THEN only the first and the last carry an HH:MM:SS stamp
    let stamped: Vec<bool> = headers.iter().map(|h| !h.starts_with("diff ")).collect();
    assert_eq!(stamped, vec![true, false, false, true]);
    assert!(headers[3].ends_with(" diff deployment.apps default/a"));
    assert_eq!(headers[3].find(' '), Some(8));
}

#[test]
fn test_scenario_02_nested_and_sequence_changes() {
    let mut engine = quiet_engine();
    let v1 = json!({"template": {"containers": [{"name": "app", "image": "nginx:1"}]}});
    let v2 = json!({"template": {"containers": [
        {"name": "app", "image": "nginx:2"},
        {"name": "sidecar", "image": "envoy"}
    ]}});

    engine.process(ChangeEvent::applied(spec_only("a", v1))).unwrap();
    take_output(&mut engine);
    engine.process(ChangeEvent::applied(spec_only("a", v2))).unwrap();

    let text = take_output(&mut engine);
    assert!(text.contains(
        "- spec.template.containers[0].image: nginx:1\n+ spec.template.containers[0].image: nginx:2\n"
    ));
    assert!(text.contains(
        "+ spec.template.containers[1]:\n+   \"image\": \"envoy\",\n+   \"name\": \"sidecar\"\n"
    ));
}
