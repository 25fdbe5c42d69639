use serde_json::{json, Value};
use yadt_core::render::{DiffRenderer, ManualClock, RenderOptions};
use yadt_core::{DiffEngine, DiffOptions, FieldFilter};

/// Engine writing plain text to a buffer, without timestamps
#[allow(dead_code)]
pub fn quiet_engine() -> DiffEngine<Vec<u8>> {
    engine_with_filter(FieldFilter::default())
}

/// Plain, untimestamped engine with the given filter
#[allow(dead_code)]
pub fn engine_with_filter(filter: FieldFilter) -> DiffEngine<Vec<u8>> {
    let options = DiffOptions {
        filter,
        render: RenderOptions {
            show_timestamp: false,
            ..RenderOptions::default()
        },
        ..DiffOptions::default()
    };
    DiffEngine::new(options, Vec::new())
}

/// Engine with timestamps driven by a manual clock
#[allow(dead_code)]
pub fn clocked_engine(clock: ManualClock) -> DiffEngine<Vec<u8>> {
    let options = DiffOptions::default();
    let renderer = DiffRenderer::with_clock(options.render.clone(), clock);
    DiffEngine::with_renderer(options, renderer, Vec::new())
}

/// Drain everything the engine has written so far
#[allow(dead_code)]
pub fn take_output(engine: &mut DiffEngine<Vec<u8>>) -> String {
    String::from_utf8(std::mem::take(engine.sink_mut())).unwrap()
}

/// The 80-column rule under every header
#[allow(dead_code)]
pub fn rule() -> String {
    "-".repeat(80)
}

/// A deployment named `name` in `default` with the given spec and status
#[allow(dead_code)]
pub fn deployment(name: &str, spec: Value, status: Value) -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": name,
            "namespace": "default",
            "labels": {"app": name},
            "resourceVersion": "100"
        },
        "spec": spec,
        "status": status
    })
}

/// A deployment with only a spec section
#[allow(dead_code)]
pub fn spec_only(name: &str, spec: Value) -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": name, "namespace": "default"},
        "spec": spec
    })
}
