//! Diff engine orchestration
//!
//! For each delivered object the engine:
//! 1. Normalizes it into a [`Snapshot`] (malformed input fails the event and
//!    leaves the cache untouched)
//! 2. Swaps it into the cache, getting back the prior snapshot
//! 3. Builds working copies of both, restricted to the recognized sections
//!    and filtered
//! 4. Suppresses the event when the working copies are equal
//! 5. Diffs and renders the rest
//!
//! The engine owns the cache and the output sink. It is not `Sync` and is
//! meant to be driven by exactly one consumer.
//!
//! Logging follows the facility conventions:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::cache::SnapshotCache;
use crate::core_types::EventContext;
use crate::diff::{diff_mappings, mappings_equal, DiffNode};
use crate::errors::{ExError, Result};
use crate::filter::FieldFilter;
use crate::model::{Mapping, ResourceIdentity, Snapshot, DEFAULT_SECTIONS};
use crate::render::{DiffRenderer, RenderOptions};
use crate::{log_op_end, log_op_error, log_op_start};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Top-level sections that take part in diffing
    pub sections: Vec<String>,
    pub filter: FieldFilter,
    pub render: RenderOptions,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            sections: DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect(),
            filter: FieldFilter::default(),
            render: RenderOptions::default(),
        }
    }
}

/// What the source says happened to the object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Created or updated; the object is its full current state
    Applied,
    /// Removed; the object is its final state
    Deleted,
}

/// One delivery from a change source
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub object: serde_json::Value,
    pub context: EventContext,
}

impl ChangeEvent {
    pub fn applied(object: serde_json::Value) -> Self {
        Self {
            kind: ChangeKind::Applied,
            object,
            context: EventContext::new(),
        }
    }

    pub fn deleted(object: serde_json::Value) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            object,
            context: EventContext::new(),
        }
    }

    pub fn with_context(mut self, context: EventContext) -> Self {
        self.context = context;
        self
    }
}

/// Result of processing one event
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No prior snapshot; `nodes` are the additions that were rendered
    /// (empty when no recognized section survived filtering)
    FirstSeen { nodes: Vec<DiffNode> },
    /// The working copies differed and a diff block was rendered
    Changed { nodes: Vec<DiffNode> },
    /// The working copies were equal; nothing was rendered
    Unchanged,
    /// A cached resource was deleted and evicted
    Deleted,
    /// A resource that was never cached was deleted
    DeletedUnknown,
}

impl Outcome {
    /// Whether a block was written to the sink
    pub fn rendered(&self) -> bool {
        match self {
            Outcome::FirstSeen { nodes } => !nodes.is_empty(),
            Outcome::Changed { .. } | Outcome::Deleted | Outcome::DeletedUnknown => true,
            Outcome::Unchanged => false,
        }
    }

    /// Number of diff nodes behind the rendered block
    pub fn node_count(&self) -> usize {
        match self {
            Outcome::FirstSeen { nodes } | Outcome::Changed { nodes } => nodes.len(),
            _ => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::FirstSeen { .. } => "first_seen",
            Outcome::Changed { .. } => "changed",
            Outcome::Unchanged => "unchanged",
            Outcome::Deleted => "deleted",
            Outcome::DeletedUnknown => "deleted_unknown",
        }
    }
}

/// Stateful diff engine over a stream of snapshots
#[derive(Debug)]
pub struct DiffEngine<W> {
    cache: SnapshotCache,
    options: DiffOptions,
    renderer: DiffRenderer,
    sink: W,
}

impl<W: Write> DiffEngine<W> {
    /// Create an engine writing to `sink`
    pub fn new(options: DiffOptions, sink: W) -> Self {
        let renderer = DiffRenderer::new(options.render.clone());
        Self::with_renderer(options, renderer, sink)
    }

    /// Create an engine with a preconfigured renderer (e.g. a manual clock)
    pub fn with_renderer(options: DiffOptions, renderer: DiffRenderer, sink: W) -> Self {
        Self {
            cache: SnapshotCache::new(),
            options,
            renderer,
            sink,
        }
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Swap the field filter; later events compare under the new filter
    /// while the cache keeps its unfiltered snapshots.
    pub fn set_filter(&mut self, filter: FieldFilter) {
        self.options.filter = filter;
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_sink(self) -> W {
        self.sink
    }

    /// Process one delivered event
    ///
    /// # Errors
    ///
    /// `MalformedSnapshot`/`MissingField` if the object cannot be normalized
    /// (the cache is left untouched), `Io` if the sink rejects the block.
    pub fn process(&mut self, event: ChangeEvent) -> std::result::Result<Outcome, ExError> {
        let event_id = event.context.event_id.clone();
        log_op_start!("process_event", event_id = %event_id);
        let start = std::time::Instant::now();

        let (identity, outcome) = self.apply(event.kind, event.object).map_err(|e| {
            let e = e.with_event_id(event_id.clone());
            log_op_error!(
                "process_event",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                event_id = %event_id
            );
            e
        })?;

        log_op_end!(
            "process_event",
            duration_ms = start.elapsed().as_millis() as u64,
            event_id = %event_id,
            resource = %identity,
            outcome = outcome.label(),
            node_count = outcome.node_count(),
            cache_len = self.cache.len()
        );
        Ok(outcome)
    }

    fn apply(
        &mut self,
        kind: ChangeKind,
        object: serde_json::Value,
    ) -> std::result::Result<(ResourceIdentity, Outcome), ExError> {
        let snapshot = Snapshot::from_json(object).map_err(ExError::from)?;
        let identity = snapshot.identity().clone();

        let outcome = match kind {
            ChangeKind::Applied => self.observe(snapshot),
            ChangeKind::Deleted => self.forget(snapshot),
        }
        .map_err(|e| ExError::from(e).with_resource(identity.to_string()))?;

        Ok((identity, outcome))
    }

    /// Record a new observation and render its delta against the cache
    ///
    /// # Errors
    ///
    /// `Output` if the sink rejects the block. The cache already holds the
    /// new snapshot at that point.
    pub fn observe(&mut self, snapshot: Snapshot) -> Result<Outcome> {
        let prior = self.cache.put(snapshot.clone());
        self.render(prior.as_ref(), &snapshot)
    }

    /// Render the delta between `old` and `new` without touching the cache
    ///
    /// # Errors
    ///
    /// `Output` if the sink rejects the block.
    pub fn render(&mut self, old: Option<&Snapshot>, new: &Snapshot) -> Result<Outcome> {
        let nodes = self.compare(old, new);
        self.renderer
            .render_changes(&mut self.sink, new.identity(), &nodes)?;

        Ok(match old {
            None => Outcome::FirstSeen { nodes },
            Some(_) if nodes.is_empty() => Outcome::Unchanged,
            Some(_) => Outcome::Changed { nodes },
        })
    }

    /// Structural delta between the working copies of two snapshots; empty
    /// when they are equal. An absent `old` compares against nothing.
    pub fn compare(&self, old: Option<&Snapshot>, new: &Snapshot) -> Vec<DiffNode> {
        let new_working = self.working_copy(new);
        let old_working = old
            .map(|snapshot| self.working_copy(snapshot))
            .unwrap_or_default();

        if mappings_equal(&old_working, &new_working) {
            return Vec::new();
        }
        diff_mappings(&old_working, &new_working)
    }

    /// Evict a deleted resource and render its removal
    ///
    /// The block shows the last cached state, or the delivered final state
    /// when the resource was never seen.
    ///
    /// # Errors
    ///
    /// `Output` if the sink rejects the block. The entry is evicted either way.
    pub fn forget(&mut self, snapshot: Snapshot) -> Result<Outcome> {
        let (last, outcome) = match self.cache.remove(snapshot.identity()) {
            Some(cached) => (self.working_copy(&cached), Outcome::Deleted),
            None => (self.working_copy(&snapshot), Outcome::DeletedUnknown),
        };

        self.renderer
            .render_removed(&mut self.sink, snapshot.identity(), &last)?;
        Ok(outcome)
    }

    /// Restricted, filtered copy of a snapshot used for comparison
    fn working_copy(&self, snapshot: &Snapshot) -> Mapping {
        let mut working = snapshot.restrict(&self.options.sections);
        self.options.filter.apply(&mut working);
        working
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use serde_json::{json, Value};

    fn quiet() -> DiffOptions {
        DiffOptions {
            render: RenderOptions {
                show_timestamp: false,
                ..RenderOptions::default()
            },
            ..DiffOptions::default()
        }
    }

    fn deploy(replicas: u64, ready: u64) -> Value {
        json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {"name": "web", "namespace": "default", "resourceVersion": "1"},
            "spec": {"replicas": replicas},
            "status": {"readyReplicas": ready}
        })
    }

    fn output(engine: &DiffEngine<Vec<u8>>) -> String {
        String::from_utf8(engine.sink().clone()).unwrap()
    }

    #[test]
    fn test_default_sections() {
        assert_eq!(DiffOptions::default().sections, vec!["spec", "status"]);
    }

    #[test]
    fn test_first_then_change_then_repeat() {
        let mut engine = DiffEngine::new(quiet(), Vec::new());

        let first = engine.process(ChangeEvent::applied(deploy(1, 0))).unwrap();
        assert!(matches!(first, Outcome::FirstSeen { ref nodes } if nodes.len() == 2));

        let changed = engine.process(ChangeEvent::applied(deploy(3, 0))).unwrap();
        assert!(matches!(changed, Outcome::Changed { ref nodes } if nodes.len() == 1));

        let repeat = engine.process(ChangeEvent::applied(deploy(3, 0))).unwrap();
        assert_eq!(repeat, Outcome::Unchanged);
        assert!(!repeat.rendered());

        assert_eq!(engine.cache().len(), 1);
    }

    #[test]
    fn test_metadata_churn_outside_sections_is_silent() {
        let mut engine = DiffEngine::new(quiet(), Vec::new());
        engine.process(ChangeEvent::applied(deploy(1, 1))).unwrap();

        let mut bumped = deploy(1, 1);
        bumped["metadata"]["resourceVersion"] = json!("2");
        let outcome = engine.process(ChangeEvent::applied(bumped)).unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
    }

    #[test]
    fn test_malformed_object_leaves_cache_untouched() {
        let mut engine = DiffEngine::new(quiet(), Vec::new());
        engine.process(ChangeEvent::applied(deploy(1, 0))).unwrap();

        let err = engine
            .process(ChangeEvent::applied(json!({"kind": "Deployment"})))
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::MissingField);
        assert!(err.event_id().is_some());

        let err = engine.process(ChangeEvent::applied(json!([1, 2]))).unwrap_err();
        assert!(err.kind().is_input_error());

        assert_eq!(engine.cache().len(), 1);
    }

    #[test]
    fn test_deleted_evicts_and_renders_removal() {
        let mut engine = DiffEngine::new(quiet(), Vec::new());
        engine.process(ChangeEvent::applied(deploy(2, 2))).unwrap();

        let outcome = engine.process(ChangeEvent::deleted(deploy(0, 0))).unwrap();
        assert_eq!(outcome, Outcome::Deleted);
        assert!(engine.cache().is_empty());

        let text = output(&engine);
        assert!(text.contains("- resource deleted\n"));
        assert!(text.contains("- spec:\n-   \"replicas\": 2\n"));
    }

    #[test]
    fn test_deleted_unknown_uses_final_state() {
        let mut engine = DiffEngine::new(quiet(), Vec::new());

        let outcome = engine.process(ChangeEvent::deleted(deploy(5, 0))).unwrap();
        assert_eq!(outcome, Outcome::DeletedUnknown);
        assert!(engine.cache().is_empty());
        assert!(output(&engine).contains("\"replicas\": 5"));
    }

    #[test]
    fn test_first_seen_without_sections_renders_nothing_but_caches() {
        let mut engine = DiffEngine::new(quiet(), Vec::new());
        let cm = json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {"name": "cfg", "namespace": "default"},
            "data": {"k": "v"}
        });

        let outcome = engine.process(ChangeEvent::applied(cm)).unwrap();
        assert_eq!(outcome, Outcome::FirstSeen { nodes: Vec::new() });
        assert!(!outcome.rendered());
        assert_eq!(engine.cache().len(), 1);
        assert!(output(&engine).is_empty());
    }

    #[test]
    fn test_custom_sections() {
        let options = DiffOptions {
            sections: vec!["data".to_string()],
            ..quiet()
        };
        let mut engine = DiffEngine::new(options, Vec::new());
        let cm = |v: &str| {
            json!({
                "apiVersion": "v1",
                "kind": "ConfigMap",
                "metadata": {"name": "cfg"},
                "data": {"k": v}
            })
        };

        engine.process(ChangeEvent::applied(cm("a"))).unwrap();
        engine.process(ChangeEvent::applied(cm("b"))).unwrap();

        assert!(output(&engine).contains("- data.k: a\n+ data.k: b\n"));
    }

    #[test]
    fn test_render_does_not_touch_cache() {
        let mut engine = DiffEngine::new(quiet(), Vec::new());
        let old = Snapshot::from_json(deploy(1, 0)).unwrap();
        let new = Snapshot::from_json(deploy(2, 0)).unwrap();

        let outcome = engine.render(Some(&old), &new).unwrap();
        assert!(matches!(outcome, Outcome::Changed { .. }));
        assert!(engine.cache().is_empty());
    }
}
