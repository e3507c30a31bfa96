//! Pipeline event sink.
//!
//! The default sink accumulates per-process counters. Tests install a
//! scoped override through `with_pipeline_sink` to observe events
//! directly, e.g. to assert that a preloader ran exactly once.

use crate::types::ResourceKind;
use serde::Serialize;
use std::{cell::RefCell, collections::BTreeMap};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn PipelineSink>> = const { RefCell::new(None) };
    static STATE: RefCell<PipelineReport> = RefCell::new(PipelineReport::default());
}

///
/// PipelineEvent
///

#[derive(Clone, Copy, Debug)]
pub enum PipelineEvent {
    PreloadStart {
        resource: ResourceKind,
        entities: usize,
    },
    PreloadFinish {
        resource: ResourceKind,
        entities: usize,
        slots: usize,
    },
    RenderFinish {
        resource: ResourceKind,
        entities: usize,
    },
}

///
/// PipelineSink
///

pub trait PipelineSink {
    fn record(&self, event: PipelineEvent);
}

///
/// PipelineReport
/// Ephemeral, in-memory counters for pipeline activity.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct PipelineReport {
    pub preload_calls: u64,
    pub entities_preloaded: u64,
    pub renders: u64,
    pub entities_rendered: u64,
    pub resources: BTreeMap<String, ResourceCounters>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ResourceCounters {
    pub preload_calls: u64,
    pub entities_preloaded: u64,
    pub renders: u64,
}

/// Default process-local sink writing into the counter state.
struct GlobalPipelineSink;

impl PipelineSink for GlobalPipelineSink {
    fn record(&self, event: PipelineEvent) {
        STATE.with_borrow_mut(|state| match event {
            PipelineEvent::PreloadStart { .. } => {}
            PipelineEvent::PreloadFinish {
                resource, entities, ..
            } => {
                state.preload_calls = state.preload_calls.saturating_add(1);
                state.entities_preloaded =
                    state.entities_preloaded.saturating_add(entities as u64);
                let entry = state.resources.entry(resource.to_string()).or_default();
                entry.preload_calls = entry.preload_calls.saturating_add(1);
                entry.entities_preloaded =
                    entry.entities_preloaded.saturating_add(entities as u64);
            }
            PipelineEvent::RenderFinish { resource, entities } => {
                state.renders = state.renders.saturating_add(1);
                state.entities_rendered =
                    state.entities_rendered.saturating_add(entities as u64);
                let entry = state.resources.entry(resource.to_string()).or_default();
                entry.renders = entry.renders.saturating_add(1);
            }
        });
    }
}

const GLOBAL_PIPELINE_SINK: GlobalPipelineSink = GlobalPipelineSink;

pub(crate) fn record(event: PipelineEvent) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY: `ptr` came from a live `&dyn PipelineSink` installed by
        // `with_pipeline_sink`, which restores the previous slot on every
        // exit path (including unwind) before the borrow ends. We only
        // materialize a shared reference and never store `ptr`.
        unsafe { (*ptr).record(event) };
    } else {
        GLOBAL_PIPELINE_SINK.record(event);
    }
}

/// Snapshot the current counter state.
#[must_use]
pub fn pipeline_report() -> PipelineReport {
    STATE.with_borrow(Clone::clone)
}

/// Reset all counter state.
pub fn pipeline_reset_all() {
    STATE.with_borrow_mut(|state| *state = PipelineReport::default());
}

/// Run a closure with a temporary pipeline sink override.
pub fn with_pipeline_sink<T>(sink: &dyn PipelineSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn PipelineSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY: the raw pointer is installed only for this dynamic scope and
    // the guard restores the previous slot on all exits, including panic.
    // `record` dereferences synchronously and never persists the pointer.
    let sink_ptr =
        unsafe { std::mem::transmute::<&dyn PipelineSink, *const dyn PipelineSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.replace(sink_ptr)
    });
    let _guard = Guard(prev);

    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder(RefCell<Vec<PipelineEvent>>);

    impl PipelineSink for Recorder {
        fn record(&self, event: PipelineEvent) {
            self.0.borrow_mut().push(event);
        }
    }

    #[test]
    fn override_captures_events_and_restores_on_exit() {
        let recorder = Recorder(RefCell::new(Vec::new()));
        let kind = ResourceKind("Post");

        with_pipeline_sink(&recorder, || {
            record(PipelineEvent::RenderFinish {
                resource: kind,
                entities: 3,
            });
        });

        assert_eq!(recorder.0.borrow().len(), 1);

        pipeline_reset_all();
        record(PipelineEvent::RenderFinish {
            resource: kind,
            entities: 1,
        });
        let report = pipeline_report();
        assert_eq!(report.renders, 1);
        assert_eq!(recorder.0.borrow().len(), 1, "override must not leak");
    }

    #[test]
    fn preload_finish_rolls_up_per_resource_counters() {
        pipeline_reset_all();
        let kind = ResourceKind("Member");

        record(PipelineEvent::PreloadFinish {
            resource: kind,
            entities: 3,
            slots: 2,
        });

        let report = pipeline_report();
        assert_eq!(report.preload_calls, 1);
        assert_eq!(report.entities_preloaded, 3);
        assert_eq!(report.resources["Member"].preload_calls, 1);
    }
}
