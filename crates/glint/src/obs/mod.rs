//! Observability: ephemeral pipeline counters and the sink boundary.
//!
//! Coordinator and renderer logic never touch counter state directly; all
//! instrumentation flows through `PipelineEvent` and `PipelineSink`.

pub(crate) mod sink;

pub use sink::{
    PipelineEvent, PipelineReport, PipelineSink, ResourceCounters, pipeline_report,
    pipeline_reset_all, with_pipeline_sink,
};
