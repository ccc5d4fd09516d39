//! Pipeline components: channels and run state, dispatch, upload workers, manifest writer, orchestration.

pub mod context;
pub mod dispatch;
pub mod orchestrator;
pub mod worker;
pub mod writer;

pub use context::{Flow, PipelineChannels, RunState, create_pipeline_channels};
pub use dispatch::run_dispatch_loop;
pub use orchestrator::run_pipeline;
pub use worker::spawn_upload_workers;
pub use writer::{RowCallback, WriterParams, run_writer_loop};
