// THEORY:
// This file is the main entry point for the `shape_vision` library crate.
// It exports the `ShapePipeline` and the loop driver as the high-level interface
// for detecting geometric shapes in still images and video frames. The stages of
// the pipeline live in `core_modules` and are public for callers that want to
// run one stage on its own (a mask from another source, say), but most users only
// need `pipeline`, `runner` and `config`.
//
// The crate has no native dependencies. Video decoding and windowing belong to
// the binary that embeds it, which plugs them in through the `FrameSource` and
// `Presenter` traits.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;
pub mod runner;

pub use core_modules::frame_source::{FrameSource, ImageFileSource};
pub use error::{Result, ShapeVisionError};
pub use pipeline::{DetectedShape, FrameAnalysis, PipelineConfig, ShapePipeline};
pub use runner::{Presenter, RunConfig, RunSummary, StopReason, run_still, run_stream};
