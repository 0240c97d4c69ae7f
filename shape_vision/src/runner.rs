// THEORY:
// The `runner` is the read -> process -> display -> poll loop that drives a
// `ShapePipeline` over a `FrameSource` and shows results through a `Presenter`.
//
// Both collaborators are taken by value. They are dropped when the run function
// returns, whichever way it returns: end-of-stream, quit key, or an error from
// any stage. Implementations release their native handles (decoder, window) in
// `Drop`, so no exit path can leak them.
//
// Runs are strictly sequential: one frame is fully processed and presented
// before the next is pulled. There is no frame skipping and no rate limiting.

use image::RgbImage;
use log::{debug, info};

use crate::core_modules::frame_source::FrameSource;
use crate::error::Result;
use crate::pipeline::ShapePipeline;

/// A display surface. `wait_key` mirrors HighGUI: a delay of 0 blocks until a
/// key is pressed, a positive delay polls for at most that many milliseconds.
pub trait Presenter {
    fn show(&mut self, frame: &RgbImage) -> Result<()>;

    fn wait_key(&mut self, delay_ms: i32) -> Result<Option<char>>;
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn show(&mut self, frame: &RgbImage) -> Result<()> {
        (**self).show(frame)
    }

    fn wait_key(&mut self, delay_ms: i32) -> Result<Option<char>> {
        (**self).wait_key(delay_ms)
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub quit_key: char,
    /// Key poll between frames; short enough to be effectively non-blocking.
    pub poll_delay_ms: i32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            quit_key: 'q',
            poll_delay_ms: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndOfStream,
    QuitKey,
    /// A still image was shown and dismissed.
    Dismissed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_processed: u64,
    pub shapes_detected: u64,
    pub stop_reason: StopReason,
}

/// Shows the first frame of `source` annotated, then blocks until any key.
/// A source with no frame at all ends the run as end-of-stream.
pub fn run_still<S, P>(
    mut source: S,
    mut presenter: P,
    pipeline: &ShapePipeline,
) -> Result<RunSummary>
where
    S: FrameSource,
    P: Presenter,
{
    let Some(frame) = source.next_frame()? else {
        return Ok(RunSummary {
            frames_processed: 0,
            shapes_detected: 0,
            stop_reason: StopReason::EndOfStream,
        });
    };

    let analysis = pipeline.process(&frame);
    info!(
        "{} shapes detected with the {} strategy",
        analysis.shapes.len(),
        pipeline.strategy_name()
    );
    presenter.show(&analysis.annotated)?;
    presenter.wait_key(0)?;

    Ok(RunSummary {
        frames_processed: 1,
        shapes_detected: analysis.shapes.len() as u64,
        stop_reason: StopReason::Dismissed,
    })
}

/// Processes and shows frames until the source is exhausted or the quit key is
/// pressed.
pub fn run_stream<S, P>(
    mut source: S,
    mut presenter: P,
    pipeline: &ShapePipeline,
    config: &RunConfig,
) -> Result<RunSummary>
where
    S: FrameSource,
    P: Presenter,
{
    info!(
        "starting stream with the {} strategy, press '{}' to quit",
        pipeline.strategy_name(),
        config.quit_key
    );

    let mut frames_processed = 0;
    let mut shapes_detected = 0;

    let stop_reason = loop {
        let Some(frame) = source.next_frame()? else {
            break StopReason::EndOfStream;
        };

        let analysis = pipeline.process(&frame);
        frames_processed += 1;
        shapes_detected += analysis.shapes.len() as u64;
        debug!("frame {}: {} shapes", frames_processed, analysis.shapes.len());

        presenter.show(&analysis.annotated)?;

        if presenter.wait_key(config.poll_delay_ms)? == Some(config.quit_key) {
            break StopReason::QuitKey;
        }
    };

    info!(
        "stream stopped ({:?}) after {} frames, {} shapes",
        stop_reason, frames_processed, shapes_detected
    );

    Ok(RunSummary {
        frames_processed,
        shapes_detected,
        stop_reason,
    })
}
