// THEORY:
// The `pipeline` module is the top-level API of the detector. It chains the
// stages of `core_modules` into one call per frame:
//
//   segment -> clean -> extract contours -> filter & simplify -> annotate
//
// The only stage that varies between detection modes is segmentation, which is
// held as a `Box<dyn Segmenter>` chosen from configuration. Everything is
// recomputed per frame; the pipeline holds no state between calls, so processing
// the same frame twice gives identical results.

use image::{GrayImage, RgbImage};
use log::debug;

use crate::core_modules::annotator::Annotator;
use crate::core_modules::contour_extractor::extract_outer_contours;
use crate::core_modules::mask_cleaner::MaskCleaner;
use crate::core_modules::segmenter::{self, Segmenter};
use crate::core_modules::shape_filter::ShapeFilter;
use crate::error::Result;

// Re-export key data structures for the public API.
pub use crate::config::{PipelineConfig, StrategyConfig, StrategyKind};
pub use crate::core_modules::shape_filter::DetectedShape;

/// The output of the pipeline for a single frame.
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    pub shapes: Vec<DetectedShape>,
    /// A copy of the input frame with the shapes drawn on it.
    pub annotated: RgbImage,
}

pub struct ShapePipeline {
    segmenter: Box<dyn Segmenter>,
    cleaner: MaskCleaner,
    filter: ShapeFilter,
    annotator: Annotator,
}

impl ShapePipeline {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            segmenter: segmenter::from_config(&config.segmentation),
            cleaner: MaskCleaner::new(
                config.cleanup.kernel_size,
                config.cleanup.operations.clone(),
            ),
            filter: ShapeFilter::new(config.filter.min_area, config.filter.epsilon_ratio),
            annotator: Annotator::new(&config.annotation),
        })
    }

    pub fn strategy_name(&self) -> &'static str {
        self.segmenter.name()
    }

    /// Stage 1 and 2: raw segmentation followed by morphological cleanup.
    pub fn mask(&self, frame: &RgbImage) -> GrayImage {
        let raw = self.segmenter.segment(frame);
        self.cleaner.clean(&raw)
    }

    /// Stages 3 and 4 on an already segmented mask.
    pub fn detect_in_mask(&self, mask: &GrayImage) -> Vec<DetectedShape> {
        let contours = extract_outer_contours(mask);
        let shapes = self.filter.filter(&contours);
        debug!(
            "{} contours, {} shapes after filtering",
            contours.len(),
            shapes.len()
        );
        shapes
    }

    pub fn detect(&self, frame: &RgbImage) -> Vec<DetectedShape> {
        self.detect_in_mask(&self.mask(frame))
    }

    pub fn process(&self, frame: &RgbImage) -> FrameAnalysis {
        let shapes = self.detect(frame);
        let annotated = self.annotator.annotate(frame, &shapes);
        FrameAnalysis { shapes, annotated }
    }
}
